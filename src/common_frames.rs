//! Common frame reduction
//!
//! A cause (or suppressed error) usually shares the bottom of its stack with
//! the error that encloses it. Those trailing frames are counted here and
//! rendered once, as "N common frames omitted".
//!
//! Both sequences are the exclusion-filtered frames, so hidden frames never
//! take part in the comparison.

use crate::throwable::StackFrame;

/// Count trailing frames equal by (class, method, file, line)
pub fn common_frame_count(child: &[&StackFrame], parent: &[&StackFrame]) -> usize {
    child
        .iter()
        .rev()
        .zip(parent.iter().rev())
        .take_while(|(c, p)| c == p)
        .count()
}
