//! Frame exclusion
//!
//! Frames whose `"<class>.<method>"` key matches any exclusion regex are
//! hidden. Each maximal run of hidden frames is replaced by a single
//! "N frames excluded" placeholder at the position of the run.

use crate::config::{ConfigError, Result};
use crate::throwable::StackFrame;
use regex::Regex;

/// One exclusion pattern, compiled at setup time
#[derive(Debug, Clone)]
pub struct ExclusionRule {
    pattern: String,
    regex: Regex,
}

impl ExclusionRule {
    /// Compile a rule; an invalid regex is a configuration error
    pub fn new(pattern: impl Into<String>) -> Result<Self> {
        let pattern = pattern.into();
        let regex = Regex::new(&pattern).map_err(|source| ConfigError::InvalidExclusion {
            pattern: pattern.clone(),
            source,
        })?;
        Ok(Self { pattern, regex })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Unanchored search, so `"one"` matches `a.B.oneStep`
    pub fn matches_key(&self, key: &str) -> bool {
        self.regex.is_match(key)
    }
}

impl PartialEq for ExclusionRule {
    fn eq(&self, other: &Self) -> bool {
        self.pattern == other.pattern
    }
}

/// A frame that survived filtering, or a placeholder for a hidden run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameEntry<'a> {
    Frame(&'a StackFrame),
    Excluded(usize),
}

/// Filter output for one node
#[derive(Debug, Clone, Default)]
pub struct FilteredFrames<'a> {
    entries: Vec<FrameEntry<'a>>,
    kept: Vec<&'a StackFrame>,
}

impl<'a> FilteredFrames<'a> {
    /// Kept frames and run placeholders, in original order
    pub fn entries(&self) -> &[FrameEntry<'a>] {
        &self.entries
    }

    /// Kept frames only
    pub fn kept(&self) -> &[&'a StackFrame] {
        &self.kept
    }

    /// Total number of hidden frames across all runs
    pub fn excluded_count(&self) -> usize {
        self.entries
            .iter()
            .map(|entry| match entry {
                FrameEntry::Excluded(count) => *count,
                FrameEntry::Frame(_) => 0,
            })
            .sum()
    }
}

/// Applies a rule set to frame sequences
#[derive(Debug, Clone, Default)]
pub struct FrameExclusionFilter {
    rules: Vec<ExclusionRule>,
}

impl FrameExclusionFilter {
    pub fn new(rules: Vec<ExclusionRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[ExclusionRule] {
        &self.rules
    }

    pub fn push(&mut self, rule: ExclusionRule) {
        self.rules.push(rule);
    }

    pub fn clear(&mut self) {
        self.rules.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Check a single frame against every rule
    pub fn is_excluded(&self, frame: &StackFrame) -> bool {
        if self.rules.is_empty() {
            return false;
        }
        let key = frame.key();
        self.rules.iter().any(|rule| rule.matches_key(&key))
    }

    /// Filter a frame sequence, collapsing each hidden run into one entry
    pub fn filter<'a>(&self, frames: &'a [StackFrame]) -> FilteredFrames<'a> {
        let mut filtered = FilteredFrames {
            entries: Vec::with_capacity(frames.len()),
            kept: Vec::with_capacity(frames.len()),
        };
        let mut run = 0usize;

        for frame in frames {
            if self.is_excluded(frame) {
                run += 1;
                continue;
            }
            if run > 0 {
                filtered.entries.push(FrameEntry::Excluded(run));
                run = 0;
            }
            filtered.entries.push(FrameEntry::Frame(frame));
            filtered.kept.push(frame);
        }
        if run > 0 {
            filtered.entries.push(FrameEntry::Excluded(run));
        }

        filtered
    }
}
