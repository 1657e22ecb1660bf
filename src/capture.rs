//! Native stack capture
//!
//! Converts a `backtrace::Backtrace` into [`StackFrame`]s so Rust errors can
//! be rendered with the same machinery as any other [`Throwable`].
//!
//! A demangled symbol `app::db::Pool::get` becomes class `app.db.Pool`,
//! method `get`. Trait-impl symbols (`<T as Trait>::method`) are attributed to
//! the implementing type.
//!
//! [`Throwable`]: crate::throwable::Throwable

use crate::throwable::{dotted_path, StackFrame, ThrowableRecord};
use backtrace::Backtrace;
use std::error::Error;
use std::path::Path;

/// Class name used for frames whose symbol has no module path
const TOP_LEVEL_CLASS: &str = "<top>";

/// Capture the current thread's stack
pub fn capture_frames() -> Vec<StackFrame> {
    frames_from_backtrace(&Backtrace::new())
}

/// Convert a resolved backtrace; unresolved frames are skipped
pub fn frames_from_backtrace(backtrace: &Backtrace) -> Vec<StackFrame> {
    let mut frames = Vec::new();
    for frame in backtrace.frames() {
        // Inlined calls show up as several symbols on one frame
        for symbol in frame.symbols() {
            let Some(name) = symbol.name() else {
                continue;
            };
            let demangled = format!("{:#}", name);
            frames.push(frame_from_symbol(
                &demangled,
                symbol.filename(),
                symbol.lineno(),
            ));
        }
    }
    frames
}

/// Snapshot an error chain with the current stack attached to its head
pub fn record_with_backtrace<E: Error + 'static>(error: &E) -> ThrowableRecord {
    let mut record = ThrowableRecord::from_error(error);
    record.frames = capture_frames();
    record
}

/// Split a demangled symbol into a frame
pub fn frame_from_symbol(symbol: &str, file: Option<&Path>, line: Option<u32>) -> StackFrame {
    let (owner, method) = match split_last_segment(symbol) {
        Some((owner, method)) => (owner_class(owner), method.to_string()),
        None => (TOP_LEVEL_CLASS.to_string(), symbol.to_string()),
    };

    StackFrame {
        class_name: owner,
        method,
        file: file
            .and_then(Path::file_name)
            .map(|name| name.to_string_lossy().into_owned()),
        line,
    }
}

/// Split at the last `::` that is not nested inside `<...>`
fn split_last_segment(symbol: &str) -> Option<(&str, &str)> {
    let bytes = symbol.as_bytes();
    let mut depth = 0usize;
    let mut split = None;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'<' => depth += 1,
            b'>' => depth = depth.saturating_sub(1),
            b':' if depth == 0 && bytes.get(i + 1) == Some(&b':') => {
                split = Some(i);
                i += 1;
            }
            _ => {}
        }
        i += 1;
    }
    split.map(|at| (&symbol[..at], &symbol[at + 2..]))
}

/// `<app::Conn as std::io::Read>` -> `app.Conn`
fn owner_class(owner: &str) -> String {
    let inner = owner
        .strip_prefix('<')
        .and_then(|s| s.strip_suffix('>'))
        .unwrap_or(owner);
    let implementor = inner.split(" as ").next().unwrap_or(inner);
    let dotted = dotted_path(implementor.trim());
    if dotted.is_empty() {
        TOP_LEVEL_CLASS.to_string()
    } else {
        dotted
    }
}
