//! Error model consumed by the renderer
//!
//! The renderer never looks at host errors directly. Anything that can report
//! a class name, a message, its frames, a cause and its suppressed errors
//! implements [`Throwable`]. [`ThrowableRecord`] is the owned, serializable
//! implementation used by the CLI, the JSON fixtures and most tests.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::error::Error;
use std::fmt;

/// One stack entry
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "fuzz", derive(arbitrary::Arbitrary))]
pub struct StackFrame {
    /// Declaring class (or module path for native frames)
    pub class_name: String,
    /// Method or function name
    pub method: String,
    /// Source file name, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    /// Line number, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
}

impl StackFrame {
    pub fn new(class_name: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            method: method.into(),
            file: None,
            line: None,
        }
    }

    /// Attach a source file and line
    pub fn at(mut self, file: impl Into<String>, line: u32) -> Self {
        self.file = Some(file.into());
        self.line = Some(line);
        self
    }

    /// Attach a source file without a line number
    pub fn in_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// The `"<class>.<method>"` key exclusion rules are matched against
    pub fn key(&self) -> String {
        format!("{}.{}", self.class_name, self.method)
    }

    /// Source position as rendered inside the parentheses of a frame line
    pub fn location(&self) -> FrameLocation<'_> {
        FrameLocation(self)
    }
}

/// Display adapter for `File.rs:12`, `File.rs` or `Unknown Source`
pub struct FrameLocation<'a>(&'a StackFrame);

impl fmt::Display for FrameLocation<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.0.file, self.0.line) {
            (Some(file), Some(line)) => write!(f, "{}:{}", file, line),
            (Some(file), None) => f.write_str(file),
            (None, _) => f.write_str("Unknown Source"),
        }
    }
}

/// Capability set the chain walker needs from an error object
///
/// `cause` may point back into the graph (even at `self`); the walker guards
/// against that, implementors do not have to.
pub trait Throwable {
    /// Fully qualified type name, `.`-separated
    fn class_name(&self) -> &str;

    fn message(&self) -> Option<&str>;

    /// Frames, innermost call first
    fn stack_trace(&self) -> &[StackFrame];

    fn cause(&self) -> Option<&dyn Throwable>;

    fn suppressed(&self) -> Vec<&dyn Throwable> {
        Vec::new()
    }
}

/// Address-based identity used for cycle detection
pub(crate) fn identity(throwable: &dyn Throwable) -> usize {
    throwable as *const dyn Throwable as *const () as usize
}

/// Owned error snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "fuzz", derive(arbitrary::Arbitrary))]
pub struct ThrowableRecord {
    pub class_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub frames: Vec<StackFrame>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cause: Option<Box<ThrowableRecord>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suppressed: Vec<ThrowableRecord>,
}

impl ThrowableRecord {
    pub fn new(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            message: None,
            frames: Vec::new(),
            cause: None,
            suppressed: Vec::new(),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_frame(mut self, frame: StackFrame) -> Self {
        self.frames.push(frame);
        self
    }

    pub fn with_frames(mut self, frames: impl IntoIterator<Item = StackFrame>) -> Self {
        self.frames.extend(frames);
        self
    }

    pub fn with_cause(mut self, cause: ThrowableRecord) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    pub fn with_suppressed(mut self, suppressed: ThrowableRecord) -> Self {
        self.suppressed.push(suppressed);
        self
    }

    /// Snapshot a typed Rust error and its `source()` chain
    ///
    /// The head takes its class name from the static type; sources only
    /// expose `dyn Error`, so their names come from [`source_class_name`].
    pub fn from_error<E: Error + 'static>(error: &E) -> Self {
        let mut record =
            Self::new(dotted_path(std::any::type_name::<E>())).with_message(error.to_string());
        let mut seen = HashSet::from([error as *const E as *const () as usize]);
        record.cause = error
            .source()
            .and_then(|source| Self::link_sources(source, &mut seen))
            .map(Box::new);
        record
    }

    /// Snapshot a type-erased error and its `source()` chain
    ///
    /// The chain stops at the first source already seen.
    pub fn from_dyn_error(error: &(dyn Error + 'static)) -> Self {
        Self::link_sources(error, &mut HashSet::new())
            .unwrap_or_else(|| Self::new(UNKNOWN_CLASS_NAME))
    }

    fn link_sources(
        error: &(dyn Error + 'static),
        seen: &mut HashSet<usize>,
    ) -> Option<ThrowableRecord> {
        let mut chain = Vec::new();
        let mut current = Some(error);
        while let Some(err) = current {
            if !seen.insert(err as *const dyn Error as *const () as usize) {
                break;
            }
            chain.push(Self::new(source_class_name(err)).with_message(err.to_string()));
            current = err.source();
        }

        // Link from the innermost source outwards
        let mut linked: Option<ThrowableRecord> = None;
        while let Some(mut record) = chain.pop() {
            record.cause = linked.map(Box::new);
            linked = Some(record);
        }
        linked
    }
}

impl Throwable for ThrowableRecord {
    fn class_name(&self) -> &str {
        &self.class_name
    }

    fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    fn stack_trace(&self) -> &[StackFrame] {
        &self.frames
    }

    fn cause(&self) -> Option<&dyn Throwable> {
        self.cause.as_deref().map(|cause| cause as &dyn Throwable)
    }

    fn suppressed(&self) -> Vec<&dyn Throwable> {
        self.suppressed.iter().map(|s| s as &dyn Throwable).collect()
    }
}

const UNKNOWN_CLASS_NAME: &str = "Error";

/// Best-effort type name for a `dyn Error`
///
/// Derived `Debug` output starts with the type name (`ParseIntError { .. }`),
/// which is the only type information a trait object still carries.
pub fn source_class_name(error: &(dyn Error + 'static)) -> String {
    let debug = format!("{:?}", error);
    let name: String = debug
        .chars()
        .take_while(|c| c.is_alphanumeric() || *c == '_' || *c == ':')
        .collect();
    if name.is_empty() || name.starts_with(|c: char| c.is_ascii_digit()) {
        UNKNOWN_CLASS_NAME.to_string()
    } else {
        dotted_path(&name)
    }
}

/// Rewrite a Rust path (`std::io::Error`, `a::B<c::D>`) into dotted form
/// (`std.io.Error`, `a.B`), dropping generic arguments
pub fn dotted_path(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    let mut depth = 0usize;
    for c in path.chars() {
        match c {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            _ if depth == 0 => out.push(c),
            _ => {}
        }
    }
    out.trim_end_matches(':').replace("::", ".")
}
