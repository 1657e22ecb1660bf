//! Log events as seen by the converter

use crate::throwable::{Throwable, ThrowableRecord};
use serde::{Deserialize, Serialize};

/// What the converter needs from a log event
///
/// The event itself is also handed, untouched, to every evaluator.
pub trait LogEvent {
    /// Root of the error chain attached to the event, if any
    fn throwable(&self) -> Option<&dyn Throwable>;
}

/// Minimal event carrying an optional error snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThrowableEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub throwable: Option<ThrowableRecord>,
}

impl ThrowableEvent {
    pub fn new(throwable: ThrowableRecord) -> Self {
        Self {
            throwable: Some(throwable),
        }
    }

    /// Event without an error; converts to the empty string
    pub fn empty() -> Self {
        Self::default()
    }
}

impl LogEvent for ThrowableEvent {
    fn throwable(&self) -> Option<&dyn Throwable> {
        self.throwable.as_ref().map(|t| t as &dyn Throwable)
    }
}

impl LogEvent for ThrowableRecord {
    fn throwable(&self) -> Option<&dyn Throwable> {
        Some(self)
    }
}
