//! JSON field provider for structured log output
//!
//! Writes the converted stack trace into a JSON object under a configurable
//! field name. Nothing is written when the converter produces no text.

use crate::converter::ShortenedThrowableConverter;
use crate::event::LogEvent;
use serde_json::{Map, Value};

/// Field name used unless overridden
pub const DEFAULT_FIELD_NAME: &str = "stack_trace";

/// Adds a `stack_trace` field to JSON log records
#[derive(Debug)]
pub struct StackTraceJsonProvider<E: ?Sized> {
    field_name: String,
    converter: ShortenedThrowableConverter<E>,
}

impl<E: ?Sized> Default for StackTraceJsonProvider<E> {
    fn default() -> Self {
        Self::new(ShortenedThrowableConverter::new())
    }
}

impl<E: ?Sized> StackTraceJsonProvider<E> {
    pub fn new(converter: ShortenedThrowableConverter<E>) -> Self {
        Self {
            field_name: DEFAULT_FIELD_NAME.to_string(),
            converter,
        }
    }

    pub fn with_field_name(mut self, field_name: impl Into<String>) -> Self {
        self.field_name = field_name.into();
        self
    }

    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    pub fn converter(&self) -> &ShortenedThrowableConverter<E> {
        &self.converter
    }

    pub fn converter_mut(&mut self) -> &mut ShortenedThrowableConverter<E> {
        &mut self.converter
    }
}

impl<E: LogEvent + ?Sized> StackTraceJsonProvider<E> {
    /// Insert the stack trace field; returns whether anything was written
    pub fn write_to(&self, fields: &mut Map<String, Value>, event: &E) -> bool {
        let stack_trace = self.converter.convert(event);
        if stack_trace.is_empty() {
            return false;
        }
        fields.insert(self.field_name.clone(), Value::String(stack_trace));
        true
    }

    /// Serialize a one-field JSON object for the event
    pub fn to_json(&self, event: &E) -> anyhow::Result<String> {
        let mut fields = Map::new();
        self.write_to(&mut fields, event);
        Ok(serde_json::to_string_pretty(&Value::Object(fields))?)
    }
}
