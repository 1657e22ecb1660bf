//! Suppression predicates
//!
//! Evaluators decide, per event, whether the stack trace should be dropped
//! entirely. They are looked up by name in an [`EvaluatorRegistry`] supplied
//! by the host and stored, in order, in a [`SuppressionGate`].
//!
//! A failing evaluator never fails the conversion: the failure is logged (a
//! bounded number of times) and counts as "did not match". A panic inside an
//! evaluator is caught and treated as a failure.

use crate::chain::ErrorChain;
use crate::event::LogEvent;
use regex::Regex;
use std::collections::HashMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use thiserror::Error;

/// Failures logged before going quiet
pub const MAX_EVALUATOR_ERRORS: usize = 4;

/// An evaluator could not reach a decision
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Evaluator '{evaluator}' failed: {reason}")]
pub struct EvaluationError {
    pub evaluator: String,
    pub reason: String,
}

impl EvaluationError {
    pub fn new(evaluator: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            evaluator: evaluator.into(),
            reason: reason.into(),
        }
    }
}

/// Predicate over log events
pub trait EventEvaluator<E: ?Sized>: Send + Sync {
    fn name(&self) -> &str;

    /// `Ok(true)` suppresses the stack trace
    fn evaluate(&self, event: &E) -> Result<bool, EvaluationError>;
}

/// Evaluator backed by a closure
pub struct FnEvaluator<F> {
    name: String,
    predicate: F,
}

impl<F> FnEvaluator<F> {
    pub fn new(name: impl Into<String>, predicate: F) -> Self {
        Self {
            name: name.into(),
            predicate,
        }
    }
}

impl<E, F> EventEvaluator<E> for FnEvaluator<F>
where
    E: ?Sized,
    F: Fn(&E) -> Result<bool, EvaluationError> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn evaluate(&self, event: &E) -> Result<bool, EvaluationError> {
        (self.predicate)(event)
    }
}

/// Matches when any error in the event's chain has a matching class name
#[derive(Debug, Clone)]
pub struct ThrowableClassEvaluator {
    name: String,
    class_pattern: Regex,
}

impl ThrowableClassEvaluator {
    pub fn new(name: impl Into<String>, class_pattern: Regex) -> Self {
        Self {
            name: name.into(),
            class_pattern,
        }
    }
}

impl<E: LogEvent + ?Sized> EventEvaluator<E> for ThrowableClassEvaluator {
    fn name(&self) -> &str {
        &self.name
    }

    fn evaluate(&self, event: &E) -> Result<bool, EvaluationError> {
        let Some(throwable) = event.throwable() else {
            return Ok(false);
        };
        let chain = ErrorChain::walk(throwable);
        Ok(chain
            .nodes()
            .iter()
            .any(|node| self.class_pattern.is_match(node.class_name)))
    }
}

/// Host-wide evaluators, addressable by name
pub struct EvaluatorRegistry<E: ?Sized> {
    evaluators: HashMap<String, Arc<dyn EventEvaluator<E>>>,
}

impl<E: ?Sized> EvaluatorRegistry<E> {
    pub fn new() -> Self {
        Self {
            evaluators: HashMap::new(),
        }
    }

    /// Register under the evaluator's own name, replacing any previous entry
    pub fn register(&mut self, evaluator: Arc<dyn EventEvaluator<E>>) {
        self.evaluators
            .insert(evaluator.name().to_string(), evaluator);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn EventEvaluator<E>>> {
        self.evaluators.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.evaluators.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.evaluators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.evaluators.is_empty()
    }
}

impl<E: ?Sized> Default for EvaluatorRegistry<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: ?Sized> fmt::Debug for EvaluatorRegistry<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.evaluators.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("EvaluatorRegistry")
            .field("evaluators", &names)
            .finish()
    }
}

/// Ordered evaluator list consulted before any rendering work
pub struct SuppressionGate<E: ?Sized> {
    evaluators: Vec<Arc<dyn EventEvaluator<E>>>,
    error_count: AtomicUsize,
}

impl<E: ?Sized> SuppressionGate<E> {
    pub fn new() -> Self {
        Self {
            evaluators: Vec::new(),
            error_count: AtomicUsize::new(0),
        }
    }

    pub fn push(&mut self, evaluator: Arc<dyn EventEvaluator<E>>) {
        self.evaluators.push(evaluator);
    }

    pub fn set(&mut self, evaluators: Vec<Arc<dyn EventEvaluator<E>>>) {
        self.evaluators = evaluators;
    }

    pub fn evaluators(&self) -> &[Arc<dyn EventEvaluator<E>>] {
        &self.evaluators
    }

    /// Evaluator failures seen so far
    pub fn error_count(&self) -> usize {
        self.error_count.load(Ordering::Relaxed)
    }

    /// True as soon as one evaluator matches
    pub fn is_suppressed(&self, event: &E) -> bool {
        for evaluator in &self.evaluators {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| evaluator.evaluate(event)))
                .unwrap_or_else(|payload| {
                    Err(EvaluationError::new(
                        evaluator.name(),
                        format!("panicked: {}", panic_message(payload.as_ref())),
                    ))
                });
            match outcome {
                Ok(true) => {
                    tracing::trace!(evaluator = evaluator.name(), "Stack trace suppressed");
                    return true;
                }
                Ok(false) => {}
                Err(err) => self.record_failure(&err),
            }
        }
        false
    }

    fn record_failure(&self, err: &EvaluationError) {
        let count = self.error_count.fetch_add(1, Ordering::Relaxed) + 1;
        if count < MAX_EVALUATOR_ERRORS {
            tracing::warn!("{}; treating as not matched", err);
        } else if count == MAX_EVALUATOR_ERRORS {
            tracing::warn!(
                "{}; exceeded maximum of {} evaluator errors, further errors will not be reported",
                err,
                MAX_EVALUATOR_ERRORS
            );
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "unknown panic"
    }
}

impl<E: ?Sized> Default for SuppressionGate<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: ?Sized> Clone for SuppressionGate<E> {
    fn clone(&self) -> Self {
        Self {
            evaluators: self.evaluators.clone(),
            error_count: AtomicUsize::new(0),
        }
    }
}

impl<E: ?Sized> fmt::Debug for SuppressionGate<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.evaluators.iter().map(|e| e.name()).collect();
        f.debug_struct("SuppressionGate")
            .field("evaluators", &names)
            .field("error_count", &self.error_count())
            .finish()
    }
}
