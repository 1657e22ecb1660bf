//! Throwable converter
//!
//! [`ShortenedThrowableConverter`] is the entry point: configure it during
//! setup (setters, [`apply_options`], [`apply_settings`]), then call
//! [`convert`] from any number of threads.
//!
//! ```
//! use shortrace::converter::ShortenedThrowableConverter;
//! use shortrace::event::ThrowableEvent;
//! use shortrace::throwable::{StackFrame, ThrowableRecord};
//!
//! let mut converter = ShortenedThrowableConverter::new();
//! converter.set_max_depth_per_throwable(1);
//!
//! let event = ThrowableEvent::new(
//!     ThrowableRecord::new("app.Boom")
//!         .with_message("bad")
//!         .with_frame(StackFrame::new("app.Main", "run").at("Main.java", 3))
//!         .with_frame(StackFrame::new("app.Main", "main").at("Main.java", 9)),
//! );
//! assert_eq!(
//!     converter.convert(&event),
//!     "app.Boom: bad\n\tat app.Main.run(Main.java:3)\n\t... 1 frames truncated\n"
//! );
//! ```
//!
//! [`apply_options`]: ShortenedThrowableConverter::apply_options
//! [`apply_settings`]: ShortenedThrowableConverter::apply_settings
//! [`convert`]: ShortenedThrowableConverter::convert

use crate::chain::ErrorChain;
use crate::config::{ConfigError, RenderConfig, RenderSettings, Result};
use crate::evaluator::{EvaluatorRegistry, EventEvaluator, SuppressionGate};
use crate::event::LogEvent;
use crate::exclusion::ExclusionRule;
use crate::length_budget::enforce_max_length;
use crate::options::parse_options;
use crate::render::TraceRenderer;
use crate::throwable::Throwable;
use std::fmt;
use std::sync::Arc;

/// Renders the error attached to a log event as bounded text
pub struct ShortenedThrowableConverter<E: ?Sized> {
    config: RenderConfig,
    gate: SuppressionGate<E>,
}

impl<E: ?Sized> fmt::Debug for ShortenedThrowableConverter<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShortenedThrowableConverter")
            .field("config", &self.config)
            .field("gate", &self.gate)
            .finish()
    }
}

impl<E: ?Sized> Default for ShortenedThrowableConverter<E> {
    fn default() -> Self {
        Self::with_config(RenderConfig::default())
    }
}

impl<E: ?Sized> Clone for ShortenedThrowableConverter<E> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            gate: self.gate.clone(),
        }
    }
}

impl<E: ?Sized> ShortenedThrowableConverter<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: RenderConfig) -> Self {
        Self {
            config,
            gate: SuppressionGate::new(),
        }
    }

    /// Build a converter from a pattern-layout option list
    pub fn from_options<S: AsRef<str>>(
        options: &[S],
        registry: &EvaluatorRegistry<E>,
    ) -> Result<Self> {
        let mut converter = Self::new();
        converter.apply_options(options, registry)?;
        Ok(converter)
    }

    /// Apply an option list on top of the current settings
    ///
    /// Positional limits and `rootFirst` override; evaluators and exclusions
    /// are appended. On error nothing is changed.
    pub fn apply_options<S: AsRef<str>>(
        &mut self,
        options: &[S],
        registry: &EvaluatorRegistry<E>,
    ) -> Result<()> {
        let parsed = parse_options(options, registry)?;

        if let Some(depth) = parsed.max_depth_per_throwable {
            self.config.max_depth_per_throwable = depth;
        }
        if let Some(length) = parsed.shortened_class_name_length {
            self.config.shortened_class_name_length = length;
        }
        if let Some(max_length) = parsed.max_length {
            self.config.max_length = max_length;
        }
        if parsed.root_cause_first {
            self.config.root_cause_first = true;
        }
        for evaluator in parsed.evaluators {
            self.gate.push(evaluator);
        }
        for rule in parsed.exclusions {
            self.config.exclusions.push(rule);
        }

        tracing::debug!(config = ?self.config, "Applied converter options");
        Ok(())
    }

    /// Apply a settings file; evaluator names must exist in `registry`
    pub fn apply_settings(
        &mut self,
        settings: &RenderSettings,
        registry: &EvaluatorRegistry<E>,
    ) -> Result<()> {
        let evaluators = settings
            .evaluators
            .iter()
            .map(|name| {
                registry
                    .get(name)
                    .ok_or_else(|| ConfigError::UnknownEvaluator(name.clone()))
            })
            .collect::<Result<Vec<_>>>()?;

        settings.apply_to(&mut self.config)?;
        for evaluator in evaluators {
            self.gate.push(evaluator);
        }

        tracing::debug!(config = ?self.config, "Applied converter settings");
        Ok(())
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn max_depth_per_throwable(&self) -> usize {
        self.config.max_depth_per_throwable
    }

    pub fn set_max_depth_per_throwable(&mut self, depth: usize) {
        self.config.max_depth_per_throwable = depth;
    }

    pub fn shortened_class_name_length(&self) -> usize {
        self.config.shortened_class_name_length
    }

    pub fn set_shortened_class_name_length(&mut self, length: usize) {
        self.config.shortened_class_name_length = length;
    }

    pub fn max_length(&self) -> usize {
        self.config.max_length
    }

    pub fn set_max_length(&mut self, max_length: usize) {
        self.config.max_length = max_length;
    }

    pub fn is_root_cause_first(&self) -> bool {
        self.config.root_cause_first
    }

    pub fn set_root_cause_first(&mut self, root_cause_first: bool) {
        self.config.root_cause_first = root_cause_first;
    }

    /// Exclusion patterns, in the order they were added
    pub fn excludes(&self) -> Vec<&str> {
        self.config
            .exclusions
            .rules()
            .iter()
            .map(ExclusionRule::pattern)
            .collect()
    }

    pub fn add_exclude(&mut self, pattern: impl Into<String>) -> Result<()> {
        let rule = ExclusionRule::new(pattern)?;
        self.config.exclusions.push(rule);
        Ok(())
    }

    /// Replace all exclusion patterns; on error the old ones are kept
    pub fn set_excludes<I, S>(&mut self, patterns: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let rules = patterns
            .into_iter()
            .map(ExclusionRule::new)
            .collect::<Result<Vec<_>>>()?;
        self.config.exclusions.clear();
        for rule in rules {
            self.config.exclusions.push(rule);
        }
        Ok(())
    }

    pub fn evaluators(&self) -> &[Arc<dyn EventEvaluator<E>>] {
        self.gate.evaluators()
    }

    pub fn add_evaluator(&mut self, evaluator: Arc<dyn EventEvaluator<E>>) {
        self.gate.push(evaluator);
    }

    pub fn set_evaluators(&mut self, evaluators: Vec<Arc<dyn EventEvaluator<E>>>) {
        self.gate.set(evaluators);
    }

    /// Evaluator failures seen by this converter
    pub fn evaluator_error_count(&self) -> usize {
        self.gate.error_count()
    }

    /// Render a throwable directly, bypassing the evaluators
    pub fn render(&self, throwable: &dyn Throwable) -> String {
        let chain = ErrorChain::walk(throwable);
        let rendered = TraceRenderer::new(&self.config).render(&chain);
        enforce_max_length(rendered, self.config.max_length)
    }
}

impl<E: LogEvent + ?Sized> ShortenedThrowableConverter<E> {
    /// Render the event's error; empty when there is none or it is suppressed
    pub fn convert(&self, event: &E) -> String {
        let Some(throwable) = event.throwable() else {
            return String::new();
        };
        if self.gate.is_suppressed(event) {
            return String::new();
        }
        self.render(throwable)
    }
}
