//! Option list parsing
//!
//! Pattern layouts hand the converter a flat list of tokens:
//!
//! ```text
//! [depth] [class name length] [max length] [rootFirst | evaluator | regex]...
//! ```
//!
//! The first three are positional and accept a number, `full` or `short`.
//! Every later token is `rootFirst`, the name of an evaluator known to the
//! registry, or otherwise an exclusion regex.

use crate::config::{Limit, Result};
use crate::evaluator::{EvaluatorRegistry, EventEvaluator};
use crate::exclusion::ExclusionRule;
use std::fmt;
use std::sync::Arc;

/// Token that enables root-cause-first ordering
pub const ROOT_FIRST_OPTION: &str = "rootFirst";

const POSITIONAL_OPTIONS: usize = 3;

/// Validated result of parsing an option list
pub struct ParsedOptions<E: ?Sized> {
    pub max_depth_per_throwable: Option<usize>,
    pub shortened_class_name_length: Option<usize>,
    pub max_length: Option<usize>,
    pub root_cause_first: bool,
    pub evaluators: Vec<Arc<dyn EventEvaluator<E>>>,
    pub exclusions: Vec<ExclusionRule>,
}

impl<E: ?Sized> Default for ParsedOptions<E> {
    fn default() -> Self {
        Self {
            max_depth_per_throwable: None,
            shortened_class_name_length: None,
            max_length: None,
            root_cause_first: false,
            evaluators: Vec::new(),
            exclusions: Vec::new(),
        }
    }
}

impl<E: ?Sized> fmt::Debug for ParsedOptions<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let evaluators: Vec<&str> = self.evaluators.iter().map(|e| e.name()).collect();
        let exclusions: Vec<&str> = self.exclusions.iter().map(|r| r.pattern()).collect();
        f.debug_struct("ParsedOptions")
            .field("max_depth_per_throwable", &self.max_depth_per_throwable)
            .field("shortened_class_name_length", &self.shortened_class_name_length)
            .field("max_length", &self.max_length)
            .field("root_cause_first", &self.root_cause_first)
            .field("evaluators", &evaluators)
            .field("exclusions", &exclusions)
            .finish()
    }
}

/// Parse an option list, resolving evaluator names against `registry`
pub fn parse_options<E, S>(
    options: &[S],
    registry: &EvaluatorRegistry<E>,
) -> Result<ParsedOptions<E>>
where
    E: ?Sized,
    S: AsRef<str>,
{
    let mut parsed = ParsedOptions::default();
    let positional = [
        Limit::MaxDepthPerThrowable,
        Limit::ShortenedClassNameLength,
        Limit::MaxLength,
    ];

    for (limit, option) in positional.iter().zip(options) {
        let value = limit.parse(option.as_ref())?;
        match limit {
            Limit::MaxDepthPerThrowable => parsed.max_depth_per_throwable = Some(value),
            Limit::ShortenedClassNameLength => parsed.shortened_class_name_length = Some(value),
            Limit::MaxLength => parsed.max_length = Some(value),
        }
    }

    for option in options.iter().skip(POSITIONAL_OPTIONS) {
        let option = option.as_ref();
        if option == ROOT_FIRST_OPTION {
            parsed.root_cause_first = true;
        } else if let Some(evaluator) = registry.get(option) {
            parsed.evaluators.push(evaluator);
        } else {
            parsed.exclusions.push(ExclusionRule::new(option)?);
        }
    }

    Ok(parsed)
}
