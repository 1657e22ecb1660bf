//! Rendering configuration
//!
//! [`RenderConfig`] is the validated, immutable view the renderer works from.
//! It is built during setup (programmatic setters, an option list, or a TOML
//! settings file) and only read while converting.

use crate::abbreviator::ClassNameShortener;
use crate::exclusion::{ExclusionRule, FrameExclusionFilter};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Effectively unlimited frames per error
pub const FULL_MAX_DEPTH_PER_THROWABLE: usize = usize::MAX;
/// Frames per error for compact logs
pub const SHORT_MAX_DEPTH_PER_THROWABLE: usize = 3;
/// Never shorten class names
pub const FULL_CLASS_NAME_LENGTH: usize = usize::MAX;
/// Class name budget for compact logs
pub const SHORT_CLASS_NAME_LENGTH: usize = 10;
/// Large but bounded output length
pub const FULL_MAX_LENGTH: usize = i32::MAX as usize;
/// Output length for compact logs
pub const SHORT_MAX_LENGTH: usize = 1024;

/// Preset keyword for the unlimited value of a setting
pub const FULL_PRESET: &str = "full";
/// Preset keyword for the compact value of a setting
pub const SHORT_PRESET: &str = "short";

/// Errors raised while building a configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid {setting} value '{value}': expected a number, 'full' or 'short'")]
    InvalidLimit { setting: &'static str, value: String },

    #[error("Invalid exclusion pattern '{pattern}': {source}")]
    InvalidExclusion {
        pattern: String,
        source: regex::Error,
    },

    #[error("Unknown evaluator '{0}'")]
    UnknownEvaluator(String),

    #[error("Failed to read settings file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to parse settings: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;

/// The three numeric budgets, each accepting a number or a preset keyword
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Limit {
    MaxDepthPerThrowable,
    ShortenedClassNameLength,
    MaxLength,
}

impl Limit {
    pub fn name(self) -> &'static str {
        match self {
            Limit::MaxDepthPerThrowable => "max depth per throwable",
            Limit::ShortenedClassNameLength => "shortened class name length",
            Limit::MaxLength => "max length",
        }
    }

    pub fn full(self) -> usize {
        match self {
            Limit::MaxDepthPerThrowable => FULL_MAX_DEPTH_PER_THROWABLE,
            Limit::ShortenedClassNameLength => FULL_CLASS_NAME_LENGTH,
            Limit::MaxLength => FULL_MAX_LENGTH,
        }
    }

    pub fn short(self) -> usize {
        match self {
            Limit::MaxDepthPerThrowable => SHORT_MAX_DEPTH_PER_THROWABLE,
            Limit::ShortenedClassNameLength => SHORT_CLASS_NAME_LENGTH,
            Limit::MaxLength => SHORT_MAX_LENGTH,
        }
    }

    /// Parse `"full"`, `"short"` or a non-negative integer
    pub fn parse(self, value: &str) -> Result<usize> {
        match value.trim() {
            FULL_PRESET => Ok(self.full()),
            SHORT_PRESET => Ok(self.short()),
            other => other.parse::<usize>().map_err(|_| ConfigError::InvalidLimit {
                setting: self.name(),
                value: value.to_string(),
            }),
        }
    }
}

/// Validated rendering settings
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Frames rendered per error before "N frames truncated"
    pub max_depth_per_throwable: usize,
    /// Class name budget; 0 keeps only the simple name
    pub shortened_class_name_length: usize,
    /// Character budget for the whole rendering, ellipsis included
    pub max_length: usize,
    /// Print the innermost cause first, wrappers after it
    pub root_cause_first: bool,
    pub exclusions: FrameExclusionFilter,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self::full()
    }
}

impl RenderConfig {
    /// Everything, in normal order
    pub fn full() -> Self {
        Self {
            max_depth_per_throwable: FULL_MAX_DEPTH_PER_THROWABLE,
            shortened_class_name_length: FULL_CLASS_NAME_LENGTH,
            max_length: FULL_MAX_LENGTH,
            root_cause_first: false,
            exclusions: FrameExclusionFilter::default(),
        }
    }

    /// Compact logs: few frames, abbreviated packages, bounded length
    pub fn short() -> Self {
        Self {
            max_depth_per_throwable: SHORT_MAX_DEPTH_PER_THROWABLE,
            shortened_class_name_length: SHORT_CLASS_NAME_LENGTH,
            max_length: SHORT_MAX_LENGTH,
            root_cause_first: false,
            exclusions: FrameExclusionFilter::default(),
        }
    }

    pub fn shortener(&self) -> ClassNameShortener {
        ClassNameShortener::new(self.shortened_class_name_length)
    }
}

/// A limit as written in a settings file: `20` or `"short"`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LimitSetting {
    Value(usize),
    Preset(String),
}

impl LimitSetting {
    pub fn resolve(&self, limit: Limit) -> Result<usize> {
        match self {
            LimitSetting::Value(value) => Ok(*value),
            LimitSetting::Preset(preset) => limit.parse(preset),
        }
    }
}

/// TOML settings file
///
/// # Example TOML
/// ```toml
/// max_depth_per_throwable = "short"
/// shortened_class_name_length = 30
/// max_length = 2048
/// root_cause_first = true
/// exclude = ["^sun\\.reflect\\.", "^java\\.lang\\.reflect\\."]
/// evaluators = ["suppress-timeouts"]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RenderSettings {
    #[serde(default)]
    pub max_depth_per_throwable: Option<LimitSetting>,
    #[serde(default)]
    pub shortened_class_name_length: Option<LimitSetting>,
    #[serde(default)]
    pub max_length: Option<LimitSetting>,
    #[serde(default)]
    pub root_cause_first: bool,
    #[serde(default)]
    pub exclude: Vec<String>,
    /// Evaluator names, resolved against a registry by the converter
    #[serde(default)]
    pub evaluators: Vec<String>,
}

impl RenderSettings {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|source| ConfigError::Io {
            path: path.as_ref().display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Apply everything except evaluators
    ///
    /// All values are validated before `config` is touched, so a failed
    /// call leaves it unchanged.
    pub fn apply_to(&self, config: &mut RenderConfig) -> Result<()> {
        let resolve = |setting: &Option<LimitSetting>, limit: Limit| {
            setting.as_ref().map(|s| s.resolve(limit)).transpose()
        };
        let depth = resolve(&self.max_depth_per_throwable, Limit::MaxDepthPerThrowable)?;
        let class_length = resolve(
            &self.shortened_class_name_length,
            Limit::ShortenedClassNameLength,
        )?;
        let max_length = resolve(&self.max_length, Limit::MaxLength)?;
        let rules = self
            .exclude
            .iter()
            .map(ExclusionRule::new)
            .collect::<Result<Vec<_>>>()?;

        if let Some(depth) = depth {
            config.max_depth_per_throwable = depth;
        }
        if let Some(class_length) = class_length {
            config.shortened_class_name_length = class_length;
        }
        if let Some(max_length) = max_length {
            config.max_length = max_length;
        }
        if self.root_cause_first {
            config.root_cause_first = true;
        }
        for rule in rules {
            config.exclusions.push(rule);
        }
        Ok(())
    }
}
