//! Shortrace - Compact, bounded stack traces for error chains
//!
//! This library renders an error together with its causes and suppressed
//! errors as text, with per-error frame depth limits, class name
//! abbreviation, frame exclusion by regex, common-frame elision and a hard
//! cap on total output length.

pub mod abbreviator;
pub mod capture;
pub mod chain;
pub mod cli;
pub mod common_frames;
pub mod config;
pub mod converter;
pub mod evaluator;
pub mod event;
pub mod exclusion;
pub mod json_provider;
pub mod length_budget;
pub mod options;
pub mod render;
pub mod throwable;
