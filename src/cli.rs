//! CLI argument parsing for shortrace

use crate::json_provider::DEFAULT_FIELD_NAME;
use clap::Parser;
use std::path::PathBuf;

/// Name the `--suppress-class` evaluator is registered under
pub const SUPPRESS_CLASS_EVALUATOR: &str = "suppress-class";

#[derive(Parser, Debug)]
#[command(name = "shortrace")]
#[command(version)]
#[command(about = "Render error chains as compact, bounded stack traces", long_about = None)]
pub struct Cli {
    /// JSON error record to render (reads stdin when omitted or "-")
    #[arg(value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Converter option token (e.g. -o short -o 20 -o full -o rootFirst)
    #[arg(short = 'o', long = "option", value_name = "TOKEN")]
    pub options: Vec<String>,

    /// TOML settings file applied before options and flags
    #[arg(short = 'c', long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Frames rendered per error: a number, "full" or "short"
    #[arg(short = 'd', long = "max-depth", value_name = "DEPTH")]
    pub max_depth: Option<String>,

    /// Target length for shortened class names: a number, "full" or "short"
    #[arg(short = 'l', long = "class-length", value_name = "LENGTH")]
    pub class_length: Option<String>,

    /// Maximum length of the whole output: a number, "full" or "short"
    #[arg(short = 'm', long = "max-length", value_name = "LENGTH")]
    pub max_length: Option<String>,

    /// Print the innermost cause first
    #[arg(short = 'r', long = "root-first")]
    pub root_first: bool,

    /// Exclude frames whose "class.method" matches REGEX (repeatable)
    #[arg(short = 'x', long = "exclude", value_name = "REGEX")]
    pub exclude: Vec<String>,

    /// Print nothing when any error class in the chain matches REGEX
    #[arg(long = "suppress-class", value_name = "REGEX")]
    pub suppress_class: Option<String>,

    /// Emit a JSON object instead of plain text
    #[arg(long = "json")]
    pub json: bool,

    /// Field name used with --json
    #[arg(long = "field-name", value_name = "NAME", default_value = DEFAULT_FIELD_NAME)]
    pub field_name: String,

    /// Enable debug tracing output to stderr
    #[arg(long = "debug")]
    pub debug: bool,
}

impl Cli {
    /// Input path, or `None` for stdin
    pub fn input_path(&self) -> Option<&PathBuf> {
        self.input.as_ref().filter(|path| path.as_os_str() != "-")
    }
}
