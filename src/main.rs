use anyhow::{Context, Result};
use clap::Parser;
use regex::Regex;
use shortrace::cli::{Cli, SUPPRESS_CLASS_EVALUATOR};
use shortrace::config::{Limit, RenderSettings};
use shortrace::converter::ShortenedThrowableConverter;
use shortrace::evaluator::{EvaluatorRegistry, ThrowableClassEvaluator};
use shortrace::event::ThrowableEvent;
use shortrace::json_provider::StackTraceJsonProvider;
use shortrace::throwable::ThrowableRecord;
use std::io::{self, Read, Write};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber for debug output
fn init_tracing(debug: bool) {
    if debug {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::TRACE.into()),
            )
            .with_writer(std::io::stderr)
            .init();
    }
}

/// Read the error record from the input file or stdin
fn read_record(args: &Cli) -> Result<ThrowableRecord> {
    let content = match args.input_path() {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read stdin")?;
            buffer
        }
    };
    serde_json::from_str(&content).context("Input is not a valid error record")
}

fn build_registry(args: &Cli) -> Result<EvaluatorRegistry<ThrowableEvent>> {
    let mut registry = EvaluatorRegistry::new();
    if let Some(pattern) = &args.suppress_class {
        let regex = Regex::new(pattern)
            .with_context(|| format!("Invalid --suppress-class pattern: {}", pattern))?;
        registry.register(Arc::new(ThrowableClassEvaluator::new(
            SUPPRESS_CLASS_EVALUATOR,
            regex,
        )));
    }
    Ok(registry)
}

/// Settings file first, then option tokens, then individual flags
fn build_converter(
    args: &Cli,
    registry: &EvaluatorRegistry<ThrowableEvent>,
) -> Result<ShortenedThrowableConverter<ThrowableEvent>> {
    let mut converter = ShortenedThrowableConverter::new();

    if let Some(path) = &args.config {
        let settings = RenderSettings::from_file(path)?;
        converter.apply_settings(&settings, registry)?;
    }
    converter.apply_options(&args.options, registry)?;

    if let Some(depth) = &args.max_depth {
        converter.set_max_depth_per_throwable(Limit::MaxDepthPerThrowable.parse(depth)?);
    }
    if let Some(length) = &args.class_length {
        converter.set_shortened_class_name_length(Limit::ShortenedClassNameLength.parse(length)?);
    }
    if let Some(max_length) = &args.max_length {
        converter.set_max_length(Limit::MaxLength.parse(max_length)?);
    }
    if args.root_first {
        converter.set_root_cause_first(true);
    }
    for pattern in &args.exclude {
        converter.add_exclude(pattern.as_str())?;
    }
    if let Some(evaluator) = registry.get(SUPPRESS_CLASS_EVALUATOR) {
        if !converter
            .evaluators()
            .iter()
            .any(|e| e.name() == SUPPRESS_CLASS_EVALUATOR)
        {
            converter.add_evaluator(evaluator);
        }
    }

    Ok(converter)
}

fn main() -> Result<()> {
    let args = Cli::parse();

    // Initialize tracing if --debug flag is set
    init_tracing(args.debug);

    let registry = build_registry(&args)?;
    let converter = build_converter(&args, &registry)?;
    let event = ThrowableEvent::new(read_record(&args)?);

    let mut stdout = io::stdout().lock();
    if args.json {
        let provider = StackTraceJsonProvider::new(converter).with_field_name(&args.field_name);
        writeln!(stdout, "{}", provider.to_json(&event)?)?;
    } else {
        write!(stdout, "{}", converter.convert(&event))?;
    }
    stdout.flush()?;

    Ok(())
}
