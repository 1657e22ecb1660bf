//! Integration tests for ShortenedThrowableConverter
//!
//! Traces come from tests/utils: a RuntimeException thrown eight calls deep
//! inside a generator class, below a test method and 23 test runner frames.

mod utils;

use shortrace::config::{FULL_MAX_DEPTH_PER_THROWABLE, SHORT_MAX_LENGTH};
use shortrace::converter::ShortenedThrowableConverter;
use shortrace::evaluator::{
    EvaluationError, EvaluatorRegistry, EventEvaluator, FnEvaluator, ThrowableClassEvaluator,
};
use shortrace::event::ThrowableEvent;
use shortrace::throwable::{StackFrame, Throwable, ThrowableRecord};
use std::sync::Arc;
use utils::*;

type Converter = ShortenedThrowableConverter<ThrowableEvent>;

fn event(record: ThrowableRecord) -> ThrowableEvent {
    ThrowableEvent::new(record)
}

#[test]
fn test_depth_truncation() {
    let event = event(generate_single("testDepthTruncation"));
    let mut converter = Converter::new();

    converter.set_max_depth_per_throwable(FULL_MAX_DEPTH_PER_THROWABLE);
    let formatted = converter.convert(&event);
    let total_lines = count_lines(&formatted);
    assert!(!formatted.contains("frames truncated"));

    converter.set_max_depth_per_throwable(total_lines - 5);
    let formatted = converter.convert(&event);

    assert_eq!(count_lines(&formatted), total_lines - 3);
    assert!(formatted.contains("4 frames truncated"));
}

#[test]
fn test_length_truncation() {
    let event = event(generate_single("testLengthTruncation"));
    let mut converter = Converter::new();

    let total_length = converter.convert(&event).chars().count();

    converter.set_max_length(total_length - 10);
    let formatted = converter.convert(&event);

    assert_eq!(formatted.chars().count(), total_length - 10);
    assert!(formatted.ends_with("..."));
}

#[test]
fn test_length_budget_not_hit_leaves_output_alone() {
    let event = event(generate_single("testLengthTruncation"));
    let mut converter = Converter::new();
    let full = converter.convert(&event);

    converter.set_max_length(full.chars().count());
    assert_eq!(converter.convert(&event), full);
}

#[test]
fn test_exclusion_consecutive() {
    let event = event(generate_single("testExclusion_consecutive"));
    let mut converter = Converter::new();
    for pattern in ["one", "two", "four", "five", "six"] {
        converter.add_exclude(pattern).unwrap();
    }
    converter.set_max_depth_per_throwable(8);

    let formatted = converter.convert(&event);

    assert!(formatted.contains("2 frames excluded"));
    assert!(formatted.contains("3 frames excluded"));
    assert_eq!(count_lines(&formatted), 12);
}

#[test]
fn test_exclusion_single_frame_still_marked() {
    let event = event(generate_single("testExclusion_noConsecutive"));
    let mut converter = Converter::new();
    converter.set_excludes(["one"]).unwrap();
    converter.set_max_depth_per_throwable(8);

    let formatted = converter.convert(&event);
    let lines = lines(&formatted);

    assert!(formatted.contains("\t... 1 frames excluded\n"));
    assert!(!formatted.contains("oneSingle"));
    // header + 8 frames + excluded marker + truncated marker
    assert_eq!(lines.len(), 11);
    assert!(lines[10].ends_with("frames truncated"));
}

#[test]
fn test_exclusion_at_end() {
    let event = event(generate_single("testExclusion_atEnd"));
    let mut converter = Converter::new();

    let formatted = converter.convert(&event);
    let full_lines = lines(&formatted);
    let second_last = class_and_method(full_lines[full_lines.len() - 2]).to_string();
    let last = class_and_method(full_lines[full_lines.len() - 1]).to_string();

    converter
        .add_exclude(format!("{}$", regex::escape(&second_last)))
        .unwrap();
    converter
        .add_exclude(format!("{}$", regex::escape(&last)))
        .unwrap();
    let formatted = converter.convert(&event);

    assert_eq!(count_lines(&formatted), full_lines.len() - 1);
    assert!(formatted.ends_with("\t... 2 frames excluded\n"));
}

#[test]
fn test_caused_by() {
    let event = event(generate_caused_by("testCausedBy"));
    let mut converter = Converter::new();
    converter.set_max_depth_per_throwable(8);

    let formatted = converter.convert(&event);

    assert!(formatted.contains("Caused by: java.lang.RuntimeException: message"));
    assert!(formatted.contains("\t... 26 common frames omitted\n"));
    assert!(formatted.find("message") > formatted.find("wrapper"));
}

#[test]
fn test_caused_by_exact_tail() {
    let event = event(generate_caused_by("testCausedBy"));
    let mut converter = Converter::new();
    converter.set_max_depth_per_throwable(8);

    let formatted = converter.convert(&event);
    let lines = lines(&formatted);

    assert_eq!(lines[0], "java.lang.RuntimeException: wrapper");
    assert_eq!(lines[9], "\t... 19 frames truncated");
    assert_eq!(lines[10], "Caused by: java.lang.RuntimeException: message");
    assert_eq!(
        lines[17],
        format!("\tat {}.twoCausedBy(ShortenedThrowableConverterTest.java:79)", GENERATOR_CLASS)
    );
    assert_eq!(lines[18], "\t... 26 common frames omitted");
    assert_eq!(lines.len(), 19);
}

#[test]
fn test_root_cause_first() {
    let event = event(generate_caused_by("testRootCauseFirst"));
    let mut converter = Converter::new();
    converter.set_root_cause_first(true);
    converter.set_max_depth_per_throwable(8);

    let formatted = converter.convert(&event);
    let lines = lines(&formatted);

    assert_eq!(lines[0], "java.lang.RuntimeException: message");
    assert!(formatted.contains("Wrapped by: java.lang.RuntimeException: wrapper"));
    assert!(formatted.contains("common frames omitted"));
    assert!(formatted.find("message") < formatted.find("wrapper"));
    assert!(!formatted.contains("Caused by"));
}

#[test]
fn test_evaluator_suppresses_everything() {
    let event = event(generate_caused_by("testEvaluator"));
    let mut converter = Converter::new();
    converter.add_evaluator(Arc::new(FnEvaluator::new("mock", |_: &ThrowableEvent| {
        Ok::<bool, EvaluationError>(true)
    })));

    assert_eq!(converter.convert(&event), "");
}

#[test]
fn test_class_evaluator_matches_cause() {
    let event = event(
        ThrowableRecord::new("app.RequestFailed")
            .with_cause(ThrowableRecord::new("java.util.concurrent.TimeoutException")),
    );
    let mut converter = Converter::new();
    converter.add_evaluator(Arc::new(ThrowableClassEvaluator::new(
        "timeouts",
        regex::Regex::new("Timeout").unwrap(),
    )));

    assert_eq!(converter.convert(&event), "");
}

#[test]
fn test_failing_evaluator_does_not_suppress() {
    let event = event(generate_single("testEvaluatorFailure"));
    let mut converter = Converter::new();
    converter.add_evaluator(Arc::new(FnEvaluator::new("broken", |_: &ThrowableEvent| {
        Err::<bool, EvaluationError>(EvaluationError::new("broken", "no context"))
    })));

    for _ in 0..6 {
        assert!(converter
            .convert(&event)
            .starts_with("java.lang.RuntimeException: message\n"));
    }
    assert_eq!(converter.evaluator_error_count(), 6);
}

#[test]
fn test_options() {
    let mut registry = EvaluatorRegistry::new();
    let evaluator: Arc<dyn EventEvaluator<ThrowableEvent>> =
        Arc::new(FnEvaluator::new("evaluator", |_: &ThrowableEvent| {
            Ok::<bool, EvaluationError>(false)
        }));
    registry.register(evaluator.clone());

    let converter = Converter::from_options(
        &["short", "short", "short", "rootFirst", "evaluator", "regex"],
        &registry,
    )
    .unwrap();

    assert_eq!(converter.max_depth_per_throwable(), 3);
    assert_eq!(converter.shortened_class_name_length(), 10);
    assert_eq!(converter.max_length(), SHORT_MAX_LENGTH);
    assert!(converter.is_root_cause_first());
    assert!(Arc::ptr_eq(&converter.evaluators()[0], &evaluator));
    assert_eq!(converter.excludes(), vec!["regex"]);
}

#[test]
fn test_suppressed() {
    let event = event(generate_suppressed("testSuppressed"));
    let mut converter = Converter::new();
    converter.set_max_depth_per_throwable(8);

    let formatted = converter.convert(&event);
    let lines = lines(&formatted);

    assert_eq!(lines[0], "java.lang.RuntimeException");
    assert!(formatted.contains("\tSuppressed: java.lang.RuntimeException: message\n"));
    assert!(formatted.contains("\t\t... 26 common frames omitted\n"));
}

#[test]
fn test_shortened_name() {
    let event = event(generate_single("testShortenedName"));
    let mut converter = Converter::new();
    converter.set_shortened_class_name_length(10);

    let formatted = converter.convert(&event);

    assert!(!formatted.contains(TEST_PACKAGE));
    assert!(formatted.contains("n.l.l.s."));
    assert!(formatted.starts_with("j.l.RuntimeException: message\n"));
}

#[test]
fn test_no_error_converts_to_empty() {
    let converter = Converter::new();
    assert_eq!(converter.convert(&ThrowableEvent::empty()), "");
}

/// Error that names itself as its own cause
struct Looping {
    frames: Vec<StackFrame>,
}

impl Throwable for Looping {
    fn class_name(&self) -> &str {
        "app.Looping"
    }

    fn message(&self) -> Option<&str> {
        Some("again")
    }

    fn stack_trace(&self) -> &[StackFrame] {
        &self.frames
    }

    fn cause(&self) -> Option<&dyn Throwable> {
        Some(self)
    }
}

#[test]
fn test_self_referencing_cause_renders_once() {
    let looping = Looping {
        frames: vec![StackFrame::new("app.Main", "main").at("Main.java", 1)],
    };
    let converter = Converter::new();

    let formatted = converter.render(&looping);

    assert_eq!(formatted, "app.Looping: again\n\tat app.Main.main(Main.java:1)\n");
}

#[test]
fn test_shared_converter_across_threads() {
    let event = event(generate_caused_by("testThreads"));
    let mut converter = Converter::new();
    converter.set_max_depth_per_throwable(5);
    converter.add_exclude("^sun\\.reflect\\.").unwrap();
    let expected = converter.convert(&event);

    std::thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                for _ in 0..25 {
                    assert_eq!(converter.convert(&event), expected);
                }
            });
        }
    });
}
