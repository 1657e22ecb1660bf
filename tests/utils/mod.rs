// Integration Test Utilities
//
// Synthetic stack traces shaped like a JVM test run: a generator class
// calling eight levels deep, the test method, then the test runner frames.

#![allow(dead_code)]

use shortrace::throwable::{StackFrame, ThrowableRecord};

pub const TEST_CLASS: &str = "net.logstash.logback.stacktrace.ShortenedThrowableConverterTest";
pub const GENERATOR_CLASS: &str =
    "net.logstash.logback.stacktrace.ShortenedThrowableConverterTest$StackTraceElementGenerator";
pub const TEST_PACKAGE: &str = "net.logstash.logback.stacktrace";
pub const RUNTIME_EXCEPTION: &str = "java.lang.RuntimeException";

/// Frames below the test method, innermost first
const RUNNER_FRAMES: &[(&str, &str, Option<&str>, Option<u32>)] = &[
    ("sun.reflect.NativeMethodAccessorImpl", "invoke0", None, None),
    (
        "sun.reflect.NativeMethodAccessorImpl",
        "invoke",
        Some("NativeMethodAccessorImpl.java"),
        Some(62),
    ),
    (
        "sun.reflect.DelegatingMethodAccessorImpl",
        "invoke",
        Some("DelegatingMethodAccessorImpl.java"),
        Some(43),
    ),
    ("java.lang.reflect.Method", "invoke", Some("Method.java"), Some(497)),
    (
        "org.junit.runners.model.FrameworkMethod$1",
        "runReflectiveCall",
        Some("FrameworkMethod.java"),
        Some(50),
    ),
    (
        "org.junit.internal.runners.model.ReflectiveCallable",
        "run",
        Some("ReflectiveCallable.java"),
        Some(12),
    ),
    (
        "org.junit.runners.model.FrameworkMethod",
        "invokeExplosively",
        Some("FrameworkMethod.java"),
        Some(47),
    ),
    (
        "org.junit.internal.runners.statements.InvokeMethod",
        "evaluate",
        Some("InvokeMethod.java"),
        Some(17),
    ),
    ("org.junit.runners.ParentRunner", "runLeaf", Some("ParentRunner.java"), Some(325)),
    (
        "org.junit.runners.BlockJUnit4ClassRunner",
        "runChild",
        Some("BlockJUnit4ClassRunner.java"),
        Some(78),
    ),
    (
        "org.junit.runners.BlockJUnit4ClassRunner",
        "runChild",
        Some("BlockJUnit4ClassRunner.java"),
        Some(57),
    ),
    ("org.junit.runners.ParentRunner$3", "run", Some("ParentRunner.java"), Some(290)),
    ("org.junit.runners.ParentRunner$1", "schedule", Some("ParentRunner.java"), Some(71)),
    ("org.junit.runners.ParentRunner", "runChildren", Some("ParentRunner.java"), Some(288)),
    ("org.junit.runners.ParentRunner", "access$000", Some("ParentRunner.java"), Some(58)),
    ("org.junit.runners.ParentRunner$2", "evaluate", Some("ParentRunner.java"), Some(268)),
    ("org.junit.runners.ParentRunner", "run", Some("ParentRunner.java"), Some(363)),
    ("org.junit.runner.JUnitCore", "run", Some("JUnitCore.java"), Some(137)),
    (
        "org.apache.maven.surefire.junit4.JUnit4Provider",
        "execute",
        Some("JUnit4Provider.java"),
        Some(252),
    ),
    (
        "org.apache.maven.surefire.junit4.JUnit4Provider",
        "executeTestSet",
        Some("JUnit4Provider.java"),
        Some(141),
    ),
    (
        "org.apache.maven.surefire.junit4.JUnit4Provider",
        "invoke",
        Some("JUnit4Provider.java"),
        Some(112),
    ),
    (
        "org.apache.maven.surefire.booter.ForkedBooter",
        "runSuitesInProcess",
        Some("ForkedBooter.java"),
        Some(189),
    ),
    ("org.apache.maven.surefire.booter.ForkedBooter", "main", Some("ForkedBooter.java"), Some(149)),
];

pub fn generator_frame(method: &str, line: u32) -> StackFrame {
    StackFrame::new(GENERATOR_CLASS, method).at("ShortenedThrowableConverterTest.java", line)
}

pub fn runner_frames() -> Vec<StackFrame> {
    RUNNER_FRAMES
        .iter()
        .map(|&(class, method, file, line)| {
            let frame = StackFrame::new(class, method);
            match (file, line) {
                (Some(file), Some(line)) => frame.at(file, line),
                (Some(file), None) => frame.in_file(file),
                _ => frame,
            }
        })
        .collect()
}

/// Test method frame followed by the runner frames
fn caller_frames(test_method: &str) -> Vec<StackFrame> {
    let mut frames = vec![
        StackFrame::new(TEST_CLASS, test_method).at("ShortenedThrowableConverterTest.java", 110),
    ];
    frames.extend(runner_frames());
    frames
}

/// eight .. four, shared by every generated error
fn deep_frames() -> Vec<StackFrame> {
    vec![
        generator_frame("eight", 69),
        generator_frame("seven", 66),
        generator_frame("six", 63),
        generator_frame("five", 60),
        generator_frame("four", 57),
        generator_frame("threeSingle", 54),
    ]
}

/// RuntimeException("message") thrown from `eight()` via `generateSingle()`
pub fn generate_single(test_method: &str) -> ThrowableRecord {
    let mut frames = deep_frames();
    frames.push(generator_frame("twoSingle", 51));
    frames.push(generator_frame("oneSingle", 48));
    frames.push(generator_frame("generateSingle", 45));
    frames.extend(caller_frames(test_method));
    ThrowableRecord::new(RUNTIME_EXCEPTION)
        .with_message("message")
        .with_frames(frames)
}

/// RuntimeException("wrapper") caused by RuntimeException("message")
pub fn generate_caused_by(test_method: &str) -> ThrowableRecord {
    let mut cause_frames = deep_frames();
    cause_frames.push(generator_frame("twoCausedBy", 79));
    cause_frames.push(generator_frame("oneCausedBy", 75));
    cause_frames.push(generator_frame("generateCausedBy", 72));
    cause_frames.extend(caller_frames(test_method));

    let mut wrapper_frames = vec![
        generator_frame("twoCausedBy", 81),
        generator_frame("oneCausedBy", 75),
        generator_frame("generateCausedBy", 72),
    ];
    wrapper_frames.extend(caller_frames(test_method));

    ThrowableRecord::new(RUNTIME_EXCEPTION)
        .with_message("wrapper")
        .with_frames(wrapper_frames)
        .with_cause(
            ThrowableRecord::new(RUNTIME_EXCEPTION)
                .with_message("message")
                .with_frames(cause_frames),
        )
}

/// RuntimeException with the original error attached as suppressed
pub fn generate_suppressed(test_method: &str) -> ThrowableRecord {
    let mut suppressed_frames = deep_frames();
    suppressed_frames.push(generator_frame("twoSuppressed", 92));
    suppressed_frames.push(generator_frame("oneSuppressed", 88));
    suppressed_frames.push(generator_frame("generateSuppressed", 85));
    suppressed_frames.extend(caller_frames(test_method));

    let mut outer_frames = vec![
        generator_frame("twoSuppressed", 96),
        generator_frame("oneSuppressed", 88),
        generator_frame("generateSuppressed", 85),
    ];
    outer_frames.extend(caller_frames(test_method));

    ThrowableRecord::new(RUNTIME_EXCEPTION)
        .with_frames(outer_frames)
        .with_suppressed(
            ThrowableRecord::new(RUNTIME_EXCEPTION)
                .with_message("message")
                .with_frames(suppressed_frames),
        )
}

pub fn lines(formatted: &str) -> Vec<&str> {
    formatted.lines().collect()
}

pub fn count_lines(formatted: &str) -> usize {
    formatted.lines().count()
}

/// "class.method" from a rendered frame line
pub fn class_and_method(line: &str) -> &str {
    let start = line.find("at ").map_or(0, |i| i + 3);
    let end = line.find('(').unwrap_or(line.len());
    &line[start..end]
}
