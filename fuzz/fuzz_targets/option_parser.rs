#![no_main]

use libfuzzer_sys::fuzz_target;
use shortrace::evaluator::EvaluatorRegistry;
use shortrace::event::ThrowableEvent;
use shortrace::options::parse_options;

fuzz_target!(|data: &[u8]| {
    // Newline-separated tokens, as a pattern layout would pass them
    if let Ok(input) = std::str::from_utf8(data) {
        let tokens: Vec<&str> = input.split('\n').collect();
        let registry = EvaluatorRegistry::<ThrowableEvent>::new();
        // This should not panic regardless of input
        let _ = parse_options(&tokens, &registry);
    }
});
