#![no_main]

use libfuzzer_sys::fuzz_target;
use shortrace::converter::ShortenedThrowableConverter;
use shortrace::throwable::ThrowableRecord;

fuzz_target!(|input: (ThrowableRecord, u8, u8, u16, bool)| {
    let (record, depth, class_length, max_length, root_first) = input;
    let mut converter = ShortenedThrowableConverter::<ThrowableRecord>::new();
    converter.set_max_depth_per_throwable(depth as usize);
    converter.set_shortened_class_name_length(class_length as usize);
    converter.set_max_length(max_length as usize);
    converter.set_root_cause_first(root_first);

    let output = converter.convert(&record);
    assert!(output.chars().count() <= max_length as usize);
});
