#![no_main]

use libfuzzer_sys::fuzz_target;
use plugin_errors::convenience::{MAX_PARAM_LEN, format_message};

fuzz_target!(|input: (&str, &str, &str)| {
    let (template, a, b) = input;
    let msg = format_message(template, &[&a, &b]);
    assert!(!msg.chars().any(char::is_control));

    let single = format_message("{0}", &[&a]);
    if !a.chars().any(char::is_control) {
        assert!(single.len() <= MAX_PARAM_LEN);
    }
});
