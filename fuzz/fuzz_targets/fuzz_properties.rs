#![no_main]

use libfuzzer_sys::fuzz_target;
use plugin_errors::properties;

fuzz_target!(|data: &str| {
    let props = properties::parse(data);
    // Every key came from a non-comment line.
    assert!(props.len() <= data.lines().count());
});
