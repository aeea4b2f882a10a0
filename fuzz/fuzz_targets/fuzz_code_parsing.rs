#![no_main]

use libfuzzer_sys::fuzz_target;
use plugin_errors::MessageCode;

fuzz_target!(|data: &str| {
    if let Ok(code) = MessageCode::parse(data.to_owned()) {
        let status = code.status().unwrap_or_default();
        assert!((0..=999).contains(&status));
        assert_eq!(code.as_str(), data);
        assert_eq!(code.tag().chars().count(), 2);
    }
    if let Ok(code) = MessageCode::parse_log(data.to_owned()) {
        assert_eq!(code.as_str(), data);
    }
});
