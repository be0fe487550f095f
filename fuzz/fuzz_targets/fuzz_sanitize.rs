#![no_main]

use libfuzzer_sys::fuzz_target;
use pain001::core::text::{is_sepa_char, sanitize};

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let once = sanitize(s, 140);
        assert!(once.len() <= 140);
        assert!(once.chars().all(is_sepa_char));
        assert_eq!(sanitize(&once, 140), once);
    }
});
