#![no_main]

use libfuzzer_sys::fuzz_target;
use pain001::core::identifiers::{
    ReferenceKind, classify_structured_reference, structured_reference_value,
};

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        for country in [None, Some("BE"), Some("FI"), Some("NO"), Some("SE")] {
            for iban in [None, Some("CH4431999123000889012")] {
                let kind = classify_structured_reference(s, country, iban);
                let value = structured_reference_value(kind, s);
                if kind == ReferenceKind::Unstructured {
                    assert!(value.is_none());
                }
            }
        }
    }
});
