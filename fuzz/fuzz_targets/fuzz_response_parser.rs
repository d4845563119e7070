#![no_main]

use libfuzzer_sys::fuzz_target;
use pictriage::domain::services::{normalize_payload, parse_model_response, ParsedResponse};

fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data);
    if let ParsedResponse::Parsed(map) = parse_model_response(&text) {
        let normalized = normalize_payload(map);
        assert!(normalized.fields.contains_key("image_type"));
        assert!(normalized.fields.contains_key("keywords"));
    }
});
