#![no_main]

use libfuzzer_sys::fuzz_target;
use pictriage::{DecodeConfig, ImageValidator, IntegrityConfig};
use std::io::Write;

fuzz_target!(|data: &[u8]| {
    let Ok(mut file) = tempfile::Builder::new().suffix(".jpg").tempfile() else {
        return;
    };
    if file.write_all(data).is_err() {
        return;
    }

    let validator = ImageValidator::new(
        IntegrityConfig::default(),
        DecodeConfig::new().with_max_dimension(256).with_prescale(1024, 512),
    );
    match validator.validate_and_fix(file.path()) {
        Ok(validated) => {
            let (w, h) = validated.image.final_dimensions;
            assert!((w <= 256 && h <= 256) || validated.image.untouched);
        }
        Err(failure) => assert!(failure.report.has_error()),
    }
});
