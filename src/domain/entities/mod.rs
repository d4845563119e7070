//! Domain entities
//!
//! Core value objects describing files under inspection, decode results
//! and backend availability.

mod decode_outcome;
mod engine;
mod file_signature;
mod integrity_report;

pub use decode_outcome::{AttemptFailure, DecodeMethod, DecodeOutcome, DecodedImage, Dimensions};
pub use engine::EngineAvailability;
pub use file_signature::{is_supported_extension, ImageKind};
pub use integrity_report::{IntegrityReport, VALIDATION_SUGGESTIONS};
