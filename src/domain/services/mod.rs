//! Domain services
//!
//! Validation, decoding and response-shaping logic that operates on
//! domain entities.

mod decode_strategy;
mod image_validator;
mod integrity_checker;
mod normalizer;
mod prompt;
mod response_parser;

pub use decode_strategy::DecodeStrategyChain;
pub use image_validator::{ImageValidator, Validated, ValidationFailure, ValidationStage};
pub use integrity_checker::IntegrityChecker;
pub use normalizer::{normalize_payload, NormalizedPayload, RAW_RESPONSE_KEY};
pub use prompt::analysis_prompt;
pub use response_parser::{parse_model_response, ParsedResponse};
