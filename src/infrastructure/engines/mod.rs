//! Inference engine adapters
//!
//! Concrete backends behind the `InferenceEngine` port: a daemon-hosted
//! model server reached over HTTP and an in-process accelerated runtime.

mod accelerated;
mod daemon;

pub use accelerated::{AcceleratedEngine, RuntimeProbe, ACCELERATED_ENGINE_ID};
pub use daemon::{DaemonEngine, DAEMON_ENGINE_ID};

use crate::domain::repositories::RawPayload;
use crate::domain::services::{parse_model_response, ParsedResponse, RAW_RESPONSE_KEY};
use serde_json::Value;

/// Turns model text into a raw payload, keeping unparseable text verbatim
pub(crate) fn payload_from_text(text: &str) -> RawPayload {
    match parse_model_response(text) {
        ParsedResponse::Parsed(map) => map,
        ParsedResponse::RawFallback(raw) => {
            tracing::debug!("Model output was not structured JSON, keeping raw text");
            let mut map = RawPayload::new();
            map.insert(RAW_RESPONSE_KEY.to_string(), Value::String(raw));
            map
        }
    }
}
