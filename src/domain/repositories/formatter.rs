//! Payload formatter trait
//!
//! Rendering normalized payloads for a specific publishing platform lives
//! outside this crate; this is the contract callers implement.

use serde_json::{Map, Value};

pub trait PayloadFormatter {
    /// Renders a payload; must not mutate its input
    fn format(&self, payload: &Map<String, Value>, platform: &str, language: &str) -> String;
}
