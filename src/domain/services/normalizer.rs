//! Payload normalizer
//!
//! Backends disagree on field names. Everything leaving the dispatcher
//! carries `image_type`, `description` and `keywords`; any other fields a
//! backend produced are kept alongside.

use serde_json::{Map, Value};

pub const RAW_RESPONSE_KEY: &str = "raw_response";
const RAW_DESCRIPTION_CHARS: usize = 200;

/// A payload in the common shape
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedPayload {
    pub fields: Map<String, Value>,
    /// The backend text could not be parsed as structured output
    pub raw_fallback: bool,
}

/// Maps a raw backend mapping onto the common payload shape
pub fn normalize_payload(raw: Map<String, Value>) -> NormalizedPayload {
    let raw_fallback = is_raw_only(&raw);
    let mut fields = raw;

    if raw_fallback {
        let text = fields
            .get(RAW_RESPONSE_KEY)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        fields.insert("image_type".into(), Value::from("other"));
        fields.insert("description".into(), Value::from(truncate_chars(&text, RAW_DESCRIPTION_CHARS)));
        fields.insert("keywords".into(), Value::Array(Vec::new()));
        fields.insert("parse".into(), Value::from("raw_fallback"));
        return NormalizedPayload {
            fields,
            raw_fallback,
        };
    }

    let image_type = first_string(&fields, &["image_type", "category", "type"])
        .unwrap_or_else(|| "other".to_string());

    let description = first_string(
        &fields,
        &["description", "detailed_description", "main_subject", "caption"],
    )
    .unwrap_or_default();

    let keywords = match string_list(fields.get("keywords")) {
        list if !list.is_empty() => list,
        _ => {
            let mut merged = string_list(fields.get("keywords_cn"));
            for keyword in string_list(fields.get("keywords_en")) {
                if !merged.contains(&keyword) {
                    merged.push(keyword);
                }
            }
            merged
        }
    };

    fields.insert("image_type".into(), Value::from(image_type));
    fields.insert("description".into(), Value::from(description));
    fields.insert(
        "keywords".into(),
        Value::Array(keywords.into_iter().map(Value::from).collect()),
    );

    NormalizedPayload {
        fields,
        raw_fallback,
    }
}

fn is_raw_only(raw: &Map<String, Value>) -> bool {
    raw.contains_key(RAW_RESPONSE_KEY)
        && !["image_type", "description", "keywords", "main_subject"]
            .iter()
            .any(|k| raw.contains_key(*k))
}

fn first_string(fields: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| fields.get(*k))
        .filter_map(Value::as_str)
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

/// Accepts an array of strings or a comma-separated string
fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        Some(Value::String(s)) => s
            .split([',', '，'])
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
