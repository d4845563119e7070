//! Payload formatters
//!
//! Minimal renderings used by the command-line harness. Platform-specific
//! publishing templates implement `PayloadFormatter` outside this crate.

use crate::domain::repositories::PayloadFormatter;
use serde_json::{Map, Value};

/// Pretty-printed JSON, language and platform agnostic
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFormatter;

impl PayloadFormatter for JsonFormatter {
    fn format(&self, payload: &Map<String, Value>, _platform: &str, _language: &str) -> String {
        serde_json::to_string_pretty(payload).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Human-readable summary: type, description, keyword line
#[derive(Debug, Clone, Copy, Default)]
pub struct SummaryFormatter;

impl SummaryFormatter {
    fn labels(language: &str) -> (&'static str, &'static str, &'static str) {
        match language {
            "zh" => ("类型", "描述", "关键词"),
            _ => ("Type", "Description", "Keywords"),
        }
    }
}

impl PayloadFormatter for SummaryFormatter {
    fn format(&self, payload: &Map<String, Value>, platform: &str, language: &str) -> String {
        let (type_label, desc_label, kw_label) = Self::labels(language);
        let text = |key: &str| payload.get(key).and_then(Value::as_str).unwrap_or("");

        let keywords: Vec<&str> = payload
            .get("keywords")
            .and_then(Value::as_array)
            .map(|arr| arr.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();

        // Stock platforms take comma-separated tags, everything else gets hashtags
        let keyword_line = if platform == "tuchong" || platform == "general" {
            keywords.join(", ")
        } else {
            keywords
                .iter()
                .map(|k| format!("#{}", k.replace(' ', "")))
                .collect::<Vec<_>>()
                .join(" ")
        };

        format!(
            "{}: {}\n{}: {}\n{}: {}",
            type_label,
            text("image_type"),
            desc_label,
            text("description"),
            kw_label,
            keyword_line
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload() -> Map<String, Value> {
        json!({
            "image_type": "landscape",
            "description": "misty mountains",
            "keywords": ["mountain", "fog bank"]
        })
        .as_object()
        .cloned()
        .unwrap()
    }

    #[test]
    fn test_json_formatter_round_trips() {
        let input = payload();
        let out = JsonFormatter.format(&input, "general", "en");
        let back: Map<String, Value> = serde_json::from_str(&out).unwrap();
        assert_eq!(back, input);
    }

    #[test]
    fn test_summary_general_uses_commas() {
        let out = SummaryFormatter.format(&payload(), "general", "en");
        assert!(out.contains("Type: landscape"));
        assert!(out.ends_with("Keywords: mountain, fog bank"));
    }

    #[test]
    fn test_summary_social_uses_hashtags() {
        let out = SummaryFormatter.format(&payload(), "xiaohongshu", "zh");
        assert!(out.contains("描述: misty mountains"));
        assert!(out.contains("#mountain #fogbank"));
    }

    #[test]
    fn test_formatters_do_not_mutate() {
        let input = payload();
        let before = input.clone();
        let _ = SummaryFormatter.format(&input, "general", "en");
        let _ = JsonFormatter.format(&input, "general", "en");
        assert_eq!(input, before);
    }
}
