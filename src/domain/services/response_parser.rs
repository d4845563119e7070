//! Tolerant parser for free-form model output
//!
//! Vision models wrap their JSON in commentary or code fences. The parser
//! looks for the first complete JSON object and never guesses: anything
//! it cannot parse is handed back untouched as `RawFallback`.

use serde_json::{Map, Value};

/// Upper bound on `{` positions tried before giving up
const MAX_CANDIDATES: usize = 64;

#[derive(Debug, Clone, PartialEq)]
pub enum ParsedResponse {
    Parsed(Map<String, Value>),
    RawFallback(String),
}

impl ParsedResponse {
    pub fn is_parsed(&self) -> bool {
        matches!(self, ParsedResponse::Parsed(_))
    }
}

pub fn parse_model_response(text: &str) -> ParsedResponse {
    let trimmed = text.trim();

    if let Some(fenced) = fenced_json(trimmed) {
        if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(fenced) {
            return ParsedResponse::Parsed(map);
        }
    }

    for (start, _) in trimmed.match_indices('{').take(MAX_CANDIDATES) {
        let mut stream = serde_json::Deserializer::from_str(&trimmed[start..]).into_iter::<Value>();
        match stream.next() {
            Some(Ok(Value::Object(map))) => return ParsedResponse::Parsed(map),
            // Unterminated object: every later brace sits inside it.
            Some(Err(e)) if e.is_eof() => break,
            _ => continue,
        }
    }

    ParsedResponse::RawFallback(trimmed.to_string())
}

fn fenced_json(text: &str) -> Option<&str> {
    let open = text.find("```json")?;
    let body = &text[open + "```json".len()..];
    let close = body.find("```")?;
    Some(body[..close].trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_plain_object() {
        let parsed = parse_model_response(r#"{"image_type": "landscape"}"#);
        let ParsedResponse::Parsed(map) = parsed else {
            panic!("expected parsed object");
        };
        assert_eq!(map["image_type"], "landscape");
    }

    #[test]
    fn test_fenced_block_wins() {
        let text = "Here you go:\n```json\n{\"keywords\": [\"sea\"]}\n```\nHope {this} helps";
        let ParsedResponse::Parsed(map) = parse_model_response(text) else {
            panic!("expected parsed object");
        };
        assert_eq!(map["keywords"][0], "sea");
    }

    #[test]
    fn test_commentary_braces_are_skipped() {
        let text = r#"Fields use {curly} notation. {"description": "a cat"} trailing {junk"#;
        let ParsedResponse::Parsed(map) = parse_model_response(text) else {
            panic!("expected parsed object");
        };
        assert_eq!(map["description"], "a cat");
    }

    #[test]
    fn test_truncated_object_is_not_mined_for_fragments() {
        let text = r#"{"image_type": "food", "meta": {"k": 1}, "keywords": ["a", "b""#;
        assert_eq!(
            parse_model_response(text),
            ParsedResponse::RawFallback(text.to_string())
        );
    }

    #[test]
    fn test_no_json_at_all() {
        let parsed = parse_model_response("  A sunny beach with palm trees.  ");
        assert_eq!(
            parsed,
            ParsedResponse::RawFallback("A sunny beach with palm trees.".to_string())
        );
        assert!(!parsed.is_parsed());
    }

    #[test]
    fn test_top_level_array_is_not_a_payload() {
        assert!(!parse_model_response(r#"["a", "b"]"#).is_parsed());
    }

    proptest! {
        #[test]
        fn prop_never_panics(text in ".{0,256}") {
            let _ = parse_model_response(&text);
        }
    }
}
