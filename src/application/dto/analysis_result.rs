//! Analysis result DTO
//!
//! The record handed back to web and CLI layers. A `Success` result
//! always carries a non-empty payload; every other status carries an
//! error with at least one suggestion.

use crate::domain::entities::{DecodeMethod, Dimensions, VALIDATION_SUGGESTIONS};
use serde::Serialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisStatus {
    Success,
    ValidationFailed,
    DispatchFailed,
    InferenceFailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    IntegrityError,
    DecodeExhausted,
    EngineUnavailable,
    InferenceFailed,
    UnparseableResponse,
}

impl ErrorKind {
    /// Remediation hints shown when the caller supplies none
    pub fn default_suggestions(&self) -> Vec<String> {
        let hints: &[&str] = match self {
            ErrorKind::IntegrityError | ErrorKind::DecodeExhausted => &VALIDATION_SUGGESTIONS[..],
            ErrorKind::EngineUnavailable => &[
                "Start the model server (e.g. `ollama serve`) and pull the configured model",
                "Request a different engine",
            ],
            ErrorKind::InferenceFailed => &[
                "Retry the analysis later",
                "Increase the inference timeout",
                "Check the backend logs for errors",
            ],
            ErrorKind::UnparseableResponse => &[
                "Retry the analysis; the model did not return structured output",
                "Try a different model",
            ],
        };
        hints.iter().map(|s| s.to_string()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorDetail {
    pub kind: ErrorKind,
    pub message: String,
    pub suggestions: Vec<String>,
}

impl ErrorDetail {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            suggestions: kind.default_suggestions(),
        }
    }

    /// Replaces the default hints; an empty list keeps the defaults
    pub fn with_suggestions(mut self, suggestions: Vec<String>) -> Self {
        if !suggestions.is_empty() {
            self.suggestions = suggestions;
        }
        self
    }
}

/// Image and timing metadata merged into every result
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageInfo {
    pub image_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_size: Option<Dimensions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_size: Option<Dimensions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method_used: Option<DecodeMethod>,
    pub requested_engine: String,
    /// Engine that actually ran; differs from `requested_engine` on fallback
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engine_used: Option<String>,
    pub engine_substituted: bool,
    pub pre_scaled: bool,
    pub processing_time_seconds: f64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub status: AnalysisStatus,
    pub payload: Map<String, Value>,
    pub image_info: ImageInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorDetail>,
}

impl AnalysisResult {
    pub fn success(payload: Map<String, Value>, image_info: ImageInfo) -> Self {
        Self {
            status: AnalysisStatus::Success,
            payload,
            image_info,
            error: None,
        }
    }

    pub fn failure(status: AnalysisStatus, image_info: ImageInfo, error: ErrorDetail) -> Self {
        Self {
            status,
            payload: Map::new(),
            image_info,
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == AnalysisStatus::Success
    }

    /// Single-line outcome for logs and terminal output
    pub fn summary(&self) -> String {
        match &self.error {
            None => format!(
                "{}: {} via {} in {:.2}s",
                self.image_info.image_name,
                self.payload
                    .get("image_type")
                    .and_then(Value::as_str)
                    .unwrap_or("other"),
                self.image_info.engine_used.as_deref().unwrap_or("-"),
                self.image_info.processing_time_seconds
            ),
            Some(error) => format!(
                "{}: {:?} ({})",
                self.image_info.image_name, error.kind, error.message
            ),
        }
    }
}
