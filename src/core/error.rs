use std::io;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Why a single decode strategy gave up on a file
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Unrecognized image format")]
    UnknownFormat,

    #[error("{format} stream is incomplete: missing trailer marker")]
    IncompleteStream { format: &'static str },

    #[error("Decode failed: {0}")]
    Codec(String),

    #[error("Re-encode failed: {0}")]
    Encode(String),

    #[error("Header unreadable, cannot recover dimensions: {0}")]
    Unreadable(String),
}

impl From<image::ImageError> for DecodeError {
    fn from(err: image::ImageError) -> Self {
        DecodeError::Codec(err.to_string())
    }
}

/// Errors raised by an inference backend for one call
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InferenceError {
    #[error("Engine unavailable: {0}")]
    Unavailable(String),

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Inference timed out after {0:?}")]
    Timeout(Duration),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Backend response could not be parsed: {0}")]
    MalformedResponse(String),

    #[error("Inference worker exited without a result")]
    WorkerLost,
}

impl From<reqwest::Error> for InferenceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            InferenceError::Transport(format!("request timed out: {}", err))
        } else {
            InferenceError::Transport(err.to_string())
        }
    }
}

/// Errors produced while selecting and invoking an engine
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DispatchError {
    #[error("No engine available (requested '{requested}', fallback '{fallback}'): {}", .reasons.join("; "))]
    NoEngineAvailable {
        requested: String,
        fallback: String,
        reasons: Vec<String>,
    },

    #[error("Engine '{engine}' failed: {source}")]
    Inference {
        engine: String,
        #[source]
        source: InferenceError,
    },
}

/// Failure to delete an ephemeral file; never fatal
#[derive(Error, Debug)]
#[error("Failed to remove ephemeral file {path}: {source}")]
pub struct CleanupError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: '{value}' ({reason})")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_error_lists_reasons() {
        let err = DispatchError::NoEngineAvailable {
            requested: "mlx".to_string(),
            fallback: "ollama".to_string(),
            reasons: vec!["runtime missing".to_string(), "connection refused".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("'mlx'"));
        assert!(msg.contains("runtime missing; connection refused"));
    }

    #[test]
    fn test_incomplete_stream_message() {
        let err = DecodeError::IncompleteStream { format: "JPEG" };
        assert_eq!(
            err.to_string(),
            "JPEG stream is incomplete: missing trailer marker"
        );
    }
}
