//! Cross-cutting pieces shared by every layer: errors and configuration.

pub mod config;
pub mod error;

pub use config::{AnalyzerConfig, DaemonConfig, DecodeConfig, IntegrityConfig, DEFAULT_ENGINE};
pub use error::{CleanupError, ConfigError, DecodeError, DispatchError, InferenceError};
