//! Inference engine trait
//!
//! Defines the capability set every analysis backend provides. New
//! backends plug in by implementing this trait; nothing upstream needs
//! to know which concrete engine it is talking to.

use crate::core::InferenceError;
use crate::domain::entities::EngineAvailability;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// Un-normalized mapping returned by a backend
///
/// Contains either analysis fields or an `error` key.
pub type RawPayload = Map<String, Value>;

/// Inputs handed to a backend for one analysis
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineRequest {
    /// Path of the (possibly repaired) image to analyze
    pub image_path: PathBuf,
    pub platform: String,
    pub model_hint: Option<String>,
    pub language: String,
}

/// Capability set of an inference backend
///
/// # Thread Safety
///
/// Engines are shared across concurrent analyses and invoked from worker
/// threads, so implementations must be `Send + Sync`.
///
/// # Example
///
/// ```ignore
/// struct EchoEngine;
///
/// impl InferenceEngine for EchoEngine {
///     fn id(&self) -> &str { "echo" }
///
///     fn analyze(&self, request: &EngineRequest) -> Result<RawPayload, InferenceError> {
///         let mut payload = RawPayload::new();
///         payload.insert("description".into(), request.platform.clone().into());
///         Ok(payload)
///     }
///
///     fn check_availability(&self) -> EngineAvailability {
///         EngineAvailability::available("echo")
///     }
/// }
/// ```
pub trait InferenceEngine: Send + Sync {
    /// Stable identifier used for selection, e.g. `"ollama"`
    fn id(&self) -> &str;

    /// Runs one analysis and returns the backend's raw mapping
    fn analyze(&self, request: &EngineRequest) -> Result<RawPayload, InferenceError>;

    /// Probes the backend right now; must not block for long
    fn check_availability(&self) -> EngineAvailability;
}

/// In-process accelerated runtime that turns an image plus prompt into text
///
/// Handles are created once at startup by whoever can load the runtime and
/// injected into the accelerated engine.
pub trait VisionRuntime: Send + Sync {
    /// Model identifier reported in logs
    fn model_name(&self) -> &str;

    fn generate(
        &self,
        image_path: &Path,
        prompt: &str,
        max_tokens: u32,
    ) -> Result<String, InferenceError>;
}
