//! In-process accelerated engine
//!
//! Wraps a hardware-accelerated runtime loaded by the host application.
//! Whether the runtime could be loaded is decided once at startup and
//! injected here as a `RuntimeProbe`; this module never tries to load
//! anything itself.

use super::payload_from_text;
use crate::core::InferenceError;
use crate::domain::entities::EngineAvailability;
use crate::domain::repositories::{EngineRequest, InferenceEngine, RawPayload, VisionRuntime};
use crate::domain::services::analysis_prompt;
use std::sync::Arc;

pub const ACCELERATED_ENGINE_ID: &str = "mlx";

const DEFAULT_MAX_TOKENS: u32 = 1000;

/// Startup verdict on the accelerated runtime
#[derive(Clone)]
pub enum RuntimeProbe {
    Ready(Arc<dyn VisionRuntime>),
    Missing(String),
}

impl std::fmt::Debug for RuntimeProbe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuntimeProbe::Ready(rt) => write!(f, "Ready({})", rt.model_name()),
            RuntimeProbe::Missing(reason) => write!(f, "Missing({})", reason),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AcceleratedEngine {
    probe: RuntimeProbe,
    max_tokens: u32,
}

impl AcceleratedEngine {
    pub fn new(probe: RuntimeProbe) -> Self {
        Self {
            probe,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    /// An engine whose runtime was not available at startup
    pub fn absent(reason: impl Into<String>) -> Self {
        Self::new(RuntimeProbe::Missing(reason.into()))
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

impl InferenceEngine for AcceleratedEngine {
    fn id(&self) -> &str {
        ACCELERATED_ENGINE_ID
    }

    fn analyze(&self, request: &EngineRequest) -> Result<RawPayload, InferenceError> {
        let runtime = match &self.probe {
            RuntimeProbe::Ready(runtime) => runtime,
            RuntimeProbe::Missing(reason) => {
                return Err(InferenceError::Unavailable(reason.clone()));
            }
        };

        tracing::debug!(
            "Running {} on {}",
            runtime.model_name(),
            request.image_path.display()
        );

        let prompt = analysis_prompt(&request.platform, &request.language);
        let text = runtime.generate(&request.image_path, &prompt, self.max_tokens)?;
        Ok(payload_from_text(&text))
    }

    fn check_availability(&self) -> EngineAvailability {
        match &self.probe {
            RuntimeProbe::Ready(_) => EngineAvailability::available(ACCELERATED_ENGINE_ID),
            RuntimeProbe::Missing(reason) => {
                EngineAvailability::unavailable(ACCELERATED_ENGINE_ID, reason.clone())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::{Path, PathBuf};

    struct CannedRuntime(&'static str);

    impl VisionRuntime for CannedRuntime {
        fn model_name(&self) -> &str {
            "canned"
        }

        fn generate(&self, _: &Path, prompt: &str, _: u32) -> Result<String, InferenceError> {
            assert!(prompt.contains("JSON"));
            Ok(self.0.to_string())
        }
    }

    fn request() -> EngineRequest {
        EngineRequest {
            image_path: PathBuf::from("/tmp/x.jpg"),
            platform: "general".to_string(),
            model_hint: None,
            language: "en".to_string(),
        }
    }

    #[test]
    fn test_absent_runtime() {
        let engine = AcceleratedEngine::absent("runtime not installed");
        assert!(!engine.check_availability().available);
        assert!(matches!(
            engine.analyze(&request()),
            Err(InferenceError::Unavailable(_))
        ));
    }

    #[test]
    fn test_ready_runtime_parses_output() {
        let engine = AcceleratedEngine::new(RuntimeProbe::Ready(Arc::new(CannedRuntime(
            "Sure! {\"image_type\": \"food\", \"description\": \"ramen\"}",
        ))));
        assert!(engine.check_availability().available);

        let payload = engine.analyze(&request()).unwrap();
        assert_eq!(payload["image_type"], "food");
    }

    #[test]
    fn test_unstructured_output_is_kept_raw() {
        let engine =
            AcceleratedEngine::new(RuntimeProbe::Ready(Arc::new(CannedRuntime("just prose"))));
        let payload = engine.analyze(&request()).unwrap();
        assert_eq!(payload["raw_response"], "just prose");
    }
}
