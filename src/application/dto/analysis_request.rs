//! Analysis request DTO

use crate::core::DEFAULT_ENGINE;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Input for one analysis; not modified once submitted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    pub image_path: PathBuf,
    /// Target publishing platform, e.g. `general` or `tuchong`
    pub platform: String,
    /// Overrides the engine's configured model
    pub model_hint: Option<String>,
    pub language: String,
    pub requested_engine: String,
    /// Overrides the configured inference timeout
    pub timeout: Option<Duration>,
}

impl AnalysisRequest {
    pub fn new(image_path: impl AsRef<Path>) -> Self {
        Self {
            image_path: image_path.as_ref().to_path_buf(),
            platform: "general".to_string(),
            model_hint: None,
            language: "en".to_string(),
            requested_engine: DEFAULT_ENGINE.to_string(),
            timeout: None,
        }
    }

    pub fn with_platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = platform.into();
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_model_hint(mut self, model: impl Into<String>) -> Self {
        self.model_hint = Some(model.into());
        self
    }

    pub fn with_engine(mut self, engine: impl Into<String>) -> Self {
        self.requested_engine = engine.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// File name shown in results
    pub fn image_name(&self) -> String {
        self.image_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.image_path.display().to_string())
    }
}
