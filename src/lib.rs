//! Resilient ingestion and backend dispatch for visual analysis
//!
//! Untrusted image files are pre-checked, repaired through an escalating
//! chain of decode strategies and handed to an interchangeable inference
//! backend. Every failure comes back as a structured result.
//!
//! ```ignore
//! use pictriage::{AnalysisRequest, AnalyzeImageUseCase, AnalyzerConfig, EngineRegistry, RuntimeProbe};
//!
//! let config = AnalyzerConfig::from_env()?;
//! let registry = EngineRegistry::with_defaults(&config, RuntimeProbe::Missing("not loaded".into()))?;
//! let analyzer = AnalyzeImageUseCase::new(&config, registry);
//! let result = analyzer.execute(&AnalysisRequest::new("photo.jpg"));
//! ```

pub mod application;
pub mod core;
pub mod domain;
pub mod infrastructure;
pub mod presentation;

pub use application::dto::{
    AnalysisRequest, AnalysisResult, AnalysisStatus, ErrorDetail, ErrorKind, ImageInfo,
};
pub use application::{AnalysisDispatcher, AnalyzeImageUseCase, BatchAnalyzer, EngineRegistry};
pub use core::{AnalyzerConfig, DecodeConfig, IntegrityConfig};
pub use domain::entities::{DecodeMethod, DecodeOutcome, EngineAvailability, IntegrityReport};
pub use domain::repositories::{InferenceEngine, PayloadFormatter, VisionRuntime};
pub use domain::services::{DecodeStrategyChain, ImageValidator, IntegrityChecker};
pub use infrastructure::engines::RuntimeProbe;
