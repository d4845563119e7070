//! Application layer
//!
//! Use cases that orchestrate validation, engine selection and dispatch.

mod analyze_image;
mod batch;
mod dispatcher;
pub mod dto;
mod engine_registry;

pub use analyze_image::AnalyzeImageUseCase;
pub use batch::BatchAnalyzer;
pub use dispatcher::{AnalysisDispatcher, Dispatched};
pub use engine_registry::EngineRegistry;
