//! Repository traits (interfaces)
//!
//! These traits define the contracts for external dependencies:
//! inference backends, in-process runtimes and output formatters.

mod formatter;
mod inference_engine;

pub use formatter::PayloadFormatter;
pub use inference_engine::{EngineRequest, InferenceEngine, RawPayload, VisionRuntime};
