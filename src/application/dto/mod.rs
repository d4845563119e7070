//! Data Transfer Objects

mod analysis_request;
mod analysis_result;

pub use analysis_request::AnalysisRequest;
pub use analysis_result::{AnalysisResult, AnalysisStatus, ErrorDetail, ErrorKind, ImageInfo};
