//! Analyze image use case
//!
//! The public entry point: validates and repairs the file, stages a
//! repaired copy when one was produced, dispatches it to a backend and
//! merges timing and image metadata into the result.
//!
//! Validation and dispatch failures come back as structured results;
//! nothing short of a fatal fault escapes `execute`.

use crate::application::dto::{
    AnalysisRequest, AnalysisResult, AnalysisStatus, ErrorDetail, ErrorKind, ImageInfo,
};
use crate::application::{AnalysisDispatcher, EngineRegistry};
use crate::core::{AnalyzerConfig, DispatchError, InferenceError};
use crate::domain::entities::EngineAvailability;
use crate::domain::repositories::EngineRequest;
use crate::domain::services::{ImageValidator, ValidationFailure, ValidationStage};
use crate::infrastructure::ephemeral::{EphemeralFile, EphemeralStore};
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Orchestrates one analysis end to end
///
/// Holds only read-only configuration and shared engines, so a single
/// instance can serve any number of concurrent calls.
pub struct AnalyzeImageUseCase {
    validator: ImageValidator,
    dispatcher: AnalysisDispatcher,
    store: EphemeralStore,
    inference_timeout: Duration,
}

impl AnalyzeImageUseCase {
    pub fn new(config: &AnalyzerConfig, registry: EngineRegistry) -> Self {
        Self {
            validator: ImageValidator::new(config.integrity.clone(), config.decode.clone()),
            dispatcher: AnalysisDispatcher::new(registry)
                .with_raw_fallback(config.accept_raw_fallback),
            store: EphemeralStore::new(config.temp_dir.clone()),
            inference_timeout: config.inference_timeout,
        }
    }

    pub fn validator(&self) -> &ImageValidator {
        &self.validator
    }

    pub fn dispatcher(&self) -> &AnalysisDispatcher {
        &self.dispatcher
    }

    /// Probes every configured engine
    pub fn engines(&self) -> Vec<EngineAvailability> {
        self.dispatcher.list_engines()
    }

    pub fn execute(&self, request: &AnalysisRequest) -> AnalysisResult {
        let started = Instant::now();
        let mut info = ImageInfo {
            image_name: request.image_name(),
            requested_engine: request.requested_engine.clone(),
            ..ImageInfo::default()
        };

        let validated = match self.validator.validate_and_fix(&request.image_path) {
            Ok(validated) => validated,
            Err(failure) => {
                tracing::warn!(
                    "Validation failed for {}: {}",
                    request.image_path.display(),
                    failure.report.errors().join("; ")
                );
                info.warnings = failure.report.warnings().to_vec();
                info.processing_time_seconds = elapsed_seconds(started);
                return AnalysisResult::failure(
                    AnalysisStatus::ValidationFailed,
                    info,
                    validation_error(&failure),
                );
            }
        };

        let image = validated.image;
        tracing::info!(
            "Validation passed for {}: {}x{} -> {}x{} via {} ({} attempt(s))",
            info.image_name,
            image.original_dimensions.0,
            image.original_dimensions.1,
            image.final_dimensions.0,
            image.final_dimensions.1,
            image.method,
            image.attempts_tried
        );

        info.original_size = Some(image.original_dimensions);
        info.final_size = Some(image.final_dimensions);
        info.method_used = Some(image.method);
        info.pre_scaled = image.pre_scaled;
        info.warnings = validated.report.warnings().to_vec();

        let staged: Option<EphemeralFile> = if image.untouched {
            None
        } else {
            match self.store.materialize(&image.encoded) {
                Ok(file) => Some(file),
                Err(e) => {
                    tracing::warn!("Could not stage repaired copy of {}: {}", info.image_name, e);
                    info.processing_time_seconds = elapsed_seconds(started);
                    return AnalysisResult::failure(
                        AnalysisStatus::InferenceFailed,
                        info,
                        ErrorDetail::new(
                            ErrorKind::InferenceFailed,
                            format!("Repaired copy could not be staged: {}", e),
                        )
                        .with_suggestions(vec![
                            "Check that the temporary directory exists and is writable".to_string(),
                            "Free up disk space and retry".to_string(),
                        ]),
                    );
                }
            }
        };

        // The original is sent only when the decoder passed it through unchanged
        let image_path: PathBuf = staged
            .as_ref()
            .map(|f| f.path().to_path_buf())
            .unwrap_or_else(|| request.image_path.clone());

        let engine_request = EngineRequest {
            image_path,
            platform: request.platform.clone(),
            model_hint: request.model_hint.clone(),
            language: request.language.clone(),
        };
        let timeout = request.timeout.unwrap_or(self.inference_timeout);
        let outcome =
            self.dispatcher
                .dispatch(&engine_request, &request.requested_engine, timeout);

        if let Some(mut file) = staged {
            if let Err(e) = file.release() {
                tracing::warn!("{}", e);
            }
        }

        let mut result = match outcome {
            Ok(dispatched) => {
                info.engine_used = Some(dispatched.engine_used);
                info.engine_substituted = dispatched.substituted;
                if dispatched.raw_fallback {
                    info.warnings
                        .push("Model reply was not structured JSON; raw text kept".to_string());
                }
                AnalysisResult::success(dispatched.payload, info)
            }
            Err(err @ DispatchError::NoEngineAvailable { .. }) => AnalysisResult::failure(
                AnalysisStatus::DispatchFailed,
                info,
                ErrorDetail::new(ErrorKind::EngineUnavailable, err.to_string()),
            ),
            Err(DispatchError::Inference { engine, source }) => {
                info.engine_substituted = engine != request.requested_engine;
                info.engine_used = Some(engine.clone());
                let kind = match source {
                    InferenceError::MalformedResponse(_) => ErrorKind::UnparseableResponse,
                    _ => ErrorKind::InferenceFailed,
                };
                tracing::warn!("Engine '{}' failed on {}: {}", engine, info.image_name, source);
                AnalysisResult::failure(
                    AnalysisStatus::InferenceFailed,
                    info,
                    ErrorDetail::new(kind, source.to_string()),
                )
            }
        };

        result.image_info.processing_time_seconds = elapsed_seconds(started);
        if result.is_success() {
            tracing::info!("Analysis complete: {}", result.summary());
        }
        result
    }
}

fn validation_error(failure: &ValidationFailure) -> ErrorDetail {
    match failure.stage {
        ValidationStage::Integrity => ErrorDetail::new(
            ErrorKind::IntegrityError,
            failure.report.errors().join("; "),
        ),
        ValidationStage::DecodeExhausted => ErrorDetail::new(
            ErrorKind::DecodeExhausted,
            format!(
                "All {} decode strategies failed: {}",
                failure.attempts.len(),
                failure
                    .attempts
                    .iter()
                    .map(|a| a.to_string())
                    .collect::<Vec<_>>()
                    .join("; ")
            ),
        ),
    }
}

/// Wall-clock seconds since `started`, never zero
fn elapsed_seconds(started: Instant) -> f64 {
    started
        .elapsed()
        .max(Duration::from_nanos(1))
        .as_secs_f64()
}
