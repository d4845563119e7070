//! Image validator service
//!
//! Combines the integrity pre-check with the decode strategy chain into a
//! single verdict.

use crate::core::{DecodeConfig, IntegrityConfig};
use crate::domain::entities::{AttemptFailure, DecodeOutcome, DecodedImage, IntegrityReport};
use crate::domain::services::{DecodeStrategyChain, IntegrityChecker};
use std::path::Path;

/// Which stage rejected the file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationStage {
    /// Missing, empty or unreadable file; nothing was decoded
    Integrity,
    /// Every decode strategy failed
    DecodeExhausted,
}

/// A file that decoded successfully, plus the non-fatal findings
#[derive(Debug, Clone)]
pub struct Validated {
    pub image: DecodedImage,
    pub report: IntegrityReport,
}

#[derive(Debug, Clone)]
pub struct ValidationFailure {
    pub stage: ValidationStage,
    /// Always has `has_error() == true`
    pub report: IntegrityReport,
    /// Strategy log; empty when the integrity stage rejected the file
    pub attempts: Vec<AttemptFailure>,
}

#[derive(Debug, Clone, Default)]
pub struct ImageValidator {
    checker: IntegrityChecker,
    chain: DecodeStrategyChain,
}

impl ImageValidator {
    pub fn new(integrity: IntegrityConfig, decode: DecodeConfig) -> Self {
        Self {
            checker: IntegrityChecker::new(integrity),
            chain: DecodeStrategyChain::new(decode),
        }
    }

    pub fn checker(&self) -> &IntegrityChecker {
        &self.checker
    }

    pub fn chain(&self) -> &DecodeStrategyChain {
        &self.chain
    }

    /// Checks then decodes a file
    ///
    /// A fatal integrity report short-circuits before any strategy runs.
    /// If every strategy fails, the report is marked fatal and each
    /// attempt is appended to its errors.
    pub fn validate_and_fix(&self, path: &Path) -> Result<Validated, ValidationFailure> {
        let mut report = self.checker.check(path);
        if report.has_error() {
            tracing::debug!(
                "Integrity check rejected {}: {}",
                path.display(),
                report.errors().join("; ")
            );
            return Err(ValidationFailure {
                stage: ValidationStage::Integrity,
                report,
                attempts: Vec::new(),
            });
        }

        match self.chain.run(path) {
            DecodeOutcome::Success(image) => Ok(Validated { image, report }),
            DecodeOutcome::Exhausted(attempts) => {
                for failure in &attempts {
                    report.push_error(failure.to_string());
                }
                tracing::warn!(
                    "All {} decode strategies failed for {}",
                    attempts.len(),
                    path.display()
                );
                Err(ValidationFailure {
                    stage: ValidationStage::DecodeExhausted,
                    report,
                    attempts,
                })
            }
        }
    }
}
