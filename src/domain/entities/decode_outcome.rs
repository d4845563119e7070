//! Decode outcome entity
//!
//! Exactly one outcome is produced per validation: either a re-encoded
//! image or the full log of strategies that failed.

use bytes::Bytes;
use serde::Serialize;
use std::fmt;

/// Width and height in pixels
pub type Dimensions = (u32, u32);

/// Decode strategies, ordered strictest to most permissive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DecodeMethod {
    Standard,
    Robust,
    Force,
}

impl DecodeMethod {
    pub const ORDER: [DecodeMethod; 3] =
        [DecodeMethod::Standard, DecodeMethod::Robust, DecodeMethod::Force];

    pub const fn name(&self) -> &'static str {
        match self {
            DecodeMethod::Standard => "standard",
            DecodeMethod::Robust => "robust",
            DecodeMethod::Force => "force",
        }
    }
}

impl fmt::Display for DecodeMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// One failed strategy attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttemptFailure {
    /// 1-based position in the chain
    pub attempt: usize,
    pub method: DecodeMethod,
    pub reason: String,
}

impl fmt::Display for AttemptFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Attempt {} ({}) failed: {}",
            self.attempt, self.method, self.reason
        )
    }
}

/// A successfully normalized image
#[derive(Debug, Clone)]
pub struct DecodedImage {
    /// Encoded JPEG, or the original bytes when `untouched`
    pub encoded: Bytes,
    pub original_dimensions: Dimensions,
    pub final_dimensions: Dimensions,
    pub method: DecodeMethod,
    pub attempts_tried: usize,
    /// The two-stage downscale path was taken
    pub pre_scaled: bool,
    /// Source bytes are usable as-is; no repaired copy is needed
    pub untouched: bool,
    /// Failures of the strategies tried before the one that succeeded
    pub failures: Vec<AttemptFailure>,
}

impl DecodedImage {
    pub fn was_resized(&self) -> bool {
        self.original_dimensions != self.final_dimensions
    }
}

#[derive(Debug, Clone)]
pub enum DecodeOutcome {
    Success(DecodedImage),
    Exhausted(Vec<AttemptFailure>),
}

impl DecodeOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, DecodeOutcome::Success(_))
    }

    pub fn attempts_tried(&self) -> usize {
        match self {
            DecodeOutcome::Success(image) => image.attempts_tried,
            DecodeOutcome::Exhausted(failures) => failures.len(),
        }
    }

    pub fn failures(&self) -> &[AttemptFailure] {
        match self {
            DecodeOutcome::Success(image) => &image.failures,
            DecodeOutcome::Exhausted(failures) => failures,
        }
    }

    pub fn into_image(self) -> Option<DecodedImage> {
        match self {
            DecodeOutcome::Success(image) => Some(image),
            DecodeOutcome::Exhausted(_) => None,
        }
    }
}
