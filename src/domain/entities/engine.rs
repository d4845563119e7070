//! Engine availability entity

use serde::Serialize;

/// Live availability of one inference backend
///
/// Produced by a fresh probe on every dispatch; never cached, since
/// backends start and stop independently of this process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EngineAvailability {
    pub engine_id: String,
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl EngineAvailability {
    pub fn available(engine_id: impl Into<String>) -> Self {
        Self {
            engine_id: engine_id.into(),
            available: true,
            reason: None,
        }
    }

    pub fn unavailable(engine_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            engine_id: engine_id.into(),
            available: false,
            reason: Some(reason.into()),
        }
    }

    /// Reason text for logs and error messages
    pub fn describe(&self) -> String {
        match (&self.reason, self.available) {
            (_, true) => format!("{}: available", self.engine_id),
            (Some(reason), false) => format!("{}: {}", self.engine_id, reason),
            (None, false) => format!("{}: unavailable", self.engine_id),
        }
    }
}
