//! Analysis dispatcher
//!
//! Picks a backend for a request, runs it under a timeout and normalizes
//! whatever it returns. At most one automatic substitution happens per
//! call: the requested engine, then the registry default.

use crate::application::EngineRegistry;
use crate::core::{DispatchError, InferenceError};
use crate::domain::entities::EngineAvailability;
use crate::domain::repositories::{EngineRequest, InferenceEngine, RawPayload};
use crate::domain::services::normalize_payload;
use crossbeam_channel::RecvTimeoutError;
use serde_json::{Map, Value};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Key a backend uses to report failure inside an otherwise valid payload
const ERROR_KEY: &str = "error";

/// A normalized payload and the engine that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct Dispatched {
    pub payload: Map<String, Value>,
    pub engine_used: String,
    /// The requested engine was unavailable and the default ran instead
    pub substituted: bool,
    /// The backend answered in free text that could not be parsed
    pub raw_fallback: bool,
}

pub struct AnalysisDispatcher {
    registry: EngineRegistry,
    accept_raw_fallback: bool,
}

impl AnalysisDispatcher {
    pub fn new(registry: EngineRegistry) -> Self {
        Self {
            registry,
            accept_raw_fallback: true,
        }
    }

    /// Whether unparseable free-text answers count as a result
    pub fn with_raw_fallback(mut self, accept: bool) -> Self {
        self.accept_raw_fallback = accept;
        self
    }

    pub fn registry(&self) -> &EngineRegistry {
        &self.registry
    }

    pub fn list_engines(&self) -> Vec<EngineAvailability> {
        self.registry.list_engines()
    }

    /// Resolves the engine to run, probing availability right now
    ///
    /// Returns the engine and whether it is a substitute for `requested`.
    pub fn select(&self, requested: &str) -> Result<(Arc<dyn InferenceEngine>, bool), DispatchError> {
        let fallback = self.registry.default_engine();

        let first = self.registry.probe(requested);
        if first.available {
            if let Some(engine) = self.registry.get(requested) {
                return Ok((engine, false));
            }
        }

        let mut reasons = vec![first.describe()];
        if requested != fallback {
            tracing::warn!(
                "Engine '{}' unavailable ({}), falling back to '{}'",
                requested,
                first.reason.as_deref().unwrap_or("no reason given"),
                fallback
            );

            let second = self.registry.probe(fallback);
            if second.available {
                if let Some(engine) = self.registry.get(fallback) {
                    return Ok((engine, true));
                }
            }
            reasons.push(second.describe());
        }

        Err(DispatchError::NoEngineAvailable {
            requested: requested.to_string(),
            fallback: fallback.to_string(),
            reasons,
        })
    }

    /// Selects an engine, runs it with `timeout` and normalizes the output
    pub fn dispatch(
        &self,
        request: &EngineRequest,
        requested: &str,
        timeout: Duration,
    ) -> Result<Dispatched, DispatchError> {
        let (engine, substituted) = self.select(requested)?;
        let engine_id = engine.id().to_string();
        let fail = |source: InferenceError| DispatchError::Inference {
            engine: engine_id.clone(),
            source,
        };

        tracing::debug!(
            "Dispatching {} to '{}' (timeout {:?})",
            request.image_path.display(),
            engine_id,
            timeout
        );

        let mut raw = run_with_timeout(engine, request.clone(), timeout).map_err(fail)?;

        if let Some(message) = raw.remove(ERROR_KEY) {
            let message = match message {
                Value::String(s) => s,
                other => other.to_string(),
            };
            return Err(fail(InferenceError::Backend(message)));
        }

        let normalized = normalize_payload(raw);
        if normalized.raw_fallback && !self.accept_raw_fallback {
            return Err(fail(InferenceError::MalformedResponse(
                "model reply contained no JSON object".to_string(),
            )));
        }

        Ok(Dispatched {
            payload: normalized.fields,
            engine_used: engine_id,
            substituted,
            raw_fallback: normalized.raw_fallback,
        })
    }
}

/// Runs `analyze` on a worker thread and waits at most `timeout`
///
/// A worker that outlives the timeout is detached; its result is dropped
/// when it eventually finishes.
fn run_with_timeout(
    engine: Arc<dyn InferenceEngine>,
    request: EngineRequest,
    timeout: Duration,
) -> Result<RawPayload, InferenceError> {
    let (tx, rx) = crossbeam_channel::bounded(1);

    thread::Builder::new()
        .name(format!("infer-{}", engine.id()))
        .spawn(move || {
            let _ = tx.send(engine.analyze(&request));
        })
        .map_err(|e| InferenceError::Backend(format!("failed to spawn inference worker: {}", e)))?;

    match rx.recv_timeout(timeout) {
        Ok(result) => result,
        Err(RecvTimeoutError::Timeout) => Err(InferenceError::Timeout(timeout)),
        Err(RecvTimeoutError::Disconnected) => Err(InferenceError::WorkerLost),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::path::PathBuf;

    struct Scripted {
        id: &'static str,
        up: bool,
        reply: Value,
    }

    impl InferenceEngine for Scripted {
        fn id(&self) -> &str {
            self.id
        }

        fn analyze(&self, _: &EngineRequest) -> Result<RawPayload, InferenceError> {
            Ok(self.reply.as_object().cloned().unwrap_or_default())
        }

        fn check_availability(&self) -> EngineAvailability {
            if self.up {
                EngineAvailability::available(self.id)
            } else {
                EngineAvailability::unavailable(self.id, "stopped")
            }
        }
    }

    fn request() -> EngineRequest {
        EngineRequest {
            image_path: PathBuf::from("a.jpg"),
            platform: "general".into(),
            model_hint: None,
            language: "en".into(),
        }
    }

    fn dispatcher(engines: Vec<Scripted>) -> AnalysisDispatcher {
        let mut registry = EngineRegistry::new("ollama");
        for engine in engines {
            registry.register(Arc::new(engine));
        }
        AnalysisDispatcher::new(registry)
    }

    #[test]
    fn test_requested_engine_used_when_up() {
        let d = dispatcher(vec![Scripted {
            id: "mlx",
            up: true,
            reply: json!({"description": "x"}),
        }]);
        let out = d.dispatch(&request(), "mlx", Duration::from_secs(5)).unwrap();
        assert_eq!(out.engine_used, "mlx");
        assert!(!out.substituted);
        assert_eq!(out.payload["image_type"], "other");
    }

    #[test]
    fn test_default_requested_and_down_reports_once() {
        let d = dispatcher(vec![Scripted {
            id: "ollama",
            up: false,
            reply: json!({}),
        }]);
        match d.select("ollama") {
            Err(DispatchError::NoEngineAvailable { reasons, .. }) => {
                assert_eq!(reasons, vec!["ollama: stopped".to_string()]);
            }
            _ => panic!("expected NoEngineAvailable"),
        }
    }

    #[test]
    fn test_non_string_error_value() {
        let d = dispatcher(vec![Scripted {
            id: "ollama",
            up: true,
            reply: json!({"error": {"code": 500}}),
        }]);
        let err = d.dispatch(&request(), "ollama", Duration::from_secs(5)).unwrap_err();
        assert!(matches!(
            err,
            DispatchError::Inference { source: InferenceError::Backend(ref m), .. } if m.contains("500")
        ));
    }
}
