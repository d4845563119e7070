//! Engine registry
//!
//! Holds every configured backend and answers availability questions.
//! Availability is probed on each call and never cached: model servers
//! start and stop independently of this process.

use crate::core::{AnalyzerConfig, InferenceError};
use crate::domain::entities::EngineAvailability;
use crate::domain::repositories::InferenceEngine;
use crate::infrastructure::engines::{AcceleratedEngine, DaemonEngine, RuntimeProbe};
use std::sync::Arc;

pub struct EngineRegistry {
    engines: Vec<Arc<dyn InferenceEngine>>,
    default_engine: String,
}

impl EngineRegistry {
    /// Creates an empty registry that falls back to `default_engine`
    pub fn new(default_engine: impl Into<String>) -> Self {
        Self {
            engines: Vec::new(),
            default_engine: default_engine.into(),
        }
    }

    /// The daemon engine plus the accelerated engine for `probe`
    ///
    /// `probe` is the one-time startup verdict on the in-process runtime.
    pub fn with_defaults(config: &AnalyzerConfig, probe: RuntimeProbe) -> Result<Self, InferenceError> {
        let daemon = DaemonEngine::new(config.daemon.clone())?;
        Ok(Self::new(config.default_engine.clone())
            .with_engine(Arc::new(daemon))
            .with_engine(Arc::new(AcceleratedEngine::new(probe))))
    }

    /// Adds an engine, replacing any engine with the same id
    pub fn register(&mut self, engine: Arc<dyn InferenceEngine>) {
        let id = engine.id().to_string();
        if let Some(slot) = self.engines.iter_mut().find(|e| e.id() == id) {
            tracing::debug!("Replacing engine '{}'", id);
            *slot = engine;
        } else {
            self.engines.push(engine);
        }
    }

    pub fn with_engine(mut self, engine: Arc<dyn InferenceEngine>) -> Self {
        self.register(engine);
        self
    }

    pub fn default_engine(&self) -> &str {
        &self.default_engine
    }

    pub fn get(&self, id: &str) -> Option<Arc<dyn InferenceEngine>> {
        self.engines.iter().find(|e| e.id() == id).cloned()
    }

    pub fn ids(&self) -> Vec<&str> {
        self.engines.iter().map(|e| e.id()).collect()
    }

    /// Probes one engine now; unknown ids are reported as unavailable
    pub fn probe(&self, id: &str) -> EngineAvailability {
        match self.get(id) {
            Some(engine) => {
                let availability = engine.check_availability();
                tracing::debug!("Probed {}", availability.describe());
                availability
            }
            None => EngineAvailability::unavailable(id, "unknown engine"),
        }
    }

    /// Probes every registered engine
    pub fn list_engines(&self) -> Vec<EngineAvailability> {
        self.engines.iter().map(|e| e.check_availability()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::{EngineRequest, RawPayload};

    struct Fixed(&'static str, bool);

    impl InferenceEngine for Fixed {
        fn id(&self) -> &str {
            self.0
        }

        fn analyze(&self, _: &EngineRequest) -> Result<RawPayload, InferenceError> {
            Ok(RawPayload::new())
        }

        fn check_availability(&self) -> EngineAvailability {
            if self.1 {
                EngineAvailability::available(self.0)
            } else {
                EngineAvailability::unavailable(self.0, "down")
            }
        }
    }

    #[test]
    fn test_register_replaces_same_id() {
        let registry = EngineRegistry::new("a")
            .with_engine(Arc::new(Fixed("a", false)))
            .with_engine(Arc::new(Fixed("b", true)))
            .with_engine(Arc::new(Fixed("a", true)));

        assert_eq!(registry.ids(), vec!["a", "b"]);
        assert!(registry.probe("a").available);
    }

    #[test]
    fn test_unknown_engine_is_unavailable() {
        let registry = EngineRegistry::new("a");
        let availability = registry.probe("nope");
        assert!(!availability.available);
        assert_eq!(availability.reason.as_deref(), Some("unknown engine"));
    }

    #[test]
    fn test_list_engines_probes_all() {
        let registry = EngineRegistry::new("a")
            .with_engine(Arc::new(Fixed("a", true)))
            .with_engine(Arc::new(Fixed("b", false)));
        let listed = registry.list_engines();
        assert_eq!(listed.len(), 2);
        assert!(listed[0].available);
        assert!(!listed[1].available);
    }

    #[test]
    fn test_defaults_register_both_backends() {
        let config = AnalyzerConfig::default();
        let registry =
            EngineRegistry::with_defaults(&config, RuntimeProbe::Missing("not loaded".into()))
                .unwrap();
        assert_eq!(registry.ids(), vec!["ollama", "mlx"]);
        assert_eq!(registry.default_engine(), "ollama");
        assert!(!registry.probe("mlx").available);
    }
}
