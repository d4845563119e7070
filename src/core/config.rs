//! Runtime configuration
//!
//! Plain structs with sensible defaults. Only environment overrides are
//! supported; nothing is read from disk.

use super::error::ConfigError;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_ENGINE: &str = "ollama";

/// Bounds and quality levels used by the decode strategies
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeConfig {
    /// Largest allowed width or height after decoding
    pub max_dimension: u32,
    /// JPEG quality for the standard strategy (1-100)
    pub quality: u8,
    /// JPEG quality for the last-resort strategy
    pub force_quality: u8,
    /// Sources larger than this on either axis are pre-scaled first
    pub prescale_threshold: u32,
    /// Intermediate bound used by the pre-scale step
    pub prescale_bound: u32,
}

impl Default for DecodeConfig {
    fn default() -> Self {
        Self {
            max_dimension: 1536,
            quality: 90,
            force_quality: 85,
            prescale_threshold: 6000,
            prescale_bound: 3000,
        }
    }
}

impl DecodeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_dimension(mut self, max_dimension: u32) -> Self {
        self.max_dimension = max_dimension.max(1);
        self
    }

    pub fn with_quality(mut self, quality: u8) -> Self {
        self.quality = quality.clamp(1, 100);
        self
    }

    pub fn with_force_quality(mut self, quality: u8) -> Self {
        self.force_quality = quality.clamp(1, 100);
        self
    }

    pub fn with_prescale(mut self, threshold: u32, bound: u32) -> Self {
        self.prescale_threshold = threshold;
        self.prescale_bound = bound.max(1);
        self
    }

    /// Quality used by the robust strategy, raised above the standard level
    pub fn robust_quality(&self) -> u8 {
        self.quality.saturating_add(10).min(100)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntegrityConfig {
    /// Files below this size get a "likely truncated" warning
    pub min_reasonable_bytes: u64,
    /// Bytes read from the head of the file for signature checks
    pub header_probe_len: usize,
}

impl Default for IntegrityConfig {
    fn default() -> Self {
        Self {
            min_reasonable_bytes: 100,
            header_probe_len: 20,
        }
    }
}

/// Connection settings for a daemon-hosted model server
#[derive(Debug, Clone, PartialEq)]
pub struct DaemonConfig {
    pub host: String,
    pub model: String,
    pub request_timeout: Duration,
    pub probe_timeout: Duration,
    pub temperature: f32,
    pub top_p: f32,
    pub num_predict: u32,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            host: "http://localhost:11434".to_string(),
            model: "qwen2.5vl:7b".to_string(),
            request_timeout: Duration::from_secs(120),
            probe_timeout: Duration::from_secs(3),
            temperature: 0.7,
            top_p: 0.9,
            num_predict: 1000,
        }
    }
}

impl DaemonConfig {
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

/// Top-level settings for the analysis pipeline
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzerConfig {
    pub decode: DecodeConfig,
    pub integrity: IntegrityConfig,
    pub daemon: DaemonConfig,
    /// Engine substituted when the requested one is unavailable
    pub default_engine: String,
    /// Applied when a request does not carry its own timeout
    pub inference_timeout: Duration,
    /// Treat unparseable model text as a successful raw result
    pub accept_raw_fallback: bool,
    /// Directory for ephemeral files; system temp dir when `None`
    pub temp_dir: Option<PathBuf>,
    pub max_batch_size: usize,
    pub batch_concurrency: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            decode: DecodeConfig::default(),
            integrity: IntegrityConfig::default(),
            daemon: DaemonConfig::default(),
            default_engine: DEFAULT_ENGINE.to_string(),
            inference_timeout: Duration::from_secs(180),
            accept_raw_fallback: true,
            temp_dir: None,
            max_batch_size: 50,
            batch_concurrency: 4,
        }
    }
}

impl AnalyzerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overridden by the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup (used by `from_env`)
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(host) = lookup("OLLAMA_HOST") {
            config.daemon = config.daemon.with_host(host);
        }
        if let Some(model) = lookup("OLLAMA_MODEL") {
            config.daemon = config.daemon.with_model(model);
        }
        if let Some(raw) = lookup("MAX_IMAGE_SIZE") {
            let value: u32 = parse_number("MAX_IMAGE_SIZE", &raw)?;
            if value == 0 {
                return Err(invalid("MAX_IMAGE_SIZE", &raw, "must be positive"));
            }
            config.decode = config.decode.with_max_dimension(value);
        }
        if let Some(raw) = lookup("IMAGE_QUALITY") {
            let value: u8 = parse_number("IMAGE_QUALITY", &raw)?;
            if !(1..=100).contains(&value) {
                return Err(invalid("IMAGE_QUALITY", &raw, "must be within 1-100"));
            }
            config.decode = config.decode.with_quality(value);
        }
        if let Some(raw) = lookup("MAX_BATCH_SIZE") {
            config.max_batch_size = parse_number("MAX_BATCH_SIZE", &raw)?;
        }

        Ok(config)
    }

    pub fn with_decode(mut self, decode: DecodeConfig) -> Self {
        self.decode = decode;
        self
    }

    pub fn with_default_engine(mut self, engine: impl Into<String>) -> Self {
        self.default_engine = engine.into();
        self
    }

    pub fn with_inference_timeout(mut self, timeout: Duration) -> Self {
        self.inference_timeout = timeout;
        self
    }

    pub fn with_raw_fallback(mut self, accept: bool) -> Self {
        self.accept_raw_fallback = accept;
        self
    }

    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }

    pub fn with_batch_limits(mut self, max_batch_size: usize, concurrency: usize) -> Self {
        self.max_batch_size = max_batch_size;
        self.batch_concurrency = concurrency.max(1);
        self
    }
}

fn parse_number<T>(key: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| invalid(key, raw, &e.to_string()))
}

fn invalid(key: &'static str, raw: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key,
        value: raw.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_decode_defaults() {
        let config = DecodeConfig::default();
        assert_eq!(config.max_dimension, 1536);
        assert_eq!(config.quality, 90);
        assert_eq!(config.robust_quality(), 100);
        assert_eq!(config.prescale_threshold, 6000);
        assert_eq!(config.prescale_bound, 3000);
    }

    #[test]
    fn test_robust_quality_is_capped() {
        let config = DecodeConfig::new().with_quality(95);
        assert_eq!(config.robust_quality(), 100);
        let config = DecodeConfig::new().with_quality(70);
        assert_eq!(config.robust_quality(), 80);
    }

    #[test]
    fn test_env_overrides() {
        let config = AnalyzerConfig::from_lookup(lookup_from(&[
            ("OLLAMA_HOST", "http://gpu-box:11434/"),
            ("OLLAMA_MODEL", "llava:13b"),
            ("MAX_IMAGE_SIZE", "1024"),
            ("IMAGE_QUALITY", "80"),
        ]))
        .unwrap();

        assert_eq!(config.daemon.host, "http://gpu-box:11434");
        assert_eq!(config.daemon.model, "llava:13b");
        assert_eq!(config.decode.max_dimension, 1024);
        assert_eq!(config.decode.quality, 80);
        assert_eq!(config.max_batch_size, 50);
    }

    #[test]
    fn test_env_rejects_garbage() {
        let err = AnalyzerConfig::from_lookup(lookup_from(&[("IMAGE_QUALITY", "high")]))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { key: "IMAGE_QUALITY", .. }
        ));

        let err = AnalyzerConfig::from_lookup(lookup_from(&[("IMAGE_QUALITY", "0")]))
            .unwrap_err();
        assert!(err.to_string().contains("1-100"));
    }
}
