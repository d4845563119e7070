//! Daemon-hosted model server engine
//!
//! Talks to an Ollama-compatible HTTP API: `/api/tags` to probe which
//! models are installed and `/api/chat` to run a vision request.

use super::payload_from_text;
use crate::core::{DaemonConfig, InferenceError};
use crate::domain::entities::EngineAvailability;
use crate::domain::repositories::{EngineRequest, InferenceEngine, RawPayload};
use crate::domain::services::analysis_prompt;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

pub const DAEMON_ENGINE_ID: &str = "ollama";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
    options: ChatOptions,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: String,
    images: Vec<String>,
}

#[derive(Debug, Serialize)]
struct ChatOptions {
    temperature: f32,
    top_p: f32,
    num_predict: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    message: Option<ReplyMessage>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    #[serde(default)]
    content: String,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelTag>,
}

#[derive(Debug, Deserialize)]
struct ModelTag {
    name: String,
}

pub struct DaemonEngine {
    config: DaemonConfig,
    client: Client,
    probe_client: Client,
}

impl DaemonEngine {
    pub fn new(config: DaemonConfig) -> Result<Self, InferenceError> {
        let client = Client::builder().timeout(config.request_timeout).build()?;
        let probe_client = Client::builder().timeout(config.probe_timeout).build()?;
        Ok(Self {
            config,
            client,
            probe_client,
        })
    }

    pub fn config(&self) -> &DaemonConfig {
        &self.config
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.config.host.trim_end_matches('/'), endpoint)
    }

    /// Names of the models the server reports as installed
    pub fn installed_models(&self) -> Result<Vec<String>, InferenceError> {
        let response = self.probe_client.get(self.url("api/tags")).send()?;
        if !response.status().is_success() {
            return Err(InferenceError::Backend(format!(
                "model listing returned HTTP {}",
                response.status()
            )));
        }
        let tags: TagsResponse = response.json()?;
        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }
}

/// `llava` and `llava:latest` name the same model
fn model_matches(installed: &str, wanted: &str) -> bool {
    let strip = |name: &str| name.strip_suffix(":latest").unwrap_or(name).to_string();
    strip(installed) == strip(wanted)
}

/// A per-request model override must name a model the server has
fn require_model(installed: &[String], wanted: &str) -> Result<(), InferenceError> {
    if installed.iter().any(|m| model_matches(m, wanted)) {
        Ok(())
    } else {
        Err(InferenceError::Unavailable(format!(
            "model '{}' is not installed",
            wanted
        )))
    }
}

impl InferenceEngine for DaemonEngine {
    fn id(&self) -> &str {
        DAEMON_ENGINE_ID
    }

    fn analyze(&self, request: &EngineRequest) -> Result<RawPayload, InferenceError> {
        let model = request
            .model_hint
            .as_deref()
            .unwrap_or(self.config.model.as_str());

        // The configured model is covered by check_availability; an override is not
        if request.model_hint.is_some() {
            require_model(&self.installed_models()?, model)?;
        }

        let image = std::fs::read(&request.image_path).map_err(|e| {
            InferenceError::Backend(format!(
                "cannot read {}: {}",
                request.image_path.display(),
                e
            ))
        })?;

        let body = ChatRequest {
            model,
            messages: vec![ChatMessage {
                role: "user",
                content: analysis_prompt(&request.platform, &request.language),
                images: vec![BASE64.encode(&image)],
            }],
            stream: false,
            options: ChatOptions {
                temperature: self.config.temperature,
                top_p: self.config.top_p,
                num_predict: self.config.num_predict,
            },
        };

        tracing::debug!(
            "Sending {} bytes to {} model {}",
            image.len(),
            self.config.host,
            model
        );

        let response = self.client.post(self.url("api/chat")).json(&body).send()?;
        let status = response.status();
        let reply: ChatResponse = response
            .json()
            .map_err(|e| InferenceError::MalformedResponse(e.to_string()))?;

        if let Some(error) = reply.error {
            return Err(InferenceError::Backend(error));
        }
        if !status.is_success() {
            return Err(InferenceError::Backend(format!("HTTP {}", status)));
        }

        let content = reply
            .message
            .map(|m| m.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| InferenceError::MalformedResponse("empty reply".to_string()))?;

        Ok(payload_from_text(&content))
    }

    fn check_availability(&self) -> EngineAvailability {
        match self.installed_models() {
            Ok(models) if models.iter().any(|m| model_matches(m, &self.config.model)) => {
                EngineAvailability::available(DAEMON_ENGINE_ID)
            }
            Ok(_) => EngineAvailability::unavailable(
                DAEMON_ENGINE_ID,
                format!("model '{}' is not installed", self.config.model),
            ),
            Err(e) => EngineAvailability::unavailable(
                DAEMON_ENGINE_ID,
                format!("server at {} unreachable: {}", self.config.host, e),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_model_matches_latest_alias() {
        assert!(model_matches("llava:latest", "llava"));
        assert!(model_matches("llava", "llava:latest"));
        assert!(model_matches("qwen2.5vl:7b", "qwen2.5vl:7b"));
        assert!(!model_matches("llava:13b", "llava:7b"));
    }

    #[test]
    fn test_require_model_rejects_missing_override() {
        let installed = vec!["llava:latest".to_string(), "qwen2.5vl:7b".to_string()];
        assert!(require_model(&installed, "llava").is_ok());
        assert!(require_model(&installed, "qwen2.5vl:7b").is_ok());

        match require_model(&installed, "gemma3:27b") {
            Err(InferenceError::Unavailable(reason)) => assert!(reason.contains("gemma3:27b")),
            other => panic!("expected Unavailable, got {:?}", other),
        }
        assert!(require_model(&[], "llava").is_err());
    }

    #[test]
    fn test_chat_request_shape() {
        let body = ChatRequest {
            model: "llava:7b",
            messages: vec![ChatMessage {
                role: "user",
                content: "describe".to_string(),
                images: vec!["AAAA".to_string()],
            }],
            stream: false,
            options: ChatOptions {
                temperature: 0.5,
                top_p: 0.9,
                num_predict: 1000,
            },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["stream"], false);
        assert_eq!(json["messages"][0]["images"][0], "AAAA");
        assert_eq!(json["options"]["num_predict"], 1000);
    }

    #[test]
    fn test_unreachable_server_is_unavailable() {
        let config = DaemonConfig {
            probe_timeout: Duration::from_millis(200),
            ..DaemonConfig::default()
        }
        .with_host("http://127.0.0.1:9");
        let engine = DaemonEngine::new(config).unwrap();

        let availability = engine.check_availability();
        assert!(!availability.available);
        assert!(availability.reason.unwrap().contains("unreachable"));
    }

    #[test]
    fn test_model_override_is_checked_before_sending() {
        let config = DaemonConfig {
            probe_timeout: Duration::from_millis(200),
            ..DaemonConfig::default()
        }
        .with_host("http://127.0.0.1:9");
        let engine = DaemonEngine::new(config).unwrap();

        // The image does not exist; the model listing fails first
        let request = EngineRequest {
            image_path: std::path::PathBuf::from("/nonexistent/image.jpg"),
            platform: "general".to_string(),
            model_hint: Some("gemma3:27b".to_string()),
            language: "en".to_string(),
        };
        assert!(matches!(
            engine.analyze(&request),
            Err(InferenceError::Transport(_))
        ));
    }
}
