//! Shared plumbing for talking to an Ollama-compatible model server.

use std::time::Duration;

use core_config::{ConfigError, FromEnv, env_or_default, env_parse_or};
use reqwest::Client;
use serde::{Serialize, de::DeserializeOwned};

use crate::error::{NoteError, NoteResult};

pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
pub const DEFAULT_EMBED_MODEL: &str = "nomic-embed-text";
pub const DEFAULT_CHAT_MODEL: &str = "qwen:latest";

/// Model server configuration
#[derive(Debug, Clone)]
pub struct OllamaConfig {
    pub base_url: String,
    pub embed_model: String,
    pub chat_model: String,
    /// Applied to every outbound request, connect included.
    pub timeout: Duration,
}

impl OllamaConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn with_models(mut self, embed_model: impl Into<String>, chat_model: impl Into<String>) -> Self {
        self.embed_model = embed_model.into();
        self.chat_model = chat_model.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_OLLAMA_URL.to_string(),
            embed_model: DEFAULT_EMBED_MODEL.to_string(),
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
            timeout: Duration::from_secs(120),
        }
    }
}

impl FromEnv for OllamaConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let timeout_secs = env_parse_or("OLLAMA_TIMEOUT_SECS", 120u64)?;

        Ok(Self {
            base_url: env_or_default("OLLAMA_URL", DEFAULT_OLLAMA_URL),
            embed_model: env_or_default("OLLAMA_EMBED_MODEL", DEFAULT_EMBED_MODEL),
            chat_model: env_or_default("OLLAMA_CHAT_MODEL", DEFAULT_CHAT_MODEL),
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

/// HTTP client bound to one model server.
#[derive(Debug, Clone)]
pub(crate) struct OllamaHttp {
    client: Client,
    base_url: String,
}

impl OllamaHttp {
    pub(crate) fn new(config: &OllamaConfig) -> NoteResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| NoteError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// POST a JSON body and decode the JSON answer.
    ///
    /// Connection failures, timeouts and non-2xx statuses are
    /// [`NoteError::Transport`]; a 2xx body that does not decode into `R` is
    /// [`NoteError::MalformedResponse`].
    pub(crate) async fn post_json<B, R>(&self, path: &str, body: &B) -> NoteResult<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let response = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(|e| NoteError::Transport(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| NoteError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(NoteError::Transport(format!(
                "Model server error ({}): {}",
                status, text
            )));
        }

        serde_json::from_str(&text).map_err(|e| {
            NoteError::MalformedResponse(format!("Unexpected response from {}: {}", path, e))
        })
    }

    /// GET `path` and only check the status.
    pub(crate) async fn probe(&self, path: &str) -> NoteResult<()> {
        let response = self.client.get(self.url(path)).send().await?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(NoteError::Transport(format!(
                "Model server error ({})",
                response.status()
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    #[test]
    fn test_config_from_env_defaults() {
        temp_env::with_vars(
            [
                ("OLLAMA_URL", None::<&str>),
                ("OLLAMA_EMBED_MODEL", None),
                ("OLLAMA_CHAT_MODEL", None),
                ("OLLAMA_TIMEOUT_SECS", None),
            ],
            || {
                let config = OllamaConfig::from_env().unwrap();
                assert_eq!(config.base_url, "http://localhost:11434");
                assert_eq!(config.embed_model, "nomic-embed-text");
                assert_eq!(config.chat_model, "qwen:latest");
                assert_eq!(config.timeout, Duration::from_secs(120));
            },
        );
    }

    #[test]
    fn test_config_from_env_overrides() {
        temp_env::with_vars(
            [
                ("OLLAMA_URL", Some("http://gpu-box:11434")),
                ("OLLAMA_CHAT_MODEL", Some("llama3")),
                ("OLLAMA_TIMEOUT_SECS", Some("5")),
            ],
            || {
                let config = OllamaConfig::from_env().unwrap();
                assert_eq!(config.base_url, "http://gpu-box:11434");
                assert_eq!(config.chat_model, "llama3");
                assert_eq!(config.timeout, Duration::from_secs(5));
            },
        );
    }

    #[test]
    fn test_config_rejects_bad_timeout() {
        temp_env::with_var("OLLAMA_TIMEOUT_SECS", Some("forever"), || {
            assert!(OllamaConfig::from_env().is_err());
        });
    }

    #[tokio::test]
    async fn test_post_json_non_success_is_transport() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", "/api/x")
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        let http = OllamaHttp::new(&OllamaConfig::new(server.url())).unwrap();
        let err = http
            .post_json::<_, Value>("/api/x", &json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, NoteError::Transport(ref m) if m.contains("boom")));
    }

    #[tokio::test]
    async fn test_post_json_garbage_is_malformed() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", "/api/x")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let http = OllamaHttp::new(&OllamaConfig::new(server.url())).unwrap();
        let err = http
            .post_json::<_, Value>("/api/x", &json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, NoteError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_transport() {
        let config = OllamaConfig::new("http://127.0.0.1:9").with_timeout(Duration::from_secs(2));
        let http = OllamaHttp::new(&config).unwrap();
        let err = http
            .post_json::<_, Value>("/api/x", &json!({}))
            .await
            .unwrap_err();
        assert!(err.is_retryable());
    }
}
