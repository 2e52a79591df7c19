use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::TextGenerator;
use crate::error::{NoteError, NoteResult};
use crate::ollama::{OllamaConfig, OllamaHttp};

/// Non-streaming completions from Ollama's `/api/generate` endpoint.
pub struct OllamaGenerator {
    http: OllamaHttp,
    model: String,
}

impl OllamaGenerator {
    pub fn new(config: &OllamaConfig) -> NoteResult<Self> {
        Ok(Self {
            http: OllamaHttp::new(config)?,
            model: config.chat_model.clone(),
        })
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: Option<String>,
}

#[async_trait]
impl TextGenerator for OllamaGenerator {
    fn model_name(&self) -> String {
        self.model.clone()
    }

    async fn generate(&self, prompt: &str) -> NoteResult<String> {
        let request = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
        };

        let response: GenerateResponse = self.http.post_json("/api/generate", &request).await?;

        response.response.ok_or_else(|| {
            NoteError::MalformedResponse(format!(
                "No response text returned by model '{}'",
                self.model
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    #[tokio::test]
    async fn test_generate_is_non_streaming() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/generate")
            .match_body(Matcher::Json(json!({
                "model": "qwen:latest",
                "prompt": "hello",
                "stream": false
            })))
            .with_status(200)
            .with_body(r#"{"model":"qwen:latest","response":"hi there","done":true}"#)
            .create_async()
            .await;

        let generator = OllamaGenerator::new(&OllamaConfig::new(server.url())).unwrap();
        assert_eq!(generator.generate("hello").await.unwrap(), "hi there");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_missing_response_field_is_malformed() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", "/api/generate")
            .with_status(200)
            .with_body(r#"{"done":true}"#)
            .create_async()
            .await;

        let generator = OllamaGenerator::new(&OllamaConfig::new(server.url())).unwrap();
        let err = generator.generate("hello").await.unwrap_err();
        assert!(matches!(err, NoteError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_unknown_model_is_transport() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", "/api/generate")
            .with_status(404)
            .with_body(r#"{"error":"model 'qwen:latest' not found"}"#)
            .create_async()
            .await;

        let generator = OllamaGenerator::new(&OllamaConfig::new(server.url())).unwrap();
        let err = generator.generate("hello").await.unwrap_err();
        assert!(matches!(err, NoteError::Transport(ref m) if m.contains("not found")));
    }
}
