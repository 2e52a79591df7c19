use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::EmbeddingProvider;
use crate::error::{NoteError, NoteResult};
use crate::ollama::{OllamaConfig, OllamaHttp};

/// Embeddings from Ollama's `/api/embeddings` endpoint.
pub struct OllamaEmbedder {
    http: OllamaHttp,
    model: String,
}

impl OllamaEmbedder {
    pub fn new(config: &OllamaConfig) -> NoteResult<Self> {
        Ok(Self {
            http: OllamaHttp::new(config)?,
            model: config.embed_model.clone(),
        })
    }
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    #[serde(default)]
    embedding: Option<Vec<f32>>,
}

#[async_trait]
impl EmbeddingProvider for OllamaEmbedder {
    fn model_name(&self) -> String {
        self.model.clone()
    }

    async fn embed(&self, text: &str) -> NoteResult<Vec<f32>> {
        let request = EmbeddingRequest {
            model: &self.model,
            prompt: text,
        };

        let response: EmbeddingResponse = self
            .http
            .post_json("/api/embeddings", &request)
            .await
            .inspect_err(|e| tracing::error!(model = %self.model, "Embedding request failed: {}", e))?;

        match response.embedding {
            Some(values) if !values.is_empty() => Ok(values),
            _ => {
                tracing::error!(
                    model = %self.model,
                    "Response has no embedding; make sure an embedding model is configured (ollama pull {})",
                    self.model
                );
                Err(NoteError::MalformedResponse(format!(
                    "No embedding returned by model '{}'",
                    self.model
                )))
            }
        }
    }

    async fn ping(&self) -> NoteResult<()> {
        self.http.probe("/api/tags").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    fn embedder(url: String) -> OllamaEmbedder {
        OllamaEmbedder::new(&OllamaConfig::new(url)).unwrap()
    }

    #[tokio::test]
    async fn test_embed_sends_model_and_prompt() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/embeddings")
            .match_body(Matcher::Json(json!({
                "model": "nomic-embed-text",
                "prompt": "the sky is blue"
            })))
            .with_status(200)
            .with_body(r#"{"embedding":[0.1,0.2,0.3]}"#)
            .create_async()
            .await;

        let values = embedder(server.url()).embed("the sky is blue").await.unwrap();
        assert_eq!(values, vec![0.1, 0.2, 0.3]);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_missing_embedding_field_is_malformed() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", "/api/embeddings")
            .with_status(200)
            .with_body(r#"{"response":"I am a chat model"}"#)
            .create_async()
            .await;

        let err = embedder(server.url()).embed("x").await.unwrap_err();
        assert!(matches!(err, NoteError::MalformedResponse(_)));
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn test_empty_embedding_is_malformed() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", "/api/embeddings")
            .with_status(200)
            .with_body(r#"{"embedding":[]}"#)
            .create_async()
            .await;

        let err = embedder(server.url()).embed("x").await.unwrap_err();
        assert!(matches!(err, NoteError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_server_error_is_transport() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", "/api/embeddings")
            .with_status(404)
            .with_body(r#"{"error":"model not found"}"#)
            .create_async()
            .await;

        let err = embedder(server.url()).embed("x").await.unwrap_err();
        assert!(matches!(err, NoteError::Transport(_)));
    }

    #[tokio::test]
    async fn test_ping_hits_tags() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/tags")
            .with_status(200)
            .with_body(r#"{"models":[]}"#)
            .create_async()
            .await;

        embedder(server.url()).ping().await.unwrap();
        mock.assert_async().await;
    }
}
