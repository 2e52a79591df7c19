use axum::response::{IntoResponse, Response};
use axum_helpers::{AppError, ErrorCode};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NoteError {
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Model server unreachable, timed out, or answered with a non-2xx status.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Model server answered, but not with the expected payload.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("{0}")]
    EmbeddingUnavailable(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type NoteResult<T> = Result<T, NoteError>;

impl NoteError {
    /// Only transport failures may succeed on a later attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, NoteError::Transport(_))
    }

    /// Wraps a model-server failure for the add/ask pipelines.
    pub(crate) fn embedding_unavailable(cause: NoteError) -> Self {
        NoteError::EmbeddingUnavailable(format!(
            "Could not generate an embedding; make sure the model server is running ({cause})"
        ))
    }
}

impl From<reqwest::Error> for NoteError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            NoteError::MalformedResponse(err.to_string())
        } else {
            NoteError::Transport(err.to_string())
        }
    }
}

impl From<sqlx::Error> for NoteError {
    fn from(err: sqlx::Error) -> Self {
        NoteError::Store(err.to_string())
    }
}

impl From<qdrant_client::QdrantError> for NoteError {
    fn from(err: qdrant_client::QdrantError) -> Self {
        NoteError::Store(format!("Qdrant error: {}", err))
    }
}

impl From<serde_json::Error> for NoteError {
    fn from(err: serde_json::Error) -> Self {
        NoteError::Internal(format!("JSON error: {}", err))
    }
}

impl From<std::io::Error> for NoteError {
    fn from(err: std::io::Error) -> Self {
        NoteError::Store(format!("I/O error: {}", err))
    }
}

impl From<core_config::ConfigError> for NoteError {
    fn from(err: core_config::ConfigError) -> Self {
        NoteError::Config(err.to_string())
    }
}

/// Convert NoteError to AppError for standardized HTTP error responses
impl From<NoteError> for AppError {
    fn from(err: NoteError) -> Self {
        match err {
            NoteError::Validation(msg) => AppError::BadRequest(msg),
            NoteError::Transport(message) => AppError::Upstream {
                code: ErrorCode::UpstreamTransport,
                message,
            },
            NoteError::MalformedResponse(message) => AppError::Upstream {
                code: ErrorCode::UpstreamMalformed,
                message,
            },
            NoteError::EmbeddingUnavailable(message) => AppError::Upstream {
                code: ErrorCode::EmbeddingUnavailable,
                message,
            },
            NoteError::Store(msg) => AppError::Store(msg),
            NoteError::Config(msg) => {
                AppError::InternalServerError(format!("Config error: {}", msg))
            }
            NoteError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for NoteError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_only_transport_is_retryable() {
        assert!(NoteError::Transport("timeout".into()).is_retryable());
        assert!(!NoteError::MalformedResponse("no field".into()).is_retryable());
        assert!(!NoteError::Store("locked".into()).is_retryable());
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            NoteError::Validation("empty".into()).into_response().status(),
            StatusCode::BAD_REQUEST
        );
        for err in [
            NoteError::Transport("x".into()),
            NoteError::MalformedResponse("x".into()),
            NoteError::EmbeddingUnavailable("x".into()),
            NoteError::Store("x".into()),
            NoteError::Config("x".into()),
            NoteError::Internal("x".into()),
        ] {
            assert_eq!(
                err.into_response().status(),
                StatusCode::INTERNAL_SERVER_ERROR
            );
        }
    }

    #[test]
    fn test_embedding_unavailable_mentions_cause() {
        let err = NoteError::embedding_unavailable(NoteError::Transport("refused".into()));
        let text = err.to_string();
        assert!(text.contains("model server"));
        assert!(text.contains("refused"));
    }
}
