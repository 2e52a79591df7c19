use async_trait::async_trait;

use crate::error::NoteResult;

/// Turns text into a fixed-length vector.
///
/// Implementations report transport and payload problems as
/// [`NoteError::Transport`](crate::NoteError::Transport) and
/// [`NoteError::MalformedResponse`](crate::NoteError::MalformedResponse).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Model identifier, for logs.
    fn model_name(&self) -> String;

    /// Generate the embedding for a single text.
    async fn embed(&self, text: &str) -> NoteResult<Vec<f32>>;

    /// Cheap reachability check used by the readiness endpoint.
    async fn ping(&self) -> NoteResult<()>;
}
