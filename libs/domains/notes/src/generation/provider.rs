use async_trait::async_trait;

use crate::error::NoteResult;

/// Produces an answer for a fully rendered prompt.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TextGenerator: Send + Sync {
    fn model_name(&self) -> String;

    async fn generate(&self, prompt: &str) -> NoteResult<String>;
}
