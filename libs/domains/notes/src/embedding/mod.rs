mod ollama;
mod provider;

pub use ollama::OllamaEmbedder;
pub use provider::EmbeddingProvider;

#[cfg(test)]
pub use provider::MockEmbeddingProvider;
