mod ollama;
mod prompt;
mod provider;

pub use ollama::OllamaGenerator;
pub use prompt::{CONTEXT_SEPARATOR, DEFAULT_ANSWER_LANGUAGE, PromptBuilder};
pub use provider::TextGenerator;

#[cfg(test)]
pub use provider::MockTextGenerator;
