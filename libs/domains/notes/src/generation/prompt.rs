//! Prompt assembly for the ask pipeline.

/// Separator placed between retrieved notes in the prompt context.
pub const CONTEXT_SEPARATOR: &str = "\n\n---\n\n";

pub const DEFAULT_ANSWER_LANGUAGE: &str = "Traditional Chinese";

/// Fills the fixed question-answering template.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    answer_language: String,
}

impl PromptBuilder {
    pub fn new(answer_language: impl Into<String>) -> Self {
        Self {
            answer_language: answer_language.into(),
        }
    }

    pub fn answer_language(&self) -> &str {
        &self.answer_language
    }

    /// Joins `documents` with [`CONTEXT_SEPARATOR`] and renders the prompt.
    pub fn build<S: AsRef<str>>(&self, documents: &[S], question: &str) -> String {
        let context = documents
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join(CONTEXT_SEPARATOR);

        format!(
            "Answer the question based on my notes below. If the notes do not contain\n\
             relevant information, say honestly \"There is nothing relevant in my notes.\"\n\
             \n\
             My notes:\n\
             {context}\n\
             \n\
             Question: {question}\n\
             \n\
             Please answer in {language}:",
            language = self.answer_language
        )
    }
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_ANSWER_LANGUAGE)
    }
}
