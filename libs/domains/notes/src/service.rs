use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::embedding::EmbeddingProvider;
use crate::error::{NoteError, NoteResult};
use crate::generation::{PromptBuilder, TextGenerator};
use crate::models::{
    AddNoteRequest, AddNoteResponse, AskResponse, NewNote, NoteMetadata, NoteSummary,
    RetrievedNote,
};
use crate::store::NoteIndex;

/// Notes retrieved as context for every question.
pub const ASK_TOP_K: usize = 3;

pub const EMPTY_KNOWLEDGE_BASE_ANSWER: &str =
    "The knowledge base has no notes yet. Please add some notes first.";

/// The active collection.
///
/// Reset takes the write guard; every other operation shares the read guard,
/// so a reset never interleaves with an insert, query or listing.
pub struct NoteStore {
    index: RwLock<Box<dyn NoteIndex>>,
}

impl NoteStore {
    pub fn new(index: Box<dyn NoteIndex>) -> Self {
        Self {
            index: RwLock::new(index),
        }
    }

    pub async fn insert(&self, note: NewNote) -> NoteResult<String> {
        self.index.read().await.insert(note).await
    }

    pub async fn query(&self, embedding: &[f32], top_k: usize) -> NoteResult<Vec<RetrievedNote>> {
        self.index.read().await.query(embedding, top_k).await
    }

    pub async fn list_all(&self) -> NoteResult<Vec<NoteSummary>> {
        self.index.read().await.list_all().await
    }

    pub async fn delete(&self, id: &str) -> NoteResult<()> {
        self.index.read().await.delete(id).await
    }

    pub async fn count(&self) -> NoteResult<u64> {
        self.index.read().await.count().await
    }

    pub async fn reset(&self) -> NoteResult<()> {
        self.index.write().await.reset().await
    }

    pub async fn close(&self) {
        self.index.write().await.close().await
    }
}

/// Orchestrates embedding, storage and generation for the HTTP handlers.
pub struct KnowledgeService {
    store: NoteStore,
    embedder: Arc<dyn EmbeddingProvider>,
    generator: Arc<dyn TextGenerator>,
    prompts: PromptBuilder,
}

impl KnowledgeService {
    pub fn new(
        store: NoteStore,
        embedder: Arc<dyn EmbeddingProvider>,
        generator: Arc<dyn TextGenerator>,
    ) -> Self {
        Self {
            store,
            embedder,
            generator,
            prompts: PromptBuilder::default(),
        }
    }

    pub fn with_prompt_builder(mut self, prompts: PromptBuilder) -> Self {
        self.prompts = prompts;
        self
    }

    pub fn store(&self) -> &NoteStore {
        &self.store
    }

    pub fn embedder(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.embedder
    }

    async fn embed(&self, text: &str) -> NoteResult<Vec<f32>> {
        self.embedder
            .embed(text)
            .await
            .map_err(NoteError::embedding_unavailable)
    }

    /// Embed and store a note. Nothing is stored when embedding fails.
    pub async fn add_note(&self, request: AddNoteRequest) -> NoteResult<AddNoteResponse> {
        if request.content.is_empty() {
            return Err(NoteError::Validation("content must not be empty".to_string()));
        }

        let embedding = self.embed(&request.content).await?;

        let id = self
            .store
            .insert(NewNote {
                content: request.content,
                metadata: NoteMetadata {
                    title: request.title.clone(),
                    tags: request.tags,
                },
                embedding,
            })
            .await?;

        info!(id = %id, title = %request.title, "Saved note");

        Ok(AddNoteResponse {
            message: format!("Saved note: {}", request.title),
            id,
        })
    }

    /// Answer `question` from the closest notes.
    ///
    /// Generation failures are reported inside the answer text rather than as
    /// an error, so the sources are still returned.
    pub async fn ask(&self, question: &str) -> NoteResult<AskResponse> {
        if question.is_empty() {
            return Err(NoteError::Validation("question must not be empty".to_string()));
        }

        let embedding = self.embed(question).await?;
        let hits = self.store.query(&embedding, ASK_TOP_K).await?;

        if hits.is_empty() {
            debug!("Question asked against an empty collection");
            return Ok(AskResponse {
                answer: EMPTY_KNOWLEDGE_BASE_ANSWER.to_string(),
                sources: Vec::new(),
            });
        }

        let documents: Vec<&str> = hits.iter().map(|h| h.document.as_str()).collect();
        let prompt = self.prompts.build(&documents, question);
        debug!(context_notes = hits.len(), "Prompt assembled");

        let answer = match self.generator.generate(&prompt).await {
            Ok(text) => text,
            Err(e) => {
                warn!(model = %self.generator.model_name(), "Generation failed: {}", e);
                format!("AI response error: {}", e)
            }
        };

        Ok(AskResponse {
            answer,
            sources: hits.into_iter().map(|h| h.metadata.title).collect(),
        })
    }

    pub async fn list_notes(&self) -> NoteResult<Vec<NoteSummary>> {
        self.store.list_all().await
    }

    pub async fn delete_note(&self, id: &str) -> NoteResult<()> {
        self.store.delete(id).await?;
        info!(id = %id, "Deleted note");
        Ok(())
    }

    pub async fn clear_all(&self) -> NoteResult<()> {
        self.store.reset().await?;
        info!("Cleared all notes");
        Ok(())
    }

    pub async fn notes_count(&self) -> NoteResult<u64> {
        self.store.count().await
    }

    pub async fn shutdown(&self) {
        self.store.close().await
    }
}
