//! Notes Domain Library
//!
//! Stores text notes as embeddings and answers questions by retrieving the
//! closest notes and handing them to a language model as context.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐
//! │ KnowledgeService │  ← add / ask / list / delete / clear pipelines
//! └────────┬─────────┘
//!          │
//! ┌────────▼────────┐   ┌───────────────────┐   ┌───────────────┐
//! │    NoteStore    │   │ EmbeddingProvider │   │ TextGenerator │
//! │ (RwLock handle) │   │     (trait)       │   │    (trait)    │
//! └────────┬────────┘   └─────────┬─────────┘   └───────┬───────┘
//!          │                      │                     │
//! ┌────────▼────────┐   ┌─────────▼─────────┐   ┌───────▼─────────┐
//! │   NoteIndex     │   │  OllamaEmbedder   │   │ OllamaGenerator │
//! │ Sqlite / Qdrant │   └───────────────────┘   └─────────────────┘
//! └─────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_notes::{
//!     KnowledgeService, NoteStore, OllamaConfig, OllamaEmbedder, OllamaGenerator,
//!     SqliteNoteIndex, handlers,
//! };
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let index = SqliteNoteIndex::open("./my_knowledge_base", "my_notes", "Personal knowledge base").await?;
//! let ollama = OllamaConfig::default();
//!
//! let service = KnowledgeService::new(
//!     NoteStore::new(Box::new(index)),
//!     Arc::new(OllamaEmbedder::new(&ollama)?),
//!     Arc::new(OllamaGenerator::new(&ollama)?),
//! );
//!
//! let router = handlers::router(Arc::new(service));
//! # Ok(())
//! # }
//! ```

pub mod embedding;
pub mod error;
pub mod generation;
pub mod handlers;
pub mod models;
pub mod ollama;
pub mod service;
pub mod store;

pub use embedding::{EmbeddingProvider, OllamaEmbedder};
pub use error::{NoteError, NoteResult};
pub use generation::{OllamaGenerator, PromptBuilder, TextGenerator};
pub use handlers::ApiDoc;
pub use models::{
    AddNoteRequest, AddNoteResponse, AskRequest, AskResponse, HealthResponse, MessageResponse,
    NewNote, NoteMetadata, NoteSummary, NotesResponse, RetrievedNote,
};
pub use ollama::OllamaConfig;
pub use service::{KnowledgeService, NoteStore};
pub use store::{
    NoteIndex, QdrantConfig, QdrantNoteIndex, SqliteNoteIndex, StoreConfig, VectorBackend,
    open_index,
};
