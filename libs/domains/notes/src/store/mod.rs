//! Vector index backends for notes.

mod qdrant;
mod sqlite;

pub use qdrant::{QdrantConfig, QdrantNoteIndex};
pub use sqlite::SqliteNoteIndex;

use std::path::PathBuf;
use std::str::FromStr;

use async_trait::async_trait;
use core_config::{ConfigError, FromEnv, env_or_default, env_parse_or};

use crate::error::NoteResult;
use crate::models::{NewNote, NoteSummary, RetrievedNote};

pub const DEFAULT_KNOWLEDGE_BASE_PATH: &str = "./my_knowledge_base";
pub const DEFAULT_COLLECTION_NAME: &str = "my_notes";
pub const DEFAULT_COLLECTION_DESCRIPTION: &str = "Personal knowledge base";

/// Formats the public id of the `seq`-th note of a collection.
pub(crate) fn note_id(seq: u64) -> String {
    format!("note_{}", seq)
}

/// Inverse of [`note_id`]; `None` for ids this service never issued.
pub(crate) fn parse_note_id(id: &str) -> Option<u64> {
    id.strip_prefix("note_")?.parse().ok()
}

/// One named collection of embedded notes.
///
/// Ids come from a counter owned by the collection: the first note is
/// `note_1` and deleting notes never makes an id reusable. `reset`
/// recreates the collection and restarts the counter.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NoteIndex: Send + Sync {
    /// Persist a note and return its assigned id.
    async fn insert(&self, note: NewNote) -> NoteResult<String>;

    /// Up to `top_k` notes closest to `embedding`, closest first.
    async fn query(&self, embedding: &[f32], top_k: usize) -> NoteResult<Vec<RetrievedNote>>;

    async fn list_all(&self) -> NoteResult<Vec<NoteSummary>>;

    /// Remove one note. Unknown ids succeed without effect.
    async fn delete(&self, id: &str) -> NoteResult<()>;

    /// Drop every note and recreate the collection with the same name and description.
    async fn reset(&self) -> NoteResult<()>;

    async fn count(&self) -> NoteResult<u64>;

    /// Release connections. Called once during shutdown.
    async fn close(&self);
}

/// Which index implementation backs the note store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VectorBackend {
    #[default]
    Sqlite,
    Qdrant,
}

impl FromStr for VectorBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Ok(VectorBackend::Sqlite),
            "qdrant" => Ok(VectorBackend::Qdrant),
            other => Err(format!(
                "unknown vector backend '{}', expected 'sqlite' or 'qdrant'",
                other
            )),
        }
    }
}

/// Collection and backend selection.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub backend: VectorBackend,
    /// Directory holding the embedded collection.
    pub path: PathBuf,
    pub collection_name: String,
    pub collection_description: String,
    pub qdrant: QdrantConfig,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: VectorBackend::Sqlite,
            path: PathBuf::from(DEFAULT_KNOWLEDGE_BASE_PATH),
            collection_name: DEFAULT_COLLECTION_NAME.to_string(),
            collection_description: DEFAULT_COLLECTION_DESCRIPTION.to_string(),
            qdrant: QdrantConfig::default(),
        }
    }
}

impl FromEnv for StoreConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            backend: env_parse_or("VECTOR_BACKEND", VectorBackend::Sqlite)?,
            path: PathBuf::from(env_or_default(
                "KNOWLEDGE_BASE_PATH",
                DEFAULT_KNOWLEDGE_BASE_PATH,
            )),
            collection_name: env_or_default("COLLECTION_NAME", DEFAULT_COLLECTION_NAME),
            collection_description: env_or_default(
                "COLLECTION_DESCRIPTION",
                DEFAULT_COLLECTION_DESCRIPTION,
            ),
            qdrant: QdrantConfig::from_env()?,
        })
    }
}

/// Open (or create) the configured collection.
pub async fn open_index(config: &StoreConfig) -> NoteResult<Box<dyn NoteIndex>> {
    match config.backend {
        VectorBackend::Sqlite => {
            let index = SqliteNoteIndex::open(
                &config.path,
                &config.collection_name,
                &config.collection_description,
            )
            .await?;
            Ok(Box::new(index))
        }
        VectorBackend::Qdrant => {
            let index = QdrantNoteIndex::open(
                &config.qdrant,
                &config.collection_name,
                &config.collection_description,
            )
            .await?;
            Ok(Box::new(index))
        }
    }
}

/// Cosine distance (`1 - cosine similarity`). Zero vectors are maximally far.
pub(crate) fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    let (mut dot, mut norm_a, mut norm_b) = (0.0f32, 0.0f32, 0.0f32);
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 1.0;
    }
    1.0 - dot / (norm_a.sqrt() * norm_b.sqrt())
}
