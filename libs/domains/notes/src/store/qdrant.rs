use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use core_config::{ConfigError, FromEnv, env_optional, env_or_default, env_parse_or};
use qdrant_client::Qdrant;
use qdrant_client::qdrant::{
    self, CountPointsBuilder, CreateCollectionBuilder, DeletePointsBuilder, Distance, PointId,
    PointStruct, ScrollPointsBuilder, SearchPointsBuilder, UpsertPointsBuilder,
    Value as QdrantValue, VectorParamsBuilder,
};
use tracing::info;

use super::{NoteIndex, note_id, parse_note_id};
use crate::error::{NoteError, NoteResult};
use crate::models::{NewNote, NoteMetadata, NoteSummary, RetrievedNote};

const SCROLL_PAGE: u32 = 256;

/// Qdrant connection configuration
#[derive(Debug, Clone)]
pub struct QdrantConfig {
    pub url: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
    /// Vector size used when the collection has to be created.
    pub dimension: u64,
}

impl QdrantConfig {
    pub fn new(url: String) -> Self {
        Self {
            url,
            ..Self::default()
        }
    }

    pub fn with_api_key(mut self, api_key: String) -> Self {
        self.api_key = Some(api_key);
        self
    }

    pub fn with_dimension(mut self, dimension: u64) -> Self {
        self.dimension = dimension;
        self
    }
}

impl FromEnv for QdrantConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            url: env_or_default("QDRANT_URL", "http://localhost:6334"),
            api_key: env_optional("QDRANT_API_KEY"),
            timeout_secs: env_parse_or("QDRANT_TIMEOUT_SECS", 30)?,
            dimension: env_parse_or("EMBEDDING_DIMENSION", 768)?,
        })
    }
}

impl Default for QdrantConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:6334".to_string(),
            api_key: None,
            timeout_secs: 30,
            dimension: 768,
        }
    }
}

/// Collection hosted by a Qdrant server.
///
/// Point ids are the numeric suffix of the note id. The counter is seeded
/// from the highest stored point when the collection is opened.
pub struct QdrantNoteIndex {
    client: Qdrant,
    collection: String,
    description: String,
    dimension: u64,
    last_seq: AtomicU64,
}

impl QdrantNoteIndex {
    pub async fn open(
        config: &QdrantConfig,
        collection: &str,
        description: &str,
    ) -> NoteResult<Self> {
        let mut builder = Qdrant::from_url(&config.url);
        if let Some(api_key) = &config.api_key {
            builder = builder.api_key(api_key.clone());
        }
        builder = builder.timeout(Duration::from_secs(config.timeout_secs));

        let client = builder
            .build()
            .map_err(|e| NoteError::Config(format!("Failed to build Qdrant client: {}", e)))?;

        let index = Self {
            client,
            collection: collection.to_string(),
            description: description.to_string(),
            dimension: config.dimension,
            last_seq: AtomicU64::new(0),
        };

        if index.client.collection_exists(&index.collection).await? {
            let max_seq = index.max_stored_seq().await?;
            index.last_seq.store(max_seq, Ordering::SeqCst);
            info!(
                collection = %index.collection,
                notes = index.count().await?,
                "Loaded existing collection"
            );
        } else {
            index.create_collection().await?;
            info!(
                collection = %index.collection,
                description = %index.description,
                "Created new collection"
            );
        }

        Ok(index)
    }

    async fn create_collection(&self) -> NoteResult<()> {
        self.client
            .create_collection(
                CreateCollectionBuilder::new(&self.collection)
                    .vectors_config(VectorParamsBuilder::new(self.dimension, Distance::Cosine)),
            )
            .await?;
        Ok(())
    }

    /// Walks every point and returns the largest numeric id, 0 when empty.
    async fn max_stored_seq(&self) -> NoteResult<u64> {
        let mut max_seq = 0;
        for point in self.scroll_all(false).await? {
            if let Some(seq) = point.id.as_ref().and_then(point_seq) {
                max_seq = max_seq.max(seq);
            }
        }
        Ok(max_seq)
    }

    async fn scroll_all(&self, with_payload: bool) -> NoteResult<Vec<qdrant::RetrievedPoint>> {
        let mut points = Vec::new();
        let mut offset: Option<PointId> = None;

        loop {
            let mut builder = ScrollPointsBuilder::new(&self.collection)
                .limit(SCROLL_PAGE)
                .with_payload(with_payload)
                .with_vectors(false);
            if let Some(next) = offset.take() {
                builder = builder.offset(next);
            }

            let page = self.client.scroll(builder).await?;
            points.extend(page.result);

            match page.next_page_offset {
                Some(next) => offset = Some(next),
                None => break,
            }
        }

        Ok(points)
    }
}

fn point_seq(point_id: &PointId) -> Option<u64> {
    match &point_id.point_id_options {
        Some(qdrant::point_id::PointIdOptions::Num(num)) => Some(*num),
        _ => None,
    }
}

fn payload_string(payload: &HashMap<String, QdrantValue>, key: &str) -> String {
    use qdrant::value::Kind;

    match payload.get(key).and_then(|v| v.kind.as_ref()) {
        Some(Kind::StringValue(s)) => s.clone(),
        _ => String::new(),
    }
}

fn note_payload(id: &str, note: &NewNote) -> HashMap<String, QdrantValue> {
    HashMap::from([
        ("id".to_string(), QdrantValue::from(id.to_string())),
        ("title".to_string(), QdrantValue::from(note.metadata.title.clone())),
        ("tags".to_string(), QdrantValue::from(note.metadata.tags.clone())),
        ("document".to_string(), QdrantValue::from(note.content.clone())),
    ])
}

#[async_trait]
impl NoteIndex for QdrantNoteIndex {
    async fn insert(&self, note: NewNote) -> NoteResult<String> {
        let seq = self.last_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let id = note_id(seq);

        let point = PointStruct::new(seq, note.embedding.clone(), note_payload(&id, &note));
        self.client
            .upsert_points(UpsertPointsBuilder::new(&self.collection, vec![point]).wait(true))
            .await?;

        Ok(id)
    }

    async fn query(&self, embedding: &[f32], top_k: usize) -> NoteResult<Vec<RetrievedNote>> {
        if top_k == 0 {
            return Ok(Vec::new());
        }

        let results = self
            .client
            .search_points(
                SearchPointsBuilder::new(&self.collection, embedding.to_vec(), top_k as u64)
                    .with_payload(true),
            )
            .await?;

        Ok(results
            .result
            .into_iter()
            .map(|point| RetrievedNote {
                id: payload_string(&point.payload, "id"),
                document: payload_string(&point.payload, "document"),
                metadata: NoteMetadata {
                    title: payload_string(&point.payload, "title"),
                    tags: payload_string(&point.payload, "tags"),
                },
                // Cosine collections report similarity.
                distance: 1.0 - point.score,
            })
            .collect())
    }

    async fn list_all(&self) -> NoteResult<Vec<NoteSummary>> {
        let mut points = self.scroll_all(true).await?;
        points.sort_by_key(|p| p.id.as_ref().and_then(point_seq).unwrap_or(0));

        Ok(points
            .into_iter()
            .map(|p| {
                NoteSummary::new(
                    payload_string(&p.payload, "id"),
                    payload_string(&p.payload, "title"),
                    &payload_string(&p.payload, "document"),
                )
            })
            .collect())
    }

    async fn delete(&self, id: &str) -> NoteResult<()> {
        let Some(seq) = parse_note_id(id) else {
            return Ok(());
        };

        self.client
            .delete_points(
                DeletePointsBuilder::new(&self.collection)
                    .points(vec![PointId::from(seq)])
                    .wait(true),
            )
            .await?;
        Ok(())
    }

    async fn reset(&self) -> NoteResult<()> {
        if self.client.collection_exists(&self.collection).await? {
            self.client.delete_collection(&self.collection).await?;
        }
        self.create_collection().await?;
        self.last_seq.store(0, Ordering::SeqCst);

        info!(collection = %self.collection, "Collection recreated");
        Ok(())
    }

    async fn count(&self) -> NoteResult<u64> {
        let response = self
            .client
            .count(CountPointsBuilder::new(&self.collection).exact(true))
            .await?;
        Ok(response.result.map(|r| r.count).unwrap_or(0))
    }

    async fn close(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env() {
        temp_env::with_vars(
            [
                ("QDRANT_URL", Some("http://qdrant:6334")),
                ("QDRANT_API_KEY", Some("")),
                ("QDRANT_TIMEOUT_SECS", None),
                ("EMBEDDING_DIMENSION", Some("1024")),
            ],
            || {
                let config = QdrantConfig::from_env().unwrap();
                assert_eq!(config.url, "http://qdrant:6334");
                assert_eq!(config.api_key, None);
                assert_eq!(config.timeout_secs, 30);
                assert_eq!(config.dimension, 1024);
            },
        );
    }

    #[test]
    fn test_payload_carries_note_fields() {
        let note = NewNote {
            content: "body".into(),
            metadata: NoteMetadata {
                title: "T".into(),
                tags: "a,b".into(),
            },
            embedding: vec![1.0],
        };
        let payload = note_payload("note_7", &note);

        assert_eq!(payload_string(&payload, "id"), "note_7");
        assert_eq!(payload_string(&payload, "title"), "T");
        assert_eq!(payload_string(&payload, "tags"), "a,b");
        assert_eq!(payload_string(&payload, "document"), "body");
        assert_eq!(payload_string(&payload, "missing"), "");
    }

    #[test]
    fn test_point_seq_reads_numeric_ids() {
        assert_eq!(point_seq(&PointId::from(12u64)), Some(12));
        assert_eq!(point_seq(&PointId::from("a-uuid".to_string())), None);
    }
}
