use std::path::Path;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use tracing::{info, warn};

use super::{NoteIndex, cosine_distance, note_id};
use crate::error::{NoteError, NoteResult};
use crate::models::{NewNote, NoteMetadata, NoteSummary, RetrievedNote};

/// File created inside the knowledge base directory.
pub const DATABASE_FILE: &str = "notes.sqlite3";

const SCHEMA: [&str; 3] = [
    r#"CREATE TABLE IF NOT EXISTS collections (
        name        TEXT PRIMARY KEY,
        description TEXT NOT NULL,
        last_seq    INTEGER NOT NULL DEFAULT 0
    )"#,
    r#"CREATE TABLE IF NOT EXISTS notes (
        collection  TEXT NOT NULL REFERENCES collections(name) ON DELETE CASCADE,
        seq         INTEGER NOT NULL,
        id          TEXT NOT NULL,
        title       TEXT NOT NULL,
        tags        TEXT NOT NULL,
        content     TEXT NOT NULL,
        embedding   BLOB NOT NULL,
        PRIMARY KEY (collection, seq)
    )"#,
    "CREATE UNIQUE INDEX IF NOT EXISTS idx_notes_collection_id ON notes(collection, id)",
];

#[derive(sqlx::FromRow)]
struct NoteRow {
    id: String,
    title: String,
    tags: String,
    content: String,
    embedding: Vec<u8>,
}

#[derive(sqlx::FromRow)]
struct SummaryRow {
    id: String,
    title: String,
    content: String,
}

/// Embedded collection stored in a SQLite file.
///
/// Embeddings are kept as little-endian `f32` blobs and ranked by cosine
/// distance in process.
pub struct SqliteNoteIndex {
    pool: SqlitePool,
    collection: String,
    description: String,
}

impl SqliteNoteIndex {
    /// Open the collection stored under `dir`, creating directory, file and
    /// collection as needed.
    pub async fn open(
        dir: impl AsRef<Path>,
        collection: &str,
        description: &str,
    ) -> NoteResult<Self> {
        let dir = dir.as_ref();
        tokio::fs::create_dir_all(dir).await?;

        let options = SqliteConnectOptions::new()
            .filename(dir.join(DATABASE_FILE))
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await?;

        Self::from_pool(pool, collection, description).await
    }

    /// Use an existing pool. The schema is created if missing.
    pub async fn from_pool(pool: SqlitePool, collection: &str, description: &str) -> NoteResult<Self> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&pool).await?;
        }

        let index = Self {
            pool,
            collection: collection.to_string(),
            description: description.to_string(),
        };

        if index.ensure_collection().await? {
            info!(collection = %index.collection, "Created new collection");
        } else {
            let count = index.count().await?;
            info!(
                collection = %index.collection,
                notes = count,
                "Loaded existing collection"
            );
        }

        Ok(index)
    }

    /// Returns true when the collection row had to be created.
    async fn ensure_collection(&self) -> NoteResult<bool> {
        let result = sqlx::query(
            "INSERT INTO collections (name, description) VALUES (?, ?) ON CONFLICT(name) DO NOTHING",
        )
        .bind(&self.collection)
        .bind(&self.description)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}

fn encode_embedding(values: &[f32]) -> Vec<u8> {
    values.iter().flat_map(|f| f.to_le_bytes()).collect()
}

fn decode_embedding(bytes: &[u8]) -> NoteResult<Vec<f32>> {
    if bytes.len() % 4 != 0 {
        return Err(NoteError::Store(format!(
            "Corrupt embedding blob of {} bytes",
            bytes.len()
        )));
    }
    Ok(bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect())
}

#[async_trait]
impl NoteIndex for SqliteNoteIndex {
    async fn insert(&self, note: NewNote) -> NoteResult<String> {
        let mut tx = self.pool.begin().await?;

        let seq: i64 = sqlx::query_scalar(
            "UPDATE collections SET last_seq = last_seq + 1 WHERE name = ? RETURNING last_seq",
        )
        .bind(&self.collection)
        .fetch_one(&mut *tx)
        .await?;

        let id = note_id(seq as u64);

        sqlx::query(
            "INSERT INTO notes (collection, seq, id, title, tags, content, embedding)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&self.collection)
        .bind(seq)
        .bind(&id)
        .bind(&note.metadata.title)
        .bind(&note.metadata.tags)
        .bind(&note.content)
        .bind(encode_embedding(&note.embedding))
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(id)
    }

    async fn query(&self, embedding: &[f32], top_k: usize) -> NoteResult<Vec<RetrievedNote>> {
        if top_k == 0 {
            return Ok(Vec::new());
        }

        let rows: Vec<NoteRow> = sqlx::query_as(
            "SELECT id, title, tags, content, embedding FROM notes WHERE collection = ? ORDER BY seq",
        )
        .bind(&self.collection)
        .fetch_all(&self.pool)
        .await?;

        let mut scored = Vec::with_capacity(rows.len());
        for row in rows {
            let stored = decode_embedding(&row.embedding)?;
            if stored.len() != embedding.len() {
                warn!(
                    id = %row.id,
                    stored = stored.len(),
                    query = embedding.len(),
                    "Skipping note with mismatched embedding dimension"
                );
                continue;
            }

            scored.push(RetrievedNote {
                distance: cosine_distance(embedding, &stored),
                id: row.id,
                document: row.content,
                metadata: NoteMetadata {
                    title: row.title,
                    tags: row.tags,
                },
            });
        }

        // Stable sort keeps insertion order among equal distances.
        scored.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        scored.truncate(top_k);
        Ok(scored)
    }

    async fn list_all(&self) -> NoteResult<Vec<NoteSummary>> {
        let rows: Vec<SummaryRow> = sqlx::query_as(
            "SELECT id, title, content FROM notes WHERE collection = ? ORDER BY seq",
        )
        .bind(&self.collection)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| NoteSummary::new(row.id, row.title, &row.content))
            .collect())
    }

    async fn delete(&self, id: &str) -> NoteResult<()> {
        sqlx::query("DELETE FROM notes WHERE collection = ? AND id = ?")
            .bind(&self.collection)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn reset(&self) -> NoteResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM notes WHERE collection = ?")
            .bind(&self.collection)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM collections WHERE name = ?")
            .bind(&self.collection)
            .execute(&mut *tx)
            .await?;
        sqlx::query("INSERT INTO collections (name, description) VALUES (?, ?)")
            .bind(&self.collection)
            .bind(&self.description)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        info!(collection = %self.collection, "Collection recreated");
        Ok(())
    }

    async fn count(&self) -> NoteResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM notes WHERE collection = ?")
            .bind(&self.collection)
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}
