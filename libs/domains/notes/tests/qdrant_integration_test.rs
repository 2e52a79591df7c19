//! Integration tests for the Qdrant note index
//!
//! These tests run a real Qdrant server via testcontainers and need Docker:
//!
//! ```sh
//! cargo test -p domain_notes --test qdrant_integration_test -- --ignored
//! ```

use domain_notes::{NewNote, NoteIndex, NoteMetadata, QdrantConfig, QdrantNoteIndex};
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, ImageExt};
use testcontainers_modules::qdrant::Qdrant;

const GRPC_PORT: u16 = 6334;
const DIMENSION: u64 = 3;

/// Qdrant container kept alive for the duration of a test.
struct TestQdrant {
    #[allow(dead_code)]
    container: ContainerAsync<Qdrant>,
    config: QdrantConfig,
}

impl TestQdrant {
    async fn new() -> Self {
        let container = Qdrant::default()
            .with_tag("v1.15.1")
            .start()
            .await
            .expect("Failed to start Qdrant container");

        let host_port = container
            .get_host_port_ipv4(GRPC_PORT)
            .await
            .expect("Failed to get Qdrant port");

        let config = QdrantConfig::new(format!("http://127.0.0.1:{}", host_port))
            .with_dimension(DIMENSION);

        Self { container, config }
    }

    async fn open(&self, collection: &str) -> QdrantNoteIndex {
        QdrantNoteIndex::open(&self.config, collection, "Personal knowledge base")
            .await
            .expect("Failed to open collection")
    }
}

fn note(title: &str, content: &str, embedding: [f32; 3]) -> NewNote {
    NewNote {
        content: content.to_string(),
        metadata: NoteMetadata {
            title: title.to_string(),
            tags: "test".to_string(),
        },
        embedding: embedding.to_vec(),
    }
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_ids_are_not_reused_after_reopen() {
    let qdrant = TestQdrant::new().await;

    let index = qdrant.open("reopen").await;
    assert_eq!(index.insert(note("a", "first", [1.0, 0.0, 0.0])).await.unwrap(), "note_1");
    assert_eq!(index.insert(note("b", "second", [0.0, 1.0, 0.0])).await.unwrap(), "note_2");
    index.delete("note_1").await.unwrap();
    drop(index);

    let index = qdrant.open("reopen").await;
    assert_eq!(index.count().await.unwrap(), 1);
    assert_eq!(index.insert(note("c", "third", [0.0, 0.0, 1.0])).await.unwrap(), "note_3");
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_query_returns_nearest_first() {
    let qdrant = TestQdrant::new().await;
    let index = qdrant.open("query").await;

    index.insert(note("x", "points along x", [1.0, 0.0, 0.0])).await.unwrap();
    index.insert(note("y", "points along y", [0.0, 1.0, 0.0])).await.unwrap();
    index.insert(note("xy", "between x and y", [1.0, 1.0, 0.0])).await.unwrap();

    let hits = index.query(&[1.0, 0.1, 0.0], 2).await.unwrap();

    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].id, "note_1");
    assert_eq!(hits[0].document, "points along x");
    assert_eq!(hits[0].metadata.title, "x");
    assert_eq!(hits[0].metadata.tags, "test");
    assert_eq!(hits[1].id, "note_3");
    assert!(hits[0].distance <= hits[1].distance);
    assert!(hits[0].distance < 0.01);

    assert!(index.query(&[1.0, 0.0, 0.0], 0).await.unwrap().is_empty());
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_list_delete_and_reset() {
    let qdrant = TestQdrant::new().await;
    let index = qdrant.open("lifecycle").await;

    for (i, title) in ["one", "two", "three"].iter().enumerate() {
        let mut embedding = [0.1; 3];
        embedding[i] = 1.0;
        index.insert(note(title, &format!("body {}", title), embedding)).await.unwrap();
    }

    let listed = index.list_all().await.unwrap();
    let ids: Vec<_> = listed.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(ids, ["note_1", "note_2", "note_3"]);
    assert_eq!(listed[1].title, "two");
    assert_eq!(listed[1].preview, "body two");

    index.delete("note_2").await.unwrap();
    index.delete("note_99").await.unwrap();
    index.delete("not-a-note").await.unwrap();
    let ids: Vec<_> = index
        .list_all()
        .await
        .unwrap()
        .into_iter()
        .map(|n| n.id)
        .collect();
    assert_eq!(ids, ["note_1", "note_3"]);

    index.reset().await.unwrap();
    assert_eq!(index.count().await.unwrap(), 0);
    assert!(index.list_all().await.unwrap().is_empty());
    assert_eq!(index.insert(note("fresh", "after reset", [1.0, 0.0, 0.0])).await.unwrap(), "note_1");
}
