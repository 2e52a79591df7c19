use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

/// Title used when a note is added without one.
pub const DEFAULT_TITLE: &str = "untitled";

/// Number of characters kept in a list preview.
pub const PREVIEW_CHARS: usize = 100;

/// Metadata stored alongside every note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct NoteMetadata {
    pub title: String,
    pub tags: String,
}

/// A note ready to be written to the index. The id is assigned on insert.
#[derive(Debug, Clone, PartialEq)]
pub struct NewNote {
    pub content: String,
    pub metadata: NoteMetadata,
    pub embedding: Vec<f32>,
}

/// A stored note returned by a similarity query.
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievedNote {
    pub id: String,
    pub document: String,
    pub metadata: NoteMetadata,
    /// Cosine distance to the query; smaller is closer.
    pub distance: f32,
}

/// Short listing entry for `GET /notes`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct NoteSummary {
    pub id: String,
    pub title: String,
    pub preview: String,
}

impl NoteSummary {
    pub fn new(id: String, title: String, content: &str) -> Self {
        Self {
            id,
            title,
            preview: preview(content),
        }
    }
}

/// First [`PREVIEW_CHARS`] characters followed by `...`, or the full text
/// when it is not longer than that.
pub fn preview(content: &str) -> String {
    match content.char_indices().nth(PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}...", &content[..cut]),
        None => content.to_string(),
    }
}

fn default_title() -> String {
    DEFAULT_TITLE.to_string()
}

/// `null` reads the same as an absent field.
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn null_as_default_title<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(default_title))
}

fn not_empty(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::new("empty"));
    }
    Ok(())
}

/// Body of `POST /add_note`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct AddNoteRequest {
    #[serde(default = "default_title", deserialize_with = "null_as_default_title")]
    #[schema(default = "untitled")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    #[validate(custom(function = "not_empty", message = "content must not be empty"))]
    pub content: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub tags: String,
}

impl AddNoteRequest {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            tags: String::new(),
        }
    }

    pub fn with_tags(mut self, tags: impl Into<String>) -> Self {
        self.tags = tags.into();
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AddNoteResponse {
    pub message: String,
    pub id: String,
}

/// Body of `POST /ask`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct AskRequest {
    #[serde(default, deserialize_with = "null_as_empty")]
    #[validate(custom(function = "not_empty", message = "question must not be empty"))]
    pub question: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AskResponse {
    pub answer: String,
    /// Titles of the notes used as context, most similar first.
    pub sources: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NotesResponse {
    pub notes: Vec<NoteSummary>,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub notes_count: u64,
}
