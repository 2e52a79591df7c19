use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, get, post},
};
use axum_helpers::{
    ValidatedJson,
    errors::responses::{BadRequestValidationResponse, InternalServerErrorResponse},
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::NoteResult;
use crate::models::{
    AddNoteRequest, AddNoteResponse, AskRequest, AskResponse, HealthResponse, MessageResponse,
    NoteSummary, NotesResponse,
};
use crate::service::KnowledgeService;

const TAG: &str = "notes";

const HEALTH_OK: &str = "ok";
const HEALTH_DEGRADED: &str = "degraded";

/// OpenAPI documentation for the notes API
#[derive(OpenApi)]
#[openapi(
    paths(add_note, ask, list_notes, delete_note, clear_all, health),
    components(
        schemas(
            AddNoteRequest, AddNoteResponse,
            AskRequest, AskResponse,
            NoteSummary, NotesResponse,
            MessageResponse, HealthResponse
        ),
        responses(BadRequestValidationResponse, InternalServerErrorResponse)
    ),
    tags(
        (name = TAG, description = "Personal knowledge base endpoints")
    )
)]
pub struct ApiDoc;

/// Create the notes router with all HTTP endpoints
pub fn router(service: Arc<KnowledgeService>) -> Router {
    Router::new()
        .route("/add_note", post(add_note))
        .route("/ask", post(ask))
        .route("/notes", get(list_notes))
        .route("/delete_note/{id}", delete(delete_note))
        .route("/clear_all", delete(clear_all))
        .route("/health", get(health))
        .with_state(service)
}

/// Embed and store a note
#[utoipa::path(
    post,
    path = "/add_note",
    tag = TAG,
    request_body = AddNoteRequest,
    responses(
        (status = 200, description = "Note saved", body = AddNoteResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn add_note(
    State(service): State<Arc<KnowledgeService>>,
    ValidatedJson(request): ValidatedJson<AddNoteRequest>,
) -> NoteResult<Json<AddNoteResponse>> {
    Ok(Json(service.add_note(request).await?))
}

/// Answer a question from the most similar notes
#[utoipa::path(
    post,
    path = "/ask",
    tag = TAG,
    request_body = AskRequest,
    responses(
        (status = 200, description = "Answer with the titles of the notes used", body = AskResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn ask(
    State(service): State<Arc<KnowledgeService>>,
    ValidatedJson(request): ValidatedJson<AskRequest>,
) -> NoteResult<Json<AskResponse>> {
    Ok(Json(service.ask(&request.question).await?))
}

/// List every note with a short preview
#[utoipa::path(
    get,
    path = "/notes",
    tag = TAG,
    responses(
        (status = 200, description = "All notes", body = NotesResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_notes(
    State(service): State<Arc<KnowledgeService>>,
) -> NoteResult<Json<NotesResponse>> {
    let notes = service.list_notes().await?;
    Ok(Json(NotesResponse {
        total: notes.len(),
        notes,
    }))
}

/// Delete one note by id
#[utoipa::path(
    delete,
    path = "/delete_note/{id}",
    tag = TAG,
    params(
        ("id" = String, Path, description = "Note id, e.g. note_1")
    ),
    responses(
        (status = 200, description = "Note deleted", body = MessageResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_note(
    State(service): State<Arc<KnowledgeService>>,
    Path(id): Path<String>,
) -> NoteResult<Json<MessageResponse>> {
    service.delete_note(&id).await?;
    Ok(Json(MessageResponse::new(format!("Deleted note: {}", id))))
}

/// Drop and recreate the collection
#[utoipa::path(
    delete,
    path = "/clear_all",
    tag = TAG,
    responses(
        (status = 200, description = "All notes removed", body = MessageResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn clear_all(
    State(service): State<Arc<KnowledgeService>>,
) -> NoteResult<Json<MessageResponse>> {
    service.clear_all().await?;
    Ok(Json(MessageResponse::new("Cleared all notes")))
}

/// Liveness plus the current note count
///
/// Always 200. When the index cannot be counted the status is `degraded`.
#[utoipa::path(
    get,
    path = "/health",
    tag = TAG,
    responses(
        (status = 200, description = "Service is up (`ok` or `degraded`)", body = HealthResponse)
    )
)]
async fn health(State(service): State<Arc<KnowledgeService>>) -> Json<HealthResponse> {
    let response = match service.notes_count().await {
        Ok(notes_count) => HealthResponse {
            status: HEALTH_OK.to_string(),
            notes_count,
        },
        Err(e) => {
            tracing::warn!("Could not count notes: {}", e);
            HealthResponse {
                status: HEALTH_DEGRADED.to_string(),
                notes_count: 0,
            }
        }
    };

    Json(response)
}
