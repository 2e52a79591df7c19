//! Readiness check against the model server and the note index.

use crate::state::AppState;
use axum::{
    extract::State,
    response::{IntoResponse, Response},
};
use axum_helpers::server::{HealthCheckFuture, run_health_checks};

/// Readiness probe.
///
/// Pings the embedding service and counts the active collection. Unlike
/// `/health`, a failing dependency turns the response into a 503.
#[utoipa::path(
    get,
    path = "/ready",
    tag = "health",
    responses(
        (status = 200, description = "Model server and note index reachable"),
        (status = 503, description = "A dependency is unavailable")
    )
)]
pub async fn ready_handler(State(state): State<AppState>) -> Response {
    let checks: Vec<(&str, HealthCheckFuture<'_>)> = vec![
        (
            "embedding_service",
            Box::pin(async {
                state
                    .service
                    .embedder()
                    .ping()
                    .await
                    .map_err(|e| format!("Model server ping failed: {}", e))
            }),
        ),
        (
            "note_index",
            Box::pin(async {
                state
                    .service
                    .notes_count()
                    .await
                    .map(|_| ())
                    .map_err(|e| format!("Note index check failed: {}", e))
            }),
        ),
    ];

    match run_health_checks(checks).await {
        Ok((status, json)) => (status, json).into_response(),
        Err((status, json)) => (status, json).into_response(),
    }
}
