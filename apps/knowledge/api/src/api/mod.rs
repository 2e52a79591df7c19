use axum::Router;

use crate::state::AppState;

pub mod health;

/// All application routes, mounted at the root: the note endpoints plus
/// `/ready`. Every sub-router has its state applied, so the result is
/// stateless and goes straight into `create_router`.
pub fn routes(state: &AppState) -> Router {
    domain_notes::handlers::router(state.service.clone()).merge(ready_router(state.clone()))
}

/// Router with the `/ready` endpoint.
pub fn ready_router(state: AppState) -> Router {
    use axum::routing::get;

    Router::new()
        .route("/ready", get(health::ready_handler))
        .with_state(state)
}
