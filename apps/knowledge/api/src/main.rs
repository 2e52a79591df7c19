use axum_helpers::server::{create_production_app, create_router};
use core_config::tracing::{init_tracing, install_color_eyre};
use domain_notes::{
    KnowledgeService, NoteStore, OllamaEmbedder, OllamaGenerator, PromptBuilder, open_index,
};
use eyre::WrapErr;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

mod api;
mod config;
mod openapi;
mod state;

use config::Config;
use state::AppState;

/// Grace period for closing the note index after a shutdown signal.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Install color-eyre first for colored error output (before any fallible operations)
    install_color_eyre();

    let config = Config::from_env()?;
    init_tracing(&config.environment);

    info!(
        "Starting {} v{} ({:?} backend, collection '{}')",
        config.app.name, config.app.version, config.store.backend, config.store.collection_name
    );

    let index = open_index(&config.store)
        .await
        .wrap_err("Failed to open the note index")?;

    let embedder = OllamaEmbedder::new(&config.ollama)?;
    let generator = OllamaGenerator::new(&config.ollama)?;
    info!(
        "Using model server {} (embed: {}, chat: {})",
        config.ollama.base_url, config.ollama.embed_model, config.ollama.chat_model
    );

    let service = KnowledgeService::new(
        NoteStore::new(index),
        Arc::new(embedder),
        Arc::new(generator),
    )
    .with_prompt_builder(PromptBuilder::new(config.answer_language.clone()));

    let state = AppState {
        config,
        service: Arc::new(service),
    };

    // create_router adds docs and middleware to the composed routes, /ready included
    let api_routes = api::routes(&state);
    let router = create_router::<openapi::ApiDoc>(api_routes, &state.config.server)?;

    log_endpoints(&state.config);

    let service = state.service.clone();
    create_production_app(router, &state.config.server, SHUTDOWN_TIMEOUT, async move {
        info!("Shutting down: closing note index");
        service.shutdown().await;
        info!("Note index closed");
    })
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Knowledge API shutdown complete");
    Ok(())
}

fn log_endpoints(config: &Config) {
    let base = format!("http://{}", config.server.address());

    info!("Knowledge base API listening on {}", base);
    info!("  POST   {}/add_note          add a note", base);
    info!("  POST   {}/ask               ask a question", base);
    info!("  GET    {}/notes             list notes", base);
    info!("  DELETE {}/delete_note/{{id}}  delete a note", base);
    info!("  DELETE {}/clear_all         remove every note", base);
    info!("  GET    {}/health            liveness and note count", base);
    info!("  GET    {}/ready             dependency readiness", base);
    info!("  GET    {}/swagger-ui        API docs", base);
}
