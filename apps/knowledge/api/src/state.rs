//! Shared application state.

use domain_notes::KnowledgeService;
use std::sync::Arc;

/// Cloned into every handler; only the `Arc` is copied.
#[derive(Clone)]
pub struct AppState {
    pub config: crate::config::Config,
    pub service: Arc<KnowledgeService>,
}
