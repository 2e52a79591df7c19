use utoipa::openapi::OpenApi as OpenApiDoc;
use utoipa::{Modify, OpenApi};

/// Folds the notes domain document into the application document.
///
/// The note routes live at the root, so the paths are merged as-is
/// instead of being nested under a prefix.
struct NotesDoc;

impl Modify for NotesDoc {
    fn modify(&self, openapi: &mut OpenApiDoc) {
        openapi.merge(domain_notes::ApiDoc::openapi());
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(crate::api::health::ready_handler),
    components(
        schemas(axum_helpers::ErrorResponse)
    ),
    modifiers(&NotesDoc),
    info(
        title = "Knowledge Base API",
        version = "0.1.0",
        description = "Store personal notes as embeddings and ask questions answered from them"
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_contains_note_and_ready_paths() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&str> = doc.paths.paths.keys().map(String::as_str).collect();

        for path in [
            "/add_note",
            "/ask",
            "/notes",
            "/delete_note/{id}",
            "/clear_all",
            "/health",
            "/ready",
        ] {
            assert!(paths.contains(&path), "missing {path}");
        }
    }
}
