use axum::http::{HeaderValue, Method, header};
use std::time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};

/// Creates a CORS layer restricted to the given origins.
///
/// Allows the methods the notes API serves (GET, POST, DELETE, OPTIONS)
/// and the `Content-Type`/`Accept` headers, cached for one hour.
pub fn create_cors_layer(allowed_origins: Vec<HeaderValue>) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed_origins))
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .max_age(Duration::from_secs(3600))
}

/// Creates a permissive CORS layer.
///
/// Any origin, method and header. Browser pages opened from disk need this
/// to reach a local knowledge base.
pub fn create_permissive_cors_layer() -> CorsLayer {
    CorsLayer::permissive()
}

/// Picks the CORS layer from an optional comma-separated origin list.
///
/// `None` or an empty list yields the permissive layer.
pub fn cors_layer_from_origins(origins: Option<&str>) -> Result<CorsLayer, String> {
    let Some(raw) = origins else {
        return Ok(create_permissive_cors_layer());
    };

    let parsed = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(HeaderValue::from_str)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| format!("Invalid CORS origin: {e}"))?;

    if parsed.is_empty() {
        Ok(create_permissive_cors_layer())
    } else {
        Ok(create_cors_layer(parsed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_origins_is_permissive() {
        assert!(cors_layer_from_origins(None).is_ok());
        assert!(cors_layer_from_origins(Some(" , ")).is_ok());
    }

    #[test]
    fn test_origin_list_parses() {
        assert!(cors_layer_from_origins(Some("http://localhost:3000, http://127.0.0.1:8080")).is_ok());
    }

    #[test]
    fn test_invalid_origin_is_rejected() {
        let err = cors_layer_from_origins(Some("http://bad\norigin")).unwrap_err();
        assert!(err.contains("Invalid CORS origin"));
    }
}
