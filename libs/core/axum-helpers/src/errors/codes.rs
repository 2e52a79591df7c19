//! Type-safe error codes for API responses.
//!
//! Each error code carries:
//! - a string identifier for clients (e.g., "VALIDATION_ERROR")
//! - an integer code for logs and monitoring (e.g., 1001)
//! - a default human-readable message
//!
//! # Example
//!
//! ```rust
//! use axum_helpers::errors::ErrorCode;
//!
//! let code = ErrorCode::EmbeddingUnavailable;
//! assert_eq!(code.as_str(), "EMBEDDING_UNAVAILABLE");
//! assert_eq!(code.code(), 2001);
//! ```

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Standardized error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Client errors (1000-1999)
    /// Request validation failed
    ValidationError,

    /// JSON extraction from request body failed
    JsonExtraction,

    /// Requested route or resource was not found
    NotFound,

    /// HTTP method not supported on this route
    MethodNotAllowed,

    /// An unexpected internal server error occurred
    InternalError,

    /// Service is temporarily unavailable
    ServiceUnavailable,

    // Upstream model server errors (2000-2999)
    /// No embedding could be produced for the request text
    EmbeddingUnavailable,

    /// Text generation failed
    GenerationFailed,

    /// Model server could not be reached or answered with an error status
    UpstreamTransport,

    /// Model server answered with an unexpected payload
    UpstreamMalformed,

    // Vector index errors (3000-3999)
    /// Note index operation failed
    StoreError,

    // I/O errors (4000s)
    /// File system I/O error
    IoError,

    // JSON parsing errors (5000s)
    /// JSON serialization/deserialization error
    SerdeJsonError,
}

impl ErrorCode {
    /// Get the SCREAMING_SNAKE_CASE identifier for client consumption.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ValidationError => "VALIDATION_ERROR",
            Self::JsonExtraction => "JSON_EXTRACTION",
            Self::NotFound => "NOT_FOUND",
            Self::MethodNotAllowed => "METHOD_NOT_ALLOWED",
            Self::InternalError => "INTERNAL_ERROR",
            Self::ServiceUnavailable => "SERVICE_UNAVAILABLE",
            Self::EmbeddingUnavailable => "EMBEDDING_UNAVAILABLE",
            Self::GenerationFailed => "GENERATION_FAILED",
            Self::UpstreamTransport => "UPSTREAM_TRANSPORT",
            Self::UpstreamMalformed => "UPSTREAM_MALFORMED",
            Self::StoreError => "STORE_ERROR",
            Self::IoError => "IO_ERROR",
            Self::SerdeJsonError => "SERDE_JSON_ERROR",
        }
    }

    /// Get the integer code for logging and monitoring.
    ///
    /// Ranges:
    /// - 1000-1999: Client and generic server errors
    /// - 2000-2999: Model server errors
    /// - 3000-3999: Note index errors
    /// - 4000-4999: I/O errors
    /// - 5000-5999: Serialization errors
    pub fn code(&self) -> i32 {
        match self {
            Self::ValidationError => 1001,
            Self::JsonExtraction => 1003,
            Self::NotFound => 1004,
            Self::InternalError => 1005,
            Self::MethodNotAllowed => 1006,
            Self::ServiceUnavailable => 1011,

            Self::EmbeddingUnavailable => 2001,
            Self::GenerationFailed => 2002,
            Self::UpstreamTransport => 2003,
            Self::UpstreamMalformed => 2004,

            Self::StoreError => 3001,

            Self::IoError => 4001,

            Self::SerdeJsonError => 5001,
        }
    }

    /// Get the default user-facing error message.
    pub fn default_message(&self) -> &'static str {
        match self {
            Self::ValidationError => "Request validation failed",
            Self::JsonExtraction => "Failed to parse request body",
            Self::NotFound => "Resource not found",
            Self::MethodNotAllowed => "The HTTP method is not allowed for this resource",
            Self::InternalError => "An internal server error occurred",
            Self::ServiceUnavailable => "Service is temporarily unavailable",
            Self::EmbeddingUnavailable => {
                "Could not generate an embedding; make sure the model server is running"
            }
            Self::GenerationFailed => "Text generation failed",
            Self::UpstreamTransport => "Model server could not be reached",
            Self::UpstreamMalformed => "Model server returned an unexpected response",
            Self::StoreError => "Note index operation failed",
            Self::IoError => "I/O error occurred",
            Self::SerdeJsonError => "JSON serialization error",
        }
    }

    /// Whether the failure class is worth retrying from the client side.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ServiceUnavailable | Self::UpstreamTransport | Self::EmbeddingUnavailable
        )
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_string_representation() {
        assert_eq!(ErrorCode::ValidationError.as_str(), "VALIDATION_ERROR");
        assert_eq!(ErrorCode::NotFound.as_str(), "NOT_FOUND");
        assert_eq!(ErrorCode::StoreError.as_str(), "STORE_ERROR");
    }

    #[test]
    fn test_error_code_integer_codes() {
        assert_eq!(ErrorCode::ValidationError.code(), 1001);
        assert_eq!(ErrorCode::EmbeddingUnavailable.code(), 2001);
        assert_eq!(ErrorCode::StoreError.code(), 3001);
    }

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::UpstreamMalformed.to_string(), "UPSTREAM_MALFORMED");
    }

    #[test]
    fn test_error_code_serialization_matches_as_str() {
        for code in [
            ErrorCode::ValidationError,
            ErrorCode::EmbeddingUnavailable,
            ErrorCode::UpstreamTransport,
            ErrorCode::SerdeJsonError,
        ] {
            let json = serde_json::to_string(&code).unwrap();
            assert_eq!(json, format!("\"{}\"", code.as_str()));
        }
    }

    #[test]
    fn test_retryable_classes() {
        assert!(ErrorCode::UpstreamTransport.is_retryable());
        assert!(!ErrorCode::UpstreamMalformed.is_retryable());
        assert!(!ErrorCode::ValidationError.is_retryable());
    }
}
