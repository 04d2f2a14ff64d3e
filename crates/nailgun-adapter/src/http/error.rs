/*
[INPUT]:  Error sources (HTTP transport, API status codes, serialization, URLs)
[OUTPUT]: Structured error types with retry and not-found hints
[POS]:    Error handling layer - unified error types for entire crate
[UPDATE]: When adding new error sources or improving error messages
*/

use reqwest::StatusCode;
use thiserror::Error;

/// Main error type for the Nailgun adapter
#[derive(Error, Debug)]
pub enum NailgunError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response
    #[error("API error (code {code}): {message}")]
    Api { code: u16, message: String },

    /// Requested object does not exist
    #[error("Not found: {resource}")]
    NotFound { resource: String },

    /// Server refused the change (e.g. attributes locked after deploy)
    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    /// Server rejected the payload
    #[error("Validation failed: {message}")]
    Validation { message: String },

    /// Serialization/deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// URL parsing failed
    #[error("Invalid URL: {0}")]
    UrlParse(#[from] url::ParseError),

    /// Request did not complete in time
    #[error("Request timed out after {duration}s")]
    Timeout { duration: u64 },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl NailgunError {
    /// Check if the error is transient and the request may be repeated
    pub fn is_retryable(&self) -> bool {
        match self {
            NailgunError::Http(_) | NailgunError::Timeout { .. } => true,
            NailgunError::Api { code, .. } => *code >= 500,
            _ => false,
        }
    }

    /// Check if the error means the object is gone
    pub fn is_not_found(&self) -> bool {
        matches!(self, NailgunError::NotFound { .. })
    }

    /// Map a non-success status code and body to an error
    pub fn from_status(status: StatusCode, resource: &str, body: impl Into<String>) -> Self {
        let message = body.into();
        match status {
            StatusCode::NOT_FOUND => NailgunError::NotFound {
                resource: resource.to_string(),
            },
            StatusCode::FORBIDDEN => NailgunError::Forbidden { message },
            StatusCode::BAD_REQUEST => NailgunError::Validation { message },
            _ => NailgunError::Api {
                code: status.as_u16(),
                message,
            },
        }
    }
}

/// Result type alias for Nailgun operations
pub type Result<T> = std::result::Result<T, NailgunError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_retryable() {
        let timeout_err = NailgunError::Timeout { duration: 30 };
        assert!(timeout_err.is_retryable());

        let server_err = NailgunError::Api {
            code: 502,
            message: "bad gateway".to_string(),
        };
        assert!(server_err.is_retryable());

        let forbidden = NailgunError::Forbidden {
            message: "locked".to_string(),
        };
        assert!(!forbidden.is_retryable());
    }

    #[test]
    fn test_from_status_mapping() {
        let err = NailgunError::from_status(StatusCode::NOT_FOUND, "/api/tasks/7", "");
        assert!(err.is_not_found());

        let err = NailgunError::from_status(StatusCode::FORBIDDEN, "/api/clusters/1/contrail", "locked");
        match err {
            NailgunError::Forbidden { message } => assert_eq!(message, "locked"),
            other => panic!("Expected Forbidden, got {other:?}"),
        }

        let err = NailgunError::from_status(StatusCode::INTERNAL_SERVER_ERROR, "/api/nodes", "boom");
        match err {
            NailgunError::Api { code, message } => {
                assert_eq!(code, 500);
                assert_eq!(message, "boom");
            }
            other => panic!("Expected Api error variant, got {other:?}"),
        }
    }
}
