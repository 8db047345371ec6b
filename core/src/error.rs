//! Error type shared by every layer of the SDK.
//!
//! # Design
//! A single structured error covers every way a remote call can fail. `NotFound`
//! keeps its own variant because callers routinely branch on "index or key does
//! not exist"; every other non-success status lands in `Http` with the
//! service's message. `Dispatch` is raised only by the background dispatcher
//! when the synchronous call never produced an outcome.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The service answered 404 for the index, key or object addressed.
    #[error("not found: {message}")]
    NotFound { message: String },

    /// The service answered with a non-success status other than 404.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// No host could be reached.
    #[error("transport failure: {0}")]
    Transport(String),

    /// The request arguments could not be encoded.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// A success response carried a body that is not valid JSON.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The background task ended without an outcome (the call panicked).
    #[error("dispatch failed: {0}")]
    Dispatch(String),
}

impl ApiError {
    /// HTTP status associated with the error, when the service answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::NotFound { .. } => Some(404),
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_status_and_message() {
        let err = ApiError::Http {
            status: 403,
            message: "Invalid Application-ID or API key".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 403: Invalid Application-ID or API key");
        assert_eq!(err.status(), Some(403));
    }

    #[test]
    fn transport_errors_have_no_status() {
        assert_eq!(ApiError::Transport("refused".into()).status(), None);
        assert_eq!(
            ApiError::NotFound {
                message: "Index does not exist".into()
            }
            .status(),
            Some(404)
        );
    }
}
