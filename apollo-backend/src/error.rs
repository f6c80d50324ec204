//! Error types for the backend crate.

use std::time::Duration;

use crate::Operation;

/// Errors raised while turning a request body into operation parameters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum UnpackError {
    /// The request body parsed as JSON but is not an object.
    #[error("request body for {operation} must be a JSON object, got {found}")]
    NotAnObject {
        operation: Operation,
        found: &'static str,
    },
}

/// Errors that can occur while calling the data-processing backend.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum BackendError {
    /// The configured backend URL cannot be used.
    #[error("invalid backend url {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Connecting to the backend failed.
    #[error("cannot reach backend at {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// HTTP-level failure while talking to the backend.
    #[error("backend request for {operation} failed: {reason}")]
    Transport { operation: Operation, reason: String },

    /// The backend answered with a non-success status.
    #[error("backend returned HTTP {status} for {operation}: {body}")]
    Status {
        operation: Operation,
        status: u16,
        body: String,
    },

    /// The backend answered with a body that is not JSON.
    #[error("backend returned invalid JSON for {operation}: {source}")]
    InvalidResponse {
        operation: Operation,
        #[source]
        source: serde_json::Error,
    },

    /// The backend reply body exceeded the configured size cap.
    #[error("backend reply for {operation} exceeds {limit} bytes")]
    ResponseTooLarge { operation: Operation, limit: usize },

    /// The backend did not answer within the configured timeout.
    #[error("backend timed out after {:?} for {operation}", .timeout)]
    Timeout { operation: Operation, timeout: Duration },

    /// The backend refused the operation itself.
    ///
    /// For [`TableBackend`](crate::TableBackend) implementations that run
    /// the operation in process and can decline it (unknown table, bad
    /// join keys). [`HttpBackend`](crate::HttpBackend) never builds this;
    /// a remote refusal arrives as [`BackendError::Status`]. The message is
    /// the `error_message` of the failure envelope as is.
    #[error("{0}")]
    Rejected(String),
}
