//! Error types for the gateway crate.
//!
//! Every failure on a data endpoint, whatever its origin, becomes the same
//! HTTP 500 error envelope. That includes panics, which
//! [`panic_response`] turns into the same shape.

use std::any::Any;

use apollo_backend::{BackendError, UnpackError};
use apollo_core::{EncodingError, ErrorEnvelope, Params};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

/// Errors that can occur during gateway request handling.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum GatewayError {
    /// The request body could not be read or is not valid JSON.
    #[error("malformed request body: {0}")]
    MalformedBody(String),

    /// The request JSON could not be unpacked into parameters.
    #[error(transparent)]
    Unpack(#[from] UnpackError),

    /// An error propagated from the data-processing backend.
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// The backend result could not be encoded as JSON.
    #[error("cannot encode result: {0}")]
    Encoding(#[from] EncodingError),
}

impl GatewayError {
    /// Short label naming where the failure came from, for logs.
    #[must_use]
    pub fn origin(&self) -> &'static str {
        match self {
            Self::MalformedBody(_) => "request",
            Self::Unpack(_) => "unpack",
            Self::Backend(_) => "backend",
            Self::Encoding(_) => "encoding",
        }
    }
}

/// A failed data operation together with the parameters unpacked so far.
#[derive(Debug)]
pub struct OperationFailure {
    params: Params,
    error: GatewayError,
}

impl OperationFailure {
    pub fn new(params: Params, error: impl Into<GatewayError>) -> Self {
        Self { params, error: error.into() }
    }

    #[must_use]
    pub fn error(&self) -> &GatewayError {
        &self.error
    }
}

impl From<GatewayError> for OperationFailure {
    fn from(error: GatewayError) -> Self {
        Self::new(Params::new(), error)
    }
}

impl IntoResponse for OperationFailure {
    fn into_response(self) -> Response {
        tracing::warn!(origin = self.error.origin(), error = %self.error, "operation failed");
        let status = StatusCode::INTERNAL_SERVER_ERROR;
        let envelope = ErrorEnvelope::new(status.as_u16(), self.params, self.error.to_string());
        (status, Json(envelope.to_json())).into_response()
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        OperationFailure::from(self).into_response()
    }
}

/// Build the 500 envelope for a handler that panicked.
///
/// Used with `CatchPanicLayer::custom`; the panic payload becomes the
/// `error_message` when it is a string.
#[allow(clippy::needless_pass_by_value)]
pub fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else {
        "request handler panicked".to_owned()
    };
    tracing::error!(origin = "panic", error = %message, "operation failed");
    let status = StatusCode::INTERNAL_SERVER_ERROR;
    let envelope = ErrorEnvelope::new(status.as_u16(), Params::new(), message);
    (status, Json(envelope.to_json())).into_response()
}
