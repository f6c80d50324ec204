//! HTTP client for an external data-processing service.
//!
//! Each operation is a `POST {base}/{operation}` carrying the unpacked
//! parameters as a JSON object. The response body, when the status is 2xx,
//! is the operation result. One HTTP/1.1 connection is opened per call, and
//! reply bodies larger than the configured limit are refused.

use std::time::Duration;

use apollo_core::{Datum, Params};
use async_trait::async_trait;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::Bytes;
use hyper::{Method, Request, Uri};
use hyper_util::rt::TokioIo;
use tokio::net::TcpStream;

use crate::{BackendError, Operation, TableBackend};

/// Default per-call timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default cap on a backend reply body (16 MiB).
pub const DEFAULT_MAX_RESPONSE_BYTES: usize = 16 * 1024 * 1024;

/// [`TableBackend`] that forwards every operation over HTTP.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    /// `host:port` to connect to.
    authority: String,
    /// Path prefix without a trailing slash; empty for the root.
    base_path: String,
    timeout: Duration,
    max_response_bytes: usize,
}

impl HttpBackend {
    /// Create a backend for `base_url` (e.g. `http://127.0.0.1:8090/api`).
    ///
    /// # Errors
    /// Returns [`BackendError::InvalidUrl`] if the URL does not parse, has no
    /// host, or uses a scheme other than `http`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, BackendError> {
        let invalid = |reason: &str| BackendError::InvalidUrl {
            url: base_url.to_owned(),
            reason: reason.to_owned(),
        };
        let uri: Uri = base_url.parse().map_err(|e| invalid(&format!("{e}")))?;
        match uri.scheme_str() {
            Some("http") => {}
            Some(other) => return Err(invalid(&format!("unsupported scheme '{other}'"))),
            None => return Err(invalid("missing scheme")),
        }
        let host = uri.host().ok_or_else(|| invalid("missing host"))?;
        let port = uri.port_u16().unwrap_or(80);
        Ok(Self {
            authority: format!("{host}:{port}"),
            base_path: uri.path().trim_end_matches('/').to_owned(),
            timeout,
            max_response_bytes: DEFAULT_MAX_RESPONSE_BYTES,
        })
    }

    /// Replace the reply body cap.
    #[must_use]
    pub fn with_max_response_bytes(mut self, limit: usize) -> Self {
        self.max_response_bytes = limit;
        self
    }

    /// The `host:port` this backend connects to.
    #[must_use]
    pub fn authority(&self) -> &str {
        &self.authority
    }

    /// Request path for `operation`.
    #[must_use]
    pub fn operation_path(&self, operation: Operation) -> String {
        format!("{}/{}", self.base_path, operation.path())
    }

    async fn call(&self, operation: Operation, params: &Params) -> Result<Datum, BackendError> {
        tracing::debug!(%operation, backend = %self.authority, "forwarding operation");
        match tokio::time::timeout(self.timeout, self.post(operation, params)).await {
            Ok(result) => result,
            Err(_) => Err(BackendError::Timeout { operation, timeout: self.timeout }),
        }
    }

    async fn connect(&self) -> Result<TcpStream, BackendError> {
        TcpStream::connect(&self.authority)
            .await
            .map_err(|source| BackendError::Connect { addr: self.authority.clone(), source })
    }

    async fn post(&self, operation: Operation, params: &Params) -> Result<Datum, BackendError> {
        let transport = |reason: String| BackendError::Transport { operation, reason };

        let stream = self.connect().await?;
        let (mut sender, conn) = hyper::client::conn::http1::handshake(TokioIo::new(stream))
            .await
            .map_err(|e| transport(format!("HTTP handshake: {e}")))?;

        // Drive the connection in the background.
        tokio::spawn(async move {
            if let Err(e) = conn.await {
                tracing::debug!("backend connection closed: {e}");
            }
        });

        let body = serde_json::to_vec(params).map_err(|e| transport(format!("encode params: {e}")))?;
        let req = Request::builder()
            .method(Method::POST)
            .uri(self.operation_path(operation))
            .header("Host", &self.authority)
            .header("Content-Type", "application/json")
            .header("Content-Length", body.len().to_string())
            .body(Full::new(Bytes::from(body)))
            .map_err(|e| transport(format!("build request: {e}")))?;

        let resp = sender
            .send_request(req)
            .await
            .map_err(|e| transport(format!("send request: {e}")))?;

        let status = resp.status();
        let limit = self.max_response_bytes;
        let bytes = Limited::new(resp.into_body(), limit)
            .collect()
            .await
            .map_err(|e| {
                if e.is::<LengthLimitError>() {
                    BackendError::ResponseTooLarge { operation, limit }
                } else {
                    transport(format!("read response body: {e}"))
                }
            })?
            .to_bytes();

        if !status.is_success() {
            return Err(BackendError::Status {
                operation,
                status: status.as_u16(),
                body: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }

        let value: serde_json::Value = serde_json::from_slice(&bytes)
            .map_err(|source| BackendError::InvalidResponse { operation, source })?;
        Ok(Datum::from(value))
    }
}

#[async_trait]
impl TableBackend for HttpBackend {
    async fn get_table(&self, params: &Params) -> Result<Datum, BackendError> {
        self.call(Operation::GetTable, params).await
    }

    async fn join(&self, params: &Params) -> Result<Datum, BackendError> {
        self.call(Operation::Join, params).await
    }

    async fn union(&self, params: &Params) -> Result<Datum, BackendError> {
        self.call(Operation::Union, params).await
    }

    async fn create_table(&self, params: &Params) -> Result<Datum, BackendError> {
        self.call(Operation::CreateTable, params).await
    }

    /// Reachability only: succeeds once a TCP connection is accepted.
    async fn health_check(&self) -> Result<(), BackendError> {
        self.connect().await.map(drop)
    }
}
