//! Data-processing backend layer for the Apollo table API.
//!
//! Turns request bodies into parameter mappings ([`unpack`]), defines the
//! [`TableBackend`] seam the gateway calls through, and ships
//! [`HttpBackend`], which forwards each operation to an external service.

#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]

pub mod backend;
pub mod error;
pub mod http;
pub mod unpack;

pub use backend::{Operation, TableBackend};
pub use error::{BackendError, UnpackError};
pub use http::HttpBackend;
