//! Core types for the Apollo table API.
//!
//! Defines the closed [`Datum`] value model returned by data backends, the
//! JSON encoder for it, and the success/error response envelopes every data
//! endpoint answers with.

#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]

pub mod datum;
pub mod encode;
pub mod envelope;
pub mod error;
pub mod info;

pub use datum::Datum;
pub use encode::encode;
pub use envelope::{Envelope, ErrorEnvelope, Params};
pub use error::EncodingError;
pub use info::ApiInfo;
