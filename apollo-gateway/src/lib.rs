//! HTTP gateway for the Apollo table API.
//!
//! Exposes `/get-table`, `/join`, `/union`, and `/create-table`, each of
//! which forwards to a [`TableBackend`](apollo_backend::TableBackend) and
//! answers with the uniform response envelope, plus the `/version` and
//! `/about` metadata endpoints.

#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]

pub mod config;
pub mod error;
pub mod routes;
