//! Data-processing backend abstraction trait.
//!
//! The gateway only knows operation names and parameter mappings. What a
//! join or union actually does is up to the implementation behind this
//! trait.

use std::fmt;

use apollo_core::{Datum, Params};
use async_trait::async_trait;

use crate::BackendError;

/// One of the four data operations exposed by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Operation {
    GetTable,
    Join,
    Union,
    CreateTable,
}

impl Operation {
    /// All operations, in route order.
    pub const ALL: [Operation; 4] = [Self::GetTable, Self::Join, Self::Union, Self::CreateTable];

    /// Path segment the operation is served under, e.g. `get-table`.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::GetTable => "get-table",
            Self::Join => "join",
            Self::Union => "union",
            Self::CreateTable => "create-table",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Data-processing backend.
///
/// Implementations must be `Send + Sync` so one instance can serve every
/// request concurrently.
///
/// # Cancel Safety
/// Callers may drop any returned future; the gateway does not retry.
#[async_trait]
pub trait TableBackend: Send + Sync {
    /// Fetch the rows of one table.
    ///
    /// # Errors
    /// Any [`BackendError`]; the gateway reports all of them the same way.
    async fn get_table(&self, params: &Params) -> Result<Datum, BackendError>;

    /// Join two tables.
    ///
    /// # Errors
    /// Any [`BackendError`].
    async fn join(&self, params: &Params) -> Result<Datum, BackendError>;

    /// Union several tables.
    ///
    /// # Errors
    /// Any [`BackendError`].
    async fn union(&self, params: &Params) -> Result<Datum, BackendError>;

    /// Create a table in a keyspace.
    ///
    /// # Errors
    /// Any [`BackendError`].
    async fn create_table(&self, params: &Params) -> Result<Datum, BackendError>;

    /// Check that the backend is reachable.
    ///
    /// # Errors
    /// Returns [`BackendError`] if the backend cannot be contacted.
    async fn health_check(&self) -> Result<(), BackendError>;

    /// Dispatch `operation` to the matching method.
    ///
    /// # Errors
    /// Propagates the error of the dispatched method.
    async fn invoke(&self, operation: Operation, params: &Params) -> Result<Datum, BackendError> {
        match operation {
            Operation::GetTable => self.get_table(params).await,
            Operation::Join => self.join(params).await,
            Operation::Union => self.union(params).await,
            Operation::CreateTable => self.create_table(params).await,
        }
    }
}
