//! Request unpacking.
//!
//! Each operation reads a fixed set of fields from the request object.
//! Fields are only presence-checked: a missing field becomes `null`, and
//! anything beyond the listed fields is ignored.

use apollo_core::Params;
use serde_json::Value;

use crate::{Operation, UnpackError};

/// Fields read by `get-table`.
pub const TABLE_FIELDS: &[&str] = &["keyspace", "tablename", "columns", "filter"];
/// Fields read by `join`.
pub const JOIN_FIELDS: &[&str] = &["table_a", "table_b", "on", "how", "columns"];
/// Fields read by `union`.
pub const UNION_FIELDS: &[&str] = &["tables", "columns", "distinct"];
/// Fields read by `create-table`.
pub const CREATE_TABLE_FIELDS: &[&str] = &["keyspace", "tablename", "columns"];

/// Unpack a `get-table` request.
///
/// # Errors
/// Returns [`UnpackError::NotAnObject`] if `request` is not a JSON object.
pub fn table(request: &Value) -> Result<Params, UnpackError> {
    pick(Operation::GetTable, request, TABLE_FIELDS)
}

/// Unpack a `join` request.
///
/// # Errors
/// Returns [`UnpackError::NotAnObject`] if `request` is not a JSON object.
pub fn join(request: &Value) -> Result<Params, UnpackError> {
    pick(Operation::Join, request, JOIN_FIELDS)
}

/// Unpack a `union` request.
///
/// # Errors
/// Returns [`UnpackError::NotAnObject`] if `request` is not a JSON object.
pub fn union(request: &Value) -> Result<Params, UnpackError> {
    pick(Operation::Union, request, UNION_FIELDS)
}

/// Unpack a `create-table` request.
///
/// # Errors
/// Returns [`UnpackError::NotAnObject`] if `request` is not a JSON object.
pub fn create_table(request: &Value) -> Result<Params, UnpackError> {
    pick(Operation::CreateTable, request, CREATE_TABLE_FIELDS)
}

/// Unpack `request` with the unpacker belonging to `operation`.
///
/// # Errors
/// Returns [`UnpackError::NotAnObject`] if `request` is not a JSON object.
pub fn for_operation(operation: Operation, request: &Value) -> Result<Params, UnpackError> {
    match operation {
        Operation::GetTable => table(request),
        Operation::Join => join(request),
        Operation::Union => union(request),
        Operation::CreateTable => create_table(request),
    }
}

fn pick(operation: Operation, request: &Value, fields: &[&str]) -> Result<Params, UnpackError> {
    let Value::Object(object) = request else {
        return Err(UnpackError::NotAnObject { operation, found: kind_name(request) });
    };
    Ok(fields
        .iter()
        .map(|&field| {
            let value = object.get(field).cloned().unwrap_or(Value::Null);
            (field.to_owned(), value)
        })
        .collect())
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
