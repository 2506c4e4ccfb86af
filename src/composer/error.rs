//! Composition errors.

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ComposeError {
    /// A targeted augmentation found an incompatible shape at its path.
    #[error("schema mismatch at `{path}`: expected {expected}, found {found}")]
    SchemaMismatch {
        path: String,
        expected: &'static str,
        found: &'static str,
    },
}

/// JSON type name, for error messages.
pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
