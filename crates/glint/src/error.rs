//! Error types for glint operations.

use crate::Path;
use thiserror::Error;

/// Result type alias for glint operations.
pub type GlintResult<T> = Result<T, GlintError>;

/// Errors that can occur during glint operations.
#[derive(Debug, Error)]
pub enum GlintError {
    /// Path does not exist in the value tree.
    #[error("path not found: {path}")]
    PathNotFound {
        /// The path that was not found.
        path: Path,
    },

    /// Array index is out of bounds.
    #[error("index {index} out of bounds (len: {len}) at path {path}")]
    IndexOutOfBounds {
        /// The path to the array.
        path: Path,
        /// The index that was accessed.
        index: usize,
        /// The actual length of the array.
        len: usize,
    },

    /// Type mismatch when accessing a value.
    #[error("type mismatch at {path}: expected {expected}, found {found}")]
    TypeMismatch {
        /// The path where the mismatch occurred.
        path: Path,
        /// The expected type.
        expected: &'static str,
        /// The actual type found.
        found: &'static str,
    },

    /// A proxy operation was applied to a value that cannot support it.
    #[error("invalid proxy target: {detail}")]
    InvalidProxyTarget {
        /// Description of what went wrong.
        detail: String,
    },

    /// A store declaration was not in a recognizable shape.
    #[error("unsupported declaration shape: expected object, found {found}")]
    UnsupportedDeclarationShape {
        /// The actual type found.
        found: &'static str,
    },

    /// A store instance was expected in the registry but is absent.
    #[error("store `{id}` is not registered")]
    MissingRegistryEntry {
        /// The store id that was looked up.
        id: String,
    },

    /// A member was called like an action but is not one.
    #[error("member `{name}` is not invocable")]
    NotInvocable {
        /// The member that was called.
        name: String,
    },

    /// JSON serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl GlintError {
    /// Create a path not found error.
    #[inline]
    pub fn path_not_found(path: Path) -> Self {
        GlintError::PathNotFound { path }
    }

    /// Create an index out of bounds error.
    #[inline]
    pub fn index_out_of_bounds(path: Path, index: usize, len: usize) -> Self {
        GlintError::IndexOutOfBounds { path, index, len }
    }

    /// Create a type mismatch error.
    #[inline]
    pub fn type_mismatch(path: Path, expected: &'static str, found: &'static str) -> Self {
        GlintError::TypeMismatch {
            path,
            expected,
            found,
        }
    }

    /// Create an invalid proxy target error.
    #[inline]
    pub fn invalid_proxy_target(detail: impl Into<String>) -> Self {
        GlintError::InvalidProxyTarget {
            detail: detail.into(),
        }
    }

    /// Create an unsupported declaration shape error.
    #[inline]
    pub fn unsupported_declaration_shape(found: &'static str) -> Self {
        GlintError::UnsupportedDeclarationShape { found }
    }

    /// Create a missing registry entry error.
    #[inline]
    pub fn missing_registry_entry(id: impl Into<String>) -> Self {
        GlintError::MissingRegistryEntry { id: id.into() }
    }

    /// Create a not invocable error.
    #[inline]
    pub fn not_invocable(name: impl Into<String>) -> Self {
        GlintError::NotInvocable { name: name.into() }
    }
}

/// Get the type name of a JSON value.
#[inline]
pub fn value_type_name(v: &serde_json::Value) -> &'static str {
    match v {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
