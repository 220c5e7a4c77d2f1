//! Error types for depot operations.

use thiserror::Error;

/// Errors raised by a [`Depot`](crate::Depot) implementation.
#[derive(Error, Debug)]
pub enum DepotError {
    /// A module is already registered at this path.
    #[error("module already registered at '{path}'")]
    DuplicateModule {
        /// The `/`-joined module path.
        path: String,
    },

    /// No module is registered at this path.
    #[error("no module registered at '{path}'")]
    ModuleNotFound {
        /// The `/`-joined module path.
        path: String,
    },

    /// The resolved module has no mutation with this name.
    #[error("unknown mutation '{name}'")]
    UnknownMutation {
        /// The full commit type, e.g. `"todos/set_state_items"`.
        name: String,
    },

    /// The resolved module has no action with this name.
    #[error("unknown action '{name}'")]
    UnknownAction {
        /// The full dispatch type.
        name: String,
    },

    /// The resolved module has no derivation with this name.
    #[error("unknown derivation '{name}'")]
    UnknownDerivation {
        /// The full derivation type.
        name: String,
    },

    /// A mutation ran but could not apply its payload.
    #[error("mutation '{name}' failed: {reason}")]
    MutationFailed {
        /// The full commit type.
        name: String,
        /// Why the payload could not be applied.
        reason: String,
    },

    /// JSON serialization or deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DepotError {
    /// Create a `DuplicateModule` error from path segments.
    #[inline]
    pub fn duplicate_module(segments: &[String]) -> Self {
        Self::DuplicateModule {
            path: segments.join("/"),
        }
    }

    /// Create a `ModuleNotFound` error from path segments.
    #[inline]
    pub fn module_not_found(segments: &[String]) -> Self {
        Self::ModuleNotFound {
            path: segments.join("/"),
        }
    }

    /// Create an `UnknownMutation` error.
    #[inline]
    pub fn unknown_mutation(name: impl Into<String>) -> Self {
        Self::UnknownMutation { name: name.into() }
    }

    /// Create an `UnknownAction` error.
    #[inline]
    pub fn unknown_action(name: impl Into<String>) -> Self {
        Self::UnknownAction { name: name.into() }
    }

    /// Create an `UnknownDerivation` error.
    #[inline]
    pub fn unknown_derivation(name: impl Into<String>) -> Self {
        Self::UnknownDerivation { name: name.into() }
    }

    /// Create a `MutationFailed` error.
    #[inline]
    pub fn mutation_failed(name: impl Into<String>, reason: impl ToString) -> Self {
        Self::MutationFailed {
            name: name.into(),
            reason: reason.to_string(),
        }
    }
}

/// Result alias for depot operations.
pub type DepotResult<T> = Result<T, DepotError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = DepotError::duplicate_module(&["a".to_string(), "b".to_string()]);
        assert_eq!(err.to_string(), "module already registered at 'a/b'");

        let err = DepotError::unknown_mutation("s/set_state_value");
        assert_eq!(err.to_string(), "unknown mutation 's/set_state_value'");

        let err = DepotError::mutation_failed("s/set_state_value", "bad path");
        assert_eq!(err.to_string(), "mutation 's/set_state_value' failed: bad path");
    }
}
