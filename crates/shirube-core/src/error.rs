//! Error types.

use crate::argument::ArgType;
use crate::plugin::PluginKind;
use crate::schema::ParamType;
use thiserror::Error;

/// Errors raised while reading or checking an [`ArgumentBag`](crate::ArgumentBag).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ArgumentError {
    /// The bag has no entry with this name.
    #[error("Missing argument: {name}")]
    Missing {
        /// The requested argument name.
        name: String,
    },

    /// The entry exists but its value cannot be read as the expected type.
    #[error("Argument '{name}' expected {expected}, found {found}")]
    TypeMismatch {
        /// The argument name.
        name: String,
        /// The type the reader asked for.
        expected: ParamType,
        /// The tag inferred from the stored value.
        found: ArgType,
    },
}

/// Errors returned by plugin implementations.
///
/// A plugin returning `Err` is a crash from the engine's point of view and
/// is never folded into a "condition false" result.
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum PluginError {
    /// An argument could not be read.
    #[error(transparent)]
    Argument(#[from] ArgumentError),

    /// The incoming value has a shape the plugin cannot handle.
    #[error("Invalid input: expected {expected}, found {found}")]
    InvalidInput {
        /// What the plugin needed.
        expected: String,
        /// What it received.
        found: String,
    },

    /// Any other failure.
    #[error("{0}")]
    Failed(String),
}

impl PluginError {
    /// Shorthand for [`PluginError::Failed`].
    pub fn failed(details: impl Into<String>) -> Self {
        Self::Failed(details.into())
    }
}

/// Errors surfaced by transition evaluation.
///
/// Unresolved plugins and arguments that fail validation are not errors;
/// they turn into pass-through (transforms) or `false` (guards).
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum TransitionError {
    /// A resolved plugin failed while running.
    #[error("{kind} plugin '{action}' failed: {source}")]
    PluginExecution {
        /// Whether the plugin was a transform or a condition.
        kind: PluginKind,
        /// The action name it was resolved from.
        action: String,
        /// The failure reported by the plugin.
        source: PluginError,
    },
}

/// Errors raised while populating a plugin registry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RegistryError {
    /// A plugin of the same kind is already registered under this name.
    #[error("{kind} plugin '{action}' is already registered")]
    Duplicate {
        /// The plugin kind.
        kind: PluginKind,
        /// The conflicting action name.
        action: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = ArgumentError::Missing {
            name: "threshold".to_string(),
        };
        assert_eq!(error.to_string(), "Missing argument: threshold");

        let error = ArgumentError::TypeMismatch {
            name: "threshold".to_string(),
            expected: ParamType::Number,
            found: ArgType::String,
        };
        assert_eq!(
            error.to_string(),
            "Argument 'threshold' expected number, found string"
        );
    }

    #[test]
    fn test_plugin_execution_display() {
        let error = TransitionError::PluginExecution {
            kind: PluginKind::Condition,
            action: "regex_match".to_string(),
            source: PluginError::failed("bad pattern"),
        };
        assert_eq!(
            error.to_string(),
            "condition plugin 'regex_match' failed: bad pattern"
        );
    }

    #[test]
    fn test_registry_error_display() {
        let error = RegistryError::Duplicate {
            kind: PluginKind::Transform,
            action: "add".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "transform plugin 'add' is already registered"
        );
    }
}
