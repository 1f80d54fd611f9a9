//! Step identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Type-safe step identifier.
///
/// Names the origin and target of a transition. The engine never
/// interprets the string; the executor owns the mapping to real steps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StepName(String);

impl StepName {
    /// Creates a new StepName.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the step name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` for the empty name.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for StepName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for StepName {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for StepName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for StepName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::borrow::Borrow<str> for StepName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_name() {
        let name = StepName::new("test");
        assert_eq!(name.as_str(), "test");

        let name: StepName = "test".into();
        assert_eq!(name.as_str(), "test");
        assert!(!name.is_empty());
        assert!(StepName::default().is_empty());
    }

    #[test]
    fn test_step_name_serializes_as_plain_string() {
        let name = StepName::new("review");
        let json = serde_json::to_string(&name).expect("serialize");
        assert_eq!(json, "\"review\"");

        let back: StepName = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, name);
    }
}
