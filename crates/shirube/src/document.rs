//! Document form of a [`TransitionRule`], for persisting workflow definitions.
//!
//! ```text
//! target: deploy
//! origin: review
//! guards:
//!   - action: greater_than
//!     args:
//!       threshold: 90
//!     filters:
//!       - action: json_select
//!         args:
//!           path: report.score
//! ```
//!
//! `target`, `action`, `args` and `filters` are stable field names that
//! editors and migration scripts rely on. `origin`, `guards`, `args` and
//! `filters` may be omitted when empty. Guard order is preserved on a
//! round trip but is not significant for equality.

use crate::guard::Guard;
use crate::rule::TransitionRule;
use crate::transform::Transform;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use serde_path_to_error::{Path, Segment};
use shirube_core::ArgumentBag;
use thiserror::Error;

/// Errors raised while reading or writing a rule document.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DocumentError {
    /// The text could not be parsed (or produced) at all.
    #[error("Malformed document: {0}")]
    Syntax(String),

    /// A node is missing a field, has the wrong shape, or carries a field
    /// this format does not define.
    #[error("Invalid document at {path}: {message}")]
    Invalid {
        /// Path of the offending node, e.g. `/guards/1/filters/0`.
        path: String,
        /// What is wrong with it.
        message: String,
    },
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
struct RuleDoc {
    target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    origin: Option<String>,
    #[serde(default)]
    guards: Vec<GuardDoc>,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
struct GuardDoc {
    action: String,
    #[serde(default)]
    args: Map<String, Value>,
    #[serde(default)]
    filters: Vec<FilterDoc>,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
struct FilterDoc {
    action: String,
    #[serde(default)]
    args: Map<String, Value>,
}

impl From<&TransitionRule> for RuleDoc {
    fn from(rule: &TransitionRule) -> Self {
        Self {
            target: rule.target().as_str().to_string(),
            origin: (!rule.origin().is_empty()).then(|| rule.origin().as_str().to_string()),
            guards: rule.guards().iter().map(GuardDoc::from).collect(),
        }
    }
}

impl From<&Guard> for GuardDoc {
    fn from(guard: &Guard) -> Self {
        Self {
            action: guard.action().to_string(),
            args: guard.args().to_map(),
            filters: guard.transforms().iter().map(FilterDoc::from).collect(),
        }
    }
}

impl From<&Transform> for FilterDoc {
    fn from(transform: &Transform) -> Self {
        Self {
            action: transform.action().to_string(),
            args: transform.args().to_map(),
        }
    }
}

impl From<RuleDoc> for TransitionRule {
    fn from(doc: RuleDoc) -> Self {
        let mut rule = TransitionRule::new(doc.origin.unwrap_or_default(), doc.target);
        for guard in doc.guards {
            let transforms = guard
                .filters
                .into_iter()
                .map(|f| Transform::new(f.action, ArgumentBag::from_map(f.args)))
                .collect();
            rule.add_guard(Guard::with_transforms(
                guard.action,
                ArgumentBag::from_map(guard.args),
                transforms,
            ));
        }
        rule
    }
}

impl TransitionRule {
    /// Converts the rule into its document tree.
    pub fn to_document(&self) -> Result<Value, DocumentError> {
        serde_json::to_value(RuleDoc::from(self))
            .map_err(|e| DocumentError::Syntax(e.to_string()))
    }

    /// Rebuilds a rule from a document tree.
    ///
    /// Fails on the first malformed node; a partially-built rule is never
    /// returned.
    pub fn from_document(document: &Value) -> Result<Self, DocumentError> {
        let doc: RuleDoc = serde_path_to_error::deserialize(document).map_err(|e| {
            DocumentError::Invalid {
                path: pointer(e.path()),
                message: e.into_inner().to_string(),
            }
        })?;
        Ok(doc.into())
    }

    /// Serializes the rule as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, DocumentError> {
        serde_json::to_string_pretty(&RuleDoc::from(self))
            .map_err(|e| DocumentError::Syntax(e.to_string()))
    }

    /// Parses a rule from JSON text.
    pub fn from_json(text: &str) -> Result<Self, DocumentError> {
        let document: Value =
            serde_json::from_str(text).map_err(|e| DocumentError::Syntax(e.to_string()))?;
        Self::from_document(&document)
    }

    /// Serializes the rule as YAML.
    pub fn to_yaml(&self) -> Result<String, DocumentError> {
        serde_yaml::to_string(&RuleDoc::from(self))
            .map_err(|e| DocumentError::Syntax(e.to_string()))
    }

    /// Parses a rule from YAML text.
    pub fn from_yaml(text: &str) -> Result<Self, DocumentError> {
        let document: Value =
            serde_yaml::from_str(text).map_err(|e| DocumentError::Syntax(e.to_string()))?;
        Self::from_document(&document)
    }
}

/// Renders a deserializer path as `/guards/1/filters/0`.
fn pointer(path: &Path) -> String {
    let segments: Vec<String> = path
        .iter()
        .map(|segment| match segment {
            Segment::Seq { index } => index.to_string(),
            Segment::Map { key } => key.clone(),
            Segment::Enum { variant } => variant.clone(),
            _ => "?".to_string(),
        })
        .collect();
    format!("/{}", segments.join("/"))
}
