//! Plugin traits for transforms and conditions.

use crate::argument::ArgumentBag;
use crate::error::PluginError;
use crate::schema::Schema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// The two kinds of plugins an action name can resolve to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PluginKind {
    /// Reshapes a value before a condition sees it.
    Transform,
    /// Decides whether a guard holds.
    Condition,
}

impl fmt::Display for PluginKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PluginKind::Transform => write!(f, "transform"),
            PluginKind::Condition => write!(f, "condition"),
        }
    }
}

/// A named data-shaping step.
///
/// # Examples
///
/// ```
/// use shirube_core::{ArgumentBag, ParamType, PluginError, Schema, TransformPlugin, Value};
///
/// struct Double;
///
/// impl TransformPlugin for Double {
///     fn schema(&self) -> Schema {
///         Schema::new().input("value", ParamType::Number)
///     }
///
///     fn apply(&self, _args: &ArgumentBag, value: Value) -> Result<Value, PluginError> {
///         let n = value.as_f64().ok_or_else(|| PluginError::failed("not a number"))?;
///         Ok(Value::from(n * 2.0))
///     }
/// }
/// ```
pub trait TransformPlugin: Send + Sync {
    /// Parameters this transform accepts. The incoming value is checked
    /// under the name `value`.
    fn schema(&self) -> Schema {
        Schema::default()
    }

    /// Produces the output value.
    fn apply(&self, args: &ArgumentBag, value: Value) -> Result<Value, PluginError>;
}

/// A named boolean test.
///
/// Implementations are expected to be free of side effects.
pub trait ConditionPlugin: Send + Sync {
    /// Parameters this condition accepts.
    fn schema(&self) -> Schema {
        Schema::default()
    }

    /// Tests the (already transformed) value.
    fn check(&self, args: &ArgumentBag, value: &Value) -> Result<bool, PluginError>;
}

/// Adapts a closure into a [`TransformPlugin`].
pub struct FnTransform<F> {
    schema: Schema,
    f: F,
}

impl<F> FnTransform<F>
where
    F: Fn(&ArgumentBag, Value) -> Result<Value, PluginError> + Send + Sync,
{
    /// Wraps `f`, declaring `schema`.
    pub fn new(schema: Schema, f: F) -> Self {
        Self { schema, f }
    }
}

impl<F> TransformPlugin for FnTransform<F>
where
    F: Fn(&ArgumentBag, Value) -> Result<Value, PluginError> + Send + Sync,
{
    fn schema(&self) -> Schema {
        self.schema.clone()
    }

    fn apply(&self, args: &ArgumentBag, value: Value) -> Result<Value, PluginError> {
        (self.f)(args, value)
    }
}

/// Adapts a closure into a [`ConditionPlugin`].
pub struct FnCondition<F> {
    schema: Schema,
    f: F,
}

impl<F> FnCondition<F>
where
    F: Fn(&ArgumentBag, &Value) -> Result<bool, PluginError> + Send + Sync,
{
    /// Wraps `f`, declaring `schema`.
    pub fn new(schema: Schema, f: F) -> Self {
        Self { schema, f }
    }
}

impl<F> ConditionPlugin for FnCondition<F>
where
    F: Fn(&ArgumentBag, &Value) -> Result<bool, PluginError> + Send + Sync,
{
    fn schema(&self) -> Schema {
        self.schema.clone()
    }

    fn check(&self, args: &ArgumentBag, value: &Value) -> Result<bool, PluginError> {
        (self.f)(args, value)
    }
}
