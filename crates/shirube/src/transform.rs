//! Named data-shaping steps applied ahead of a guard's condition.

use crate::registry::{execution_error, PluginRegistry, Resolution};
use shirube_core::{ArgumentBag, PluginKind, TransitionError, Value};
use tracing::debug;

/// A transform reference: an action name plus its arguments.
///
/// The action may name a plugin that does not exist. That is only
/// discovered at evaluation time, where it makes the transform a no-op.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transform {
    action: String,
    args: ArgumentBag,
}

impl Transform {
    /// Creates a transform.
    pub fn new(action: impl Into<String>, args: ArgumentBag) -> Self {
        Self {
            action: action.into(),
            args,
        }
    }

    /// The plugin name.
    pub fn action(&self) -> &str {
        &self.action
    }

    /// The arguments passed to the plugin.
    pub fn args(&self) -> &ArgumentBag {
        &self.args
    }

    /// Mutable access to the arguments.
    pub fn args_mut(&mut self) -> &mut ArgumentBag {
        &mut self.args
    }

    /// Replaces the plugin name.
    pub fn set_action(&mut self, action: impl Into<String>) {
        self.action = action.into();
    }

    /// Replaces the arguments.
    pub fn set_args(&mut self, args: ArgumentBag) {
        self.args = args;
    }

    /// Replaces a single argument.
    pub fn set_argument(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.args.set(name, value);
    }

    /// Applies the transform to `input`.
    ///
    /// An unresolved plugin, or arguments that fail validation, return the
    /// input unchanged. A plugin error is propagated.
    pub fn apply(&self, registry: &PluginRegistry, input: Value) -> Result<Value, TransitionError> {
        match registry.transform_for(&self.action, &self.args, &input) {
            Resolution::Resolved(transform) => transform
                .plugin()
                .apply(&self.args, input)
                .map_err(|e| execution_error(PluginKind::Transform, &self.action, e)),
            Resolution::Unresolved(reason) => {
                debug!("Transform '{}' passed value through: {}", self.action, reason);
                Ok(input)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use shirube_core::{ParamType, PluginError, Schema};

    fn registry() -> PluginRegistry {
        let mut registry = PluginRegistry::new();
        registry
            .register_transform_fn(
                "scale",
                Schema::new()
                    .input("value", ParamType::Number)
                    .input("factor", ParamType::Number),
                |args, value| {
                    let factor = args.get_f64("factor")?;
                    Ok(json!(value.as_f64().unwrap_or_default() * factor))
                },
            )
            .expect("register scale");
        registry
            .register_transform_fn("fail", Schema::default(), |_, _| {
                Err(PluginError::failed("cannot"))
            })
            .expect("register fail");
        registry
    }

    #[test]
    fn test_apply_resolved() {
        let transform = Transform::new("scale", ArgumentBag::build([("factor", json!(2.5))]));
        assert_eq!(transform.apply(&registry(), json!(2)), Ok(json!(5.0)));
    }

    #[test]
    fn test_unresolved_passes_through() {
        let transform = Transform::new("no_such_plugin", ArgumentBag::new());
        assert_eq!(
            transform.apply(&registry(), json!({"a": [1, 2]})),
            Ok(json!({"a": [1, 2]}))
        );
    }

    #[test]
    fn test_invalid_arguments_pass_through() {
        let missing_factor = Transform::new("scale", ArgumentBag::new());
        assert_eq!(missing_factor.apply(&registry(), json!(3)), Ok(json!(3)));

        // The implicit `value` argument is validated too.
        let bad_input = Transform::new("scale", ArgumentBag::build([("factor", json!(2))]));
        assert_eq!(bad_input.apply(&registry(), json!("x")), Ok(json!("x")));
    }

    #[test]
    fn test_plugin_failure_propagates() {
        let transform = Transform::new("fail", ArgumentBag::new());
        assert!(matches!(
            transform.apply(&registry(), json!(1)),
            Err(TransitionError::PluginExecution { kind: PluginKind::Transform, ref action, .. })
                if action == "fail"
        ));
    }

    #[test]
    fn test_attribute_edits() {
        let mut transform = Transform::new("scale", ArgumentBag::new());
        transform.set_argument("factor", 3);
        assert_eq!(transform.apply(&registry(), json!(2)), Ok(json!(6.0)));

        transform.set_action("other");
        assert_eq!(transform.action(), "other");
        assert_eq!(transform.apply(&registry(), json!(2)), Ok(json!(2)));
    }
}
