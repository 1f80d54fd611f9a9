//! Guards: a transform chain followed by a condition.

use crate::registry::{execution_error, PluginRegistry, Resolution};
use crate::transform::Transform;
use shirube_core::{ArgumentBag, PluginKind, TransitionError, Value};
use tracing::debug;

/// A named boolean condition gating a transition.
///
/// Evaluation feeds the raw step output through `transforms` in order,
/// then asks the condition plugin named by `action` about the result.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Guard {
    action: String,
    args: ArgumentBag,
    transforms: Vec<Transform>,
}

impl Guard {
    /// Creates a guard with no transforms.
    pub fn new(action: impl Into<String>, args: ArgumentBag) -> Self {
        Self {
            action: action.into(),
            args,
            transforms: Vec::new(),
        }
    }

    /// Creates a guard with a transform chain.
    pub fn with_transforms(
        action: impl Into<String>,
        args: ArgumentBag,
        transforms: Vec<Transform>,
    ) -> Self {
        Self {
            action: action.into(),
            args,
            transforms,
        }
    }

    /// The condition plugin name.
    pub fn action(&self) -> &str {
        &self.action
    }

    /// The arguments passed to the condition.
    pub fn args(&self) -> &ArgumentBag {
        &self.args
    }

    /// Mutable access to the condition arguments.
    pub fn args_mut(&mut self) -> &mut ArgumentBag {
        &mut self.args
    }

    /// The transform chain, in application order.
    pub fn transforms(&self) -> &[Transform] {
        &self.transforms
    }

    /// Mutable access to one transform.
    pub fn transform_mut(&mut self, index: usize) -> Option<&mut Transform> {
        self.transforms.get_mut(index)
    }

    /// Replaces the condition plugin name.
    pub fn set_action(&mut self, action: impl Into<String>) {
        self.action = action.into();
    }

    /// Replaces the condition arguments.
    pub fn set_args(&mut self, args: ArgumentBag) {
        self.args = args;
    }

    /// Replaces a single condition argument.
    pub fn set_argument(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.args.set(name, value);
    }

    /// Replaces the whole transform chain.
    pub fn set_transforms(&mut self, transforms: Vec<Transform>) {
        self.transforms = transforms;
    }

    /// Adds a transform at `index`, or at the end when `index` is `None`.
    ///
    /// Returns `false` and leaves the chain unchanged if `index` is past
    /// the end.
    pub fn add_transform(
        &mut self,
        action: impl Into<String>,
        args: ArgumentBag,
        index: Option<usize>,
    ) -> bool {
        let transform = Transform::new(action, args);
        match index {
            None => self.transforms.push(transform),
            Some(i) if i <= self.transforms.len() => self.transforms.insert(i, transform),
            Some(_) => return false,
        }
        true
    }

    /// Removes the transform at `index`, returning `false` if there is none.
    pub fn remove_transform(&mut self, index: usize) -> bool {
        if index < self.transforms.len() {
            self.transforms.remove(index);
            true
        } else {
            false
        }
    }

    /// Runs the transform chain over `output`, returning the final value.
    pub fn transformed(
        &self,
        registry: &PluginRegistry,
        output: &Value,
    ) -> Result<Value, TransitionError> {
        self.transforms
            .iter()
            .try_fold(output.clone(), |data, transform| {
                transform.apply(registry, data)
            })
    }

    /// Evaluates the guard against a step's raw output.
    ///
    /// An unresolved condition, or arguments that fail validation, yield
    /// `false` before any plugin runs, transforms included. Plugin errors
    /// from the condition or from any transform are propagated.
    pub fn evaluate(
        &self,
        registry: &PluginRegistry,
        output: &Value,
    ) -> Result<bool, TransitionError> {
        let condition = match registry.condition_for(&self.action, &self.args) {
            Resolution::Resolved(condition) => condition,
            Resolution::Unresolved(reason) => {
                debug!("Guard '{}' treated as unsatisfied: {}", self.action, reason);
                return Ok(false);
            }
        };
        let data = self.transformed(registry, output)?;
        condition
            .plugin()
            .check(&self.args, &data)
            .map_err(|e| execution_error(PluginKind::Condition, &self.action, e))
    }
}
