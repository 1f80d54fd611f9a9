//! Name-to-implementation resolution for transforms and conditions.

use shirube_core::{
    ArgumentBag, ArgumentError, ConditionPlugin, Direction, FnCondition, FnTransform, PluginError,
    PluginKind, RegistryError, Schema, TransformPlugin, TransitionError, Value,
};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A registered plugin together with the schema it declared.
pub struct Registered<P: ?Sized> {
    schema: Schema,
    plugin: Arc<P>,
}

impl<P: ?Sized> Registered<P> {
    /// The schema captured at registration.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// The implementation.
    pub fn plugin(&self) -> &Arc<P> {
        &self.plugin
    }
}

impl<P: ?Sized> Clone for Registered<P> {
    fn clone(&self) -> Self {
        Self {
            schema: self.schema.clone(),
            plugin: Arc::clone(&self.plugin),
        }
    }
}

/// Result of [`PluginRegistry::resolve`].
pub enum Plugin<'a> {
    /// A transform implementation.
    Transform(&'a Registered<dyn TransformPlugin>),
    /// A condition implementation.
    Condition(&'a Registered<dyn ConditionPlugin>),
}

impl Plugin<'_> {
    /// The declared schema.
    pub fn schema(&self) -> &Schema {
        match self {
            Plugin::Transform(r) => r.schema(),
            Plugin::Condition(r) => r.schema(),
        }
    }

    /// The plugin kind.
    pub fn kind(&self) -> PluginKind {
        match self {
            Plugin::Transform(_) => PluginKind::Transform,
            Plugin::Condition(_) => PluginKind::Condition,
        }
    }
}

/// Why a plugin call did not happen.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Unresolved {
    NotRegistered,
    InvalidArguments(ArgumentError),
}

impl fmt::Display for Unresolved {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unresolved::NotRegistered => write!(f, "no plugin registered"),
            Unresolved::InvalidArguments(e) => write!(f, "invalid arguments: {}", e),
        }
    }
}

/// Outcome of dispatching an action name.
///
/// Callers apply their own policy to `Unresolved`; plugin crashes are
/// reported separately as `Err`.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Resolution<T> {
    Resolved(T),
    Unresolved(Unresolved),
}

/// Registry mapping `(kind, action)` to plugin implementations.
///
/// Lookups are read-only and safe to share across threads. Population
/// happens up front; see [`TransitionEngine::reload`](crate::TransitionEngine::reload)
/// for swapping a registry while rules are being evaluated.
///
/// # Examples
///
/// ```
/// use shirube::{PluginKind, PluginRegistry, Schema};
/// use serde_json::json;
///
/// let mut registry = PluginRegistry::new();
/// registry
///     .register_condition_fn("is_ok", Schema::default(), |_, value| Ok(value == &json!("ok")))
///     .expect("unique name");
///
/// assert!(registry.resolve(PluginKind::Condition, "is_ok").is_some());
/// assert!(registry.resolve(PluginKind::Transform, "is_ok").is_none());
/// ```
#[derive(Default)]
pub struct PluginRegistry {
    transforms: HashMap<String, Registered<dyn TransformPlugin>>,
    conditions: HashMap<String, Registered<dyn ConditionPlugin>>,
}

impl fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("transforms", &self.names(PluginKind::Transform))
            .field("conditions", &self.names(PluginKind::Condition))
            .finish()
    }
}

impl PluginRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry pre-populated with the [built-in](crate::builtins) plugins.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        crate::builtins::install(&mut registry);
        registry
    }

    /// Registers a transform under `action`.
    pub fn register_transform<P>(
        &mut self,
        action: impl Into<String>,
        plugin: P,
    ) -> Result<(), RegistryError>
    where
        P: TransformPlugin + 'static,
    {
        let action = action.into();
        if self.transforms.contains_key(&action) {
            return Err(RegistryError::Duplicate {
                kind: PluginKind::Transform,
                action,
            });
        }
        let registered = Registered {
            schema: plugin.schema(),
            plugin: Arc::new(plugin) as Arc<dyn TransformPlugin>,
        };
        self.transforms.insert(action, registered);
        Ok(())
    }

    /// Registers a condition under `action`.
    pub fn register_condition<P>(
        &mut self,
        action: impl Into<String>,
        plugin: P,
    ) -> Result<(), RegistryError>
    where
        P: ConditionPlugin + 'static,
    {
        let action = action.into();
        if self.conditions.contains_key(&action) {
            return Err(RegistryError::Duplicate {
                kind: PluginKind::Condition,
                action,
            });
        }
        let registered = Registered {
            schema: plugin.schema(),
            plugin: Arc::new(plugin) as Arc<dyn ConditionPlugin>,
        };
        self.conditions.insert(action, registered);
        Ok(())
    }

    /// Registers a closure as a transform.
    pub fn register_transform_fn<F>(
        &mut self,
        action: impl Into<String>,
        schema: Schema,
        f: F,
    ) -> Result<(), RegistryError>
    where
        F: Fn(&ArgumentBag, Value) -> Result<Value, PluginError> + Send + Sync + 'static,
    {
        self.register_transform(action, FnTransform::new(schema, f))
    }

    /// Registers a closure as a condition.
    pub fn register_condition_fn<F>(
        &mut self,
        action: impl Into<String>,
        schema: Schema,
        f: F,
    ) -> Result<(), RegistryError>
    where
        F: Fn(&ArgumentBag, &Value) -> Result<bool, PluginError> + Send + Sync + 'static,
    {
        self.register_condition(action, FnCondition::new(schema, f))
    }

    /// Removes a plugin, returning `true` if it was registered.
    pub fn unregister(&mut self, kind: PluginKind, action: &str) -> bool {
        match kind {
            PluginKind::Transform => self.transforms.remove(action).is_some(),
            PluginKind::Condition => self.conditions.remove(action).is_some(),
        }
    }

    /// Looks up a plugin. Absence is a normal outcome.
    pub fn resolve(&self, kind: PluginKind, action: &str) -> Option<Plugin<'_>> {
        match kind {
            PluginKind::Transform => self.transforms.get(action).map(Plugin::Transform),
            PluginKind::Condition => self.conditions.get(action).map(Plugin::Condition),
        }
    }

    /// Looks up a transform.
    pub fn transform(&self, action: &str) -> Option<&Registered<dyn TransformPlugin>> {
        self.transforms.get(action)
    }

    /// Looks up a condition.
    pub fn condition(&self, action: &str) -> Option<&Registered<dyn ConditionPlugin>> {
        self.conditions.get(action)
    }

    /// Returns `true` if a plugin of `kind` is registered under `action`.
    pub fn contains(&self, kind: PluginKind, action: &str) -> bool {
        self.resolve(kind, action).is_some()
    }

    /// Registered action names of one kind, sorted.
    pub fn names(&self, kind: PluginKind) -> Vec<&str> {
        let mut names: Vec<&str> = match kind {
            PluginKind::Transform => self.transforms.keys().map(String::as_str).collect(),
            PluginKind::Condition => self.conditions.keys().map(String::as_str).collect(),
        };
        names.sort_unstable();
        names
    }

    /// Total number of registered plugins.
    pub fn len(&self) -> usize {
        self.transforms.len() + self.conditions.len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resolves the transform for `action` and validates its arguments,
    /// with the incoming value bound to the name `value`.
    pub(crate) fn transform_for(
        &self,
        action: &str,
        args: &ArgumentBag,
        value: &Value,
    ) -> Resolution<&Registered<dyn TransformPlugin>> {
        let Some(registered) = self.transforms.get(action) else {
            return Resolution::Unresolved(Unresolved::NotRegistered);
        };
        match args.check_with_value(registered.schema(), Direction::Input, "value", value) {
            Ok(()) => Resolution::Resolved(registered),
            Err(e) => Resolution::Unresolved(Unresolved::InvalidArguments(e)),
        }
    }

    /// Resolves the condition for `action` and validates its arguments.
    ///
    /// Pure lookup: nothing is invoked, so callers can decide before
    /// running any transform.
    pub(crate) fn condition_for(
        &self,
        action: &str,
        args: &ArgumentBag,
    ) -> Resolution<&Registered<dyn ConditionPlugin>> {
        let Some(registered) = self.conditions.get(action) else {
            return Resolution::Unresolved(Unresolved::NotRegistered);
        };
        match args.check(registered.schema(), Direction::Input) {
            Ok(()) => Resolution::Resolved(registered),
            Err(e) => Resolution::Unresolved(Unresolved::InvalidArguments(e)),
        }
    }
}

/// Wraps a plugin's own error for the caller of `evaluate`.
pub(crate) fn execution_error(
    kind: PluginKind,
    action: &str,
    source: PluginError,
) -> TransitionError {
    TransitionError::PluginExecution {
        kind,
        action: action.to_string(),
        source,
    }
}
