//! Transition rules: a target step gated by all-of guards.

use crate::guard::Guard;
use crate::registry::PluginRegistry;
use crate::transform::Transform;
use shirube_core::{ArgumentBag, StepName, TransitionError, TransitionObserver, Value};
use tracing::error;

/// Decides whether a step's output leads to `target`.
///
/// A rule fires when every guard holds; a rule without guards always
/// fires. Editing requires `&mut self`, so a rule shared behind an `Arc`
/// is frozen for the duration of its evaluations.
///
/// # Equality
///
/// Two rules are equal when their targets match and their guard
/// collections are equal as sets: order is ignored and duplicates
/// collapse. The origin is not compared.
///
/// # Examples
///
/// ```
/// use shirube::{ArgumentBag, NoopObserver, PluginRegistry, StepName, TransitionRule};
/// use serde_json::json;
///
/// let registry = PluginRegistry::with_builtins();
/// let mut rule = TransitionRule::new("review", "deploy");
/// rule.create_guard("greater_than", ArgumentBag::build([("threshold", json!(90))]), vec![]);
///
/// let next = rule.evaluate(&registry, &NoopObserver, &json!(95)).expect("no plugin failure");
/// assert_eq!(next, Some(StepName::new("deploy")));
/// ```
#[derive(Debug, Clone, Default)]
pub struct TransitionRule {
    origin: StepName,
    target: StepName,
    guards: Vec<Guard>,
}

impl TransitionRule {
    /// Creates an unconditional rule from `origin` to `target`.
    pub fn new(origin: impl Into<StepName>, target: impl Into<StepName>) -> Self {
        Self {
            origin: origin.into(),
            target: target.into(),
            guards: Vec::new(),
        }
    }

    /// Builder-style guard addition.
    pub fn with_guard(mut self, guard: Guard) -> Self {
        self.guards.push(guard);
        self
    }

    /// The step whose output this rule inspects.
    pub fn origin(&self) -> &StepName {
        &self.origin
    }

    /// The step this rule leads to.
    pub fn target(&self) -> &StepName {
        &self.target
    }

    /// Sets the origin step.
    pub fn set_origin(&mut self, origin: impl Into<StepName>) {
        self.origin = origin.into();
    }

    /// Sets the target step.
    pub fn set_target(&mut self, target: impl Into<StepName>) {
        self.target = target.into();
    }

    /// The guards.
    pub fn guards(&self) -> &[Guard] {
        &self.guards
    }

    /// Mutable access to one guard.
    pub fn guard_mut(&mut self, index: usize) -> Option<&mut Guard> {
        self.guards.get_mut(index)
    }

    /// Returns `true` if the rule has no guards.
    pub fn is_unconditional(&self) -> bool {
        self.guards.is_empty()
    }

    /// Builds a guard and adds it, returning it for further edits.
    pub fn create_guard(
        &mut self,
        action: impl Into<String>,
        args: ArgumentBag,
        transforms: Vec<Transform>,
    ) -> &mut Guard {
        let index = self.guards.len();
        self.guards
            .push(Guard::with_transforms(action, args, transforms));
        &mut self.guards[index]
    }

    /// Adds an existing guard.
    pub fn add_guard(&mut self, guard: Guard) {
        self.guards.push(guard);
    }

    /// Removes the guard at `index`.
    ///
    /// Returns `false` and leaves the guards unchanged if `index` is out
    /// of range.
    pub fn remove_guard(&mut self, index: usize) -> bool {
        if index < self.guards.len() {
            self.guards.remove(index);
            true
        } else {
            false
        }
    }

    /// Evaluates the rule against a step's raw output.
    ///
    /// Every guard starts from the same raw output. Evaluation stops at
    /// the first guard that does not hold. On a clean result the observer
    /// is notified exactly once and the target is returned when the rule
    /// fired. A plugin failure is returned as `Err` and the observer is
    /// not notified.
    pub fn evaluate(
        &self,
        registry: &PluginRegistry,
        observer: &dyn TransitionObserver,
        output: &Value,
    ) -> Result<Option<StepName>, TransitionError> {
        let fired = match self.holds(registry, output) {
            Ok(fired) => fired,
            Err(e) => {
                error!(
                    "Transition '{}' -> '{}' aborted: {}",
                    self.origin, self.target, e
                );
                return Err(e);
            }
        };

        observer.on_transition_evaluated(&self.origin, &self.target, fired);
        Ok(fired.then(|| self.target.clone()))
    }

    fn holds(&self, registry: &PluginRegistry, output: &Value) -> Result<bool, TransitionError> {
        for guard in &self.guards {
            if !guard.evaluate(registry, output)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

impl PartialEq for TransitionRule {
    fn eq(&self, other: &Self) -> bool {
        self.target == other.target
            && self.guards.iter().all(|g| other.guards.contains(g))
            && other.guards.iter().all(|g| self.guards.contains(g))
    }
}
