//! Notification seam for transition outcomes.

use crate::step::StepName;
use std::sync::Arc;

/// Receives the outcome of every completed rule evaluation.
///
/// Called exactly once per successful `evaluate` call, with `fired`
/// matching the returned result. Evaluations that fail with a plugin
/// error do not notify.
pub trait TransitionObserver: Send + Sync {
    /// Reports whether the transition from `origin` to `target` fired.
    fn on_transition_evaluated(&self, origin: &StepName, target: &StepName, fired: bool);
}

impl<T: TransitionObserver + ?Sized> TransitionObserver for Arc<T> {
    fn on_transition_evaluated(&self, origin: &StepName, target: &StepName, fired: bool) {
        (**self).on_transition_evaluated(origin, target, fired)
    }
}

impl<T: TransitionObserver + ?Sized> TransitionObserver for &T {
    fn on_transition_evaluated(&self, origin: &StepName, target: &StepName, fired: bool) {
        (**self).on_transition_evaluated(origin, target, fired)
    }
}
