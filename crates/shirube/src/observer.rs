//! Ready-made [`TransitionObserver`] implementations.

use shirube_core::{StepName, TransitionObserver};
use std::sync::{Arc, Mutex};
use tracing::info;

/// Ignores every notification. The engine default.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl TransitionObserver for NoopObserver {
    fn on_transition_evaluated(&self, _origin: &StepName, _target: &StepName, _fired: bool) {}
}

/// Logs each outcome at `info` level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl TransitionObserver for TracingObserver {
    fn on_transition_evaluated(&self, origin: &StepName, target: &StepName, fired: bool) {
        if fired {
            info!(origin = %origin, target = %target, "Step taken");
        } else {
            info!(origin = %origin, target = %target, "Step not taken");
        }
    }
}

/// One recorded notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionEvent {
    /// The step whose output was evaluated.
    pub origin: StepName,
    /// The candidate next step.
    pub target: StepName,
    /// Whether the transition fired.
    pub fired: bool,
}

/// Keeps every notification in memory, in arrival order.
///
/// Useful for audit trails and for asserting on engine behavior in tests.
#[derive(Debug, Default)]
pub struct TransitionLog {
    events: Mutex<Vec<TransitionEvent>>,
}

impl TransitionLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the recorded events.
    pub fn events(&self) -> Vec<TransitionEvent> {
        self.lock().clone()
    }

    /// Number of recorded events.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns `true` if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Events whose transition fired.
    pub fn taken(&self) -> Vec<TransitionEvent> {
        self.lock().iter().filter(|e| e.fired).cloned().collect()
    }

    /// Discards all recorded events.
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<TransitionEvent>> {
        // A panic while holding the lock cannot leave the Vec inconsistent.
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl TransitionObserver for TransitionLog {
    fn on_transition_evaluated(&self, origin: &StepName, target: &StepName, fired: bool) {
        self.lock().push(TransitionEvent {
            origin: origin.clone(),
            target: target.clone(),
            fired,
        });
    }
}

/// Forwards each notification to several observers, in registration order.
#[derive(Default, Clone)]
pub struct Observers {
    observers: Vec<Arc<dyn TransitionObserver>>,
}

impl std::fmt::Debug for Observers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observers")
            .field("count", &self.observers.len())
            .finish()
    }
}

impl Observers {
    /// Creates an empty fan-out.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an observer.
    pub fn with(mut self, observer: impl TransitionObserver + 'static) -> Self {
        self.observers.push(Arc::new(observer));
        self
    }

    /// Adds a shared observer.
    pub fn push(&mut self, observer: Arc<dyn TransitionObserver>) {
        self.observers.push(observer);
    }

    /// Number of observers.
    pub fn len(&self) -> usize {
        self.observers.len()
    }

    /// Returns `true` if there are no observers.
    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

impl TransitionObserver for Observers {
    fn on_transition_evaluated(&self, origin: &StepName, target: &StepName, fired: bool) {
        for observer in &self.observers {
            observer.on_transition_evaluated(origin, target, fired);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_log_records_in_order() {
        let log = TransitionLog::new();
        log.on_transition_evaluated(&"a".into(), &"b".into(), true);
        log.on_transition_evaluated(&"a".into(), &"c".into(), false);

        assert_eq!(log.len(), 2);
        assert_eq!(
            log.events()[1],
            TransitionEvent {
                origin: StepName::new("a"),
                target: StepName::new("c"),
                fired: false,
            }
        );
        assert_eq!(log.taken().len(), 1);

        log.clear();
        assert!(log.is_empty());
    }

    #[test]
    fn test_fan_out_reaches_every_observer() {
        let first = Arc::new(TransitionLog::new());
        let second = Arc::new(TransitionLog::new());
        let mut observers = Observers::new().with(TracingObserver);
        observers.push(first.clone());
        observers.push(second.clone());

        observers.on_transition_evaluated(&"a".into(), &"b".into(), true);

        assert_eq!(observers.len(), 3);
        assert_eq!(first.len(), 1);
        assert_eq!(second.len(), 1);
    }
}
