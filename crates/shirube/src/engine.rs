//! Engine bundling a plugin registry with an observer.

use crate::observer::NoopObserver;
use crate::registry::PluginRegistry;
use crate::rule::TransitionRule;
use shirube_core::{StepName, TransitionError, TransitionObserver, Value};
use std::fmt;
use std::sync::{Arc, RwLock};
use tracing::{debug, info};

/// Evaluates transition rules for an executor.
///
/// Holds the plugin registry behind a swappable snapshot so it can be
/// [`reload`](Self::reload)ed without interleaving with evaluations: each
/// evaluation works against the registry that was current when it began.
pub struct TransitionEngine {
    registry: RwLock<Arc<PluginRegistry>>,
    observer: Arc<dyn TransitionObserver>,
}

impl fmt::Debug for TransitionEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransitionEngine")
            .field("registry", &self.registry())
            .finish_non_exhaustive()
    }
}

impl Default for TransitionEngine {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl TransitionEngine {
    /// Creates a new engine builder.
    pub fn builder() -> TransitionEngineBuilder {
        TransitionEngineBuilder::new()
    }

    /// Returns the current registry snapshot.
    pub fn registry(&self) -> Arc<PluginRegistry> {
        let guard = self
            .registry
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(&guard)
    }

    /// Replaces the registry. Evaluations already running finish against
    /// the previous one.
    pub fn reload(&self, registry: PluginRegistry) {
        let plugins = registry.len();
        let mut guard = self
            .registry
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = Arc::new(registry);
        info!("Plugin registry reloaded with {} plugins", plugins);
    }

    /// Evaluates a single rule. See [`TransitionRule::evaluate`].
    pub fn evaluate(
        &self,
        rule: &TransitionRule,
        output: &Value,
    ) -> Result<Option<StepName>, TransitionError> {
        let registry = self.registry();
        rule.evaluate(&registry, self.observer.as_ref(), output)
    }

    /// Picks the next step from a step's ordered rules: the target of the
    /// first rule that fires, or `None` if none does.
    ///
    /// Rules after the first one that fires are not evaluated. A plugin
    /// failure stops the selection and is returned.
    pub fn select_next<'a, I>(
        &self,
        rules: I,
        output: &Value,
    ) -> Result<Option<StepName>, TransitionError>
    where
        I: IntoIterator<Item = &'a TransitionRule>,
    {
        let registry = self.registry();
        for rule in rules {
            if let Some(next) = rule.evaluate(&registry, self.observer.as_ref(), output)? {
                debug!("Selected transition '{}' -> '{}'", rule.origin(), next);
                return Ok(Some(next));
            }
        }
        Ok(None)
    }
}

/// Builder for [`TransitionEngine`].
#[derive(Default)]
pub struct TransitionEngineBuilder {
    registry: Option<PluginRegistry>,
    builtins: bool,
    observer: Option<Arc<dyn TransitionObserver>>,
}

impl TransitionEngineBuilder {
    /// Creates a builder with an empty registry and no observer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses `registry` for plugin resolution.
    pub fn registry(mut self, registry: PluginRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Installs the built-in plugins into the registry. Names already
    /// registered take precedence.
    pub fn with_builtins(mut self) -> Self {
        self.builtins = true;
        self
    }

    /// Sets the observer.
    pub fn observer(mut self, observer: impl TransitionObserver + 'static) -> Self {
        self.observer = Some(Arc::new(observer));
        self
    }

    /// Sets a shared observer.
    pub fn shared_observer(mut self, observer: Arc<dyn TransitionObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Builds the engine.
    pub fn build(self) -> TransitionEngine {
        let mut registry = self.registry.unwrap_or_default();
        if self.builtins {
            crate::builtins::install(&mut registry);
        }
        TransitionEngine {
            registry: RwLock::new(Arc::new(registry)),
            observer: self.observer.unwrap_or_else(|| Arc::new(NoopObserver)),
        }
    }
}
