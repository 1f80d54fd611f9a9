//! Conditional step-transition engine for workflow runners.
//!
//! After a workflow step produces output, the executor asks each of the
//! step's [`TransitionRule`]s whether it fires. A rule fires when all of its
//! [`Guard`]s hold; a guard runs its [`Transform`] chain over the output and
//! hands the result to a condition plugin. Plugins are looked up by name in
//! a [`PluginRegistry`], and a name that resolves to nothing is tolerated:
//! transforms pass the value through and guards evaluate to `false`.
//!
//! # Example
//!
//! ```rust
//! use shirube::prelude::*;
//! use serde_json::json;
//!
//! let log = std::sync::Arc::new(TransitionLog::new());
//! let engine = TransitionEngine::builder()
//!     .with_builtins()
//!     .shared_observer(log.clone())
//!     .build();
//!
//! let mut rule = TransitionRule::new("score", "publish");
//! rule.create_guard(
//!     "greater_than",
//!     ArgumentBag::build([("threshold", json!(0.8))]),
//!     vec![Transform::new(
//!         "json_select",
//!         ArgumentBag::build([("path", json!("result.confidence"))]),
//!     )],
//! );
//!
//! let next = engine
//!     .evaluate(&rule, &json!({"result": {"confidence": 0.93}}))
//!     .expect("no plugin failure");
//! assert_eq!(next, Some(StepName::new("publish")));
//! assert_eq!(log.taken().len(), 1);
//! ```
//!
//! # Custom plugins
//!
//! ```rust
//! use shirube::prelude::*;
//! use serde_json::json;
//!
//! let mut registry = PluginRegistry::new();
//! registry
//!     .register_condition_fn(
//!         "status_is",
//!         Schema::new().input("status", ParamType::String),
//!         |args, value| Ok(value["status"].as_str() == Some(args.get_str("status")?)),
//!     )
//!     .expect("unique name");
//!
//! let rule = TransitionRule::new("build", "release")
//!     .with_guard(Guard::new("status_is", ArgumentBag::build([("status", json!("green"))])));
//!
//! let engine = TransitionEngine::builder().registry(registry).build();
//! assert_eq!(
//!     engine.evaluate(&rule, &json!({"status": "green"})).expect("no plugin failure"),
//!     Some(StepName::new("release"))
//! );
//! ```
//!
//! # Errors
//!
//! Missing plugins and arguments that fail schema validation are silent by
//! policy. A plugin that returns an error aborts the evaluation with
//! [`TransitionError::PluginExecution`] and the observer is not notified,
//! so a crashing condition is never mistaken for a clean `false`.

pub mod builtins;
mod document;
mod engine;
mod guard;
mod observer;
mod registry;
mod rule;
mod transform;

// Re-export core types
pub use shirube_core::*;

pub use document::DocumentError;
pub use engine::{TransitionEngine, TransitionEngineBuilder};
pub use guard::Guard;
pub use observer::{NoopObserver, Observers, TracingObserver, TransitionEvent, TransitionLog};
pub use registry::{Plugin, PluginRegistry, Registered};
pub use rule::TransitionRule;
pub use transform::Transform;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{
        ArgumentBag, ConditionPlugin, DocumentError, Guard, NoopObserver, ParamType, PluginError,
        PluginKind, PluginRegistry, Schema, StepName, TracingObserver, Transform, TransformPlugin,
        TransitionEngine, TransitionEngineBuilder, TransitionError, TransitionLog,
        TransitionObserver, TransitionRule, Value,
    };
}
