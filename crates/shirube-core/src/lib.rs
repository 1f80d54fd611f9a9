//! Core traits and types for the shirube transition engine.
//!
//! This crate holds the vocabulary shared by the engine and by plugin
//! authors. It contains no evaluation logic; plugin crates should depend
//! on it alone.
//!
//! # Core Types
//!
//! - [`ArgumentBag`] - Typed, named arguments with schema validation
//! - [`Schema`] - Parameters a plugin declares
//! - [`TransformPlugin`] / [`ConditionPlugin`] - The plugin seams
//! - [`TransitionObserver`] - Receives fired / not-fired notifications
//! - [`StepName`] - Origin and target step identifiers

mod argument;
mod error;
mod observer;
mod plugin;
mod schema;
mod step;

pub use argument::{ArgType, Argument, ArgumentBag};
pub use error::{ArgumentError, PluginError, RegistryError, TransitionError};
pub use observer::TransitionObserver;
pub use plugin::{ConditionPlugin, FnCondition, FnTransform, PluginKind, TransformPlugin};
pub use schema::{Direction, ParamType, Parameter, Schema};
pub use serde_json::Value;
pub use step::StepName;
