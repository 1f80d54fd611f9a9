//! Typed, named argument sets attached to guards and transforms.

use crate::error::ArgumentError;
use crate::schema::{Direction, ParamType, Schema};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Type tag inferred from an argument's runtime value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArgType {
    /// JSON null.
    Null,
    /// A boolean.
    Boolean,
    /// A number without a fractional representation.
    Integer,
    /// A floating-point number.
    Float,
    /// A string.
    String,
    /// An array.
    List,
    /// An object.
    Object,
}

impl ArgType {
    /// Infers the tag for a value.
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => ArgType::Null,
            Value::Bool(_) => ArgType::Boolean,
            Value::Number(n) if n.is_i64() || n.is_u64() => ArgType::Integer,
            Value::Number(_) => ArgType::Float,
            Value::String(_) => ArgType::String,
            Value::Array(_) => ArgType::List,
            Value::Object(_) => ArgType::Object,
        }
    }
}

impl fmt::Display for ArgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ArgType::Null => "null",
            ArgType::Boolean => "boolean",
            ArgType::Integer => "integer",
            ArgType::Float => "float",
            ArgType::String => "string",
            ArgType::List => "list",
            ArgType::Object => "object",
        };
        f.write_str(name)
    }
}

/// A value together with the tag inferred when it was stored.
#[derive(Debug, Clone, PartialEq)]
pub struct Argument {
    value: Value,
    ty: ArgType,
}

impl Argument {
    /// Wraps a value, inferring its tag. No coercion is performed.
    pub fn new(value: impl Into<Value>) -> Self {
        let value = value.into();
        let ty = ArgType::of(&value);
        Self { value, ty }
    }

    /// The stored value.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// The inferred tag.
    pub fn ty(&self) -> ArgType {
        self.ty
    }

    /// Consumes the argument, returning the value.
    pub fn into_value(self) -> Value {
        self.value
    }
}

/// Named arguments for a guard or transform.
///
/// Entries keep a deterministic (sorted) order so that equality and
/// serialized documents are stable.
///
/// # Examples
///
/// ```
/// use shirube_core::{ArgType, ArgumentBag, Direction, ParamType, Schema};
/// use serde_json::json;
///
/// let args = ArgumentBag::build([("threshold", json!(10)), ("label", json!("hot"))]);
/// assert_eq!(args.argument("threshold").map(|a| a.ty()), Some(ArgType::Integer));
///
/// let schema = Schema::new().input("threshold", ParamType::Number);
/// assert!(args.validate(&schema, Direction::Input));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArgumentBag {
    entries: BTreeMap<String, Argument>,
}

impl ArgumentBag {
    /// Creates an empty bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a bag from raw name/value pairs. Never fails.
    pub fn build<K, V, I>(raw: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        raw.into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect()
    }

    /// Builds a bag from a JSON object.
    pub fn from_map(map: Map<String, Value>) -> Self {
        map.into_iter().collect()
    }

    /// Returns the value stored under `name`.
    pub fn get(&self, name: &str) -> Result<&Value, ArgumentError> {
        self.entries
            .get(name)
            .map(Argument::value)
            .ok_or_else(|| ArgumentError::Missing {
                name: name.to_string(),
            })
    }

    /// Returns the typed entry stored under `name`.
    pub fn argument(&self, name: &str) -> Option<&Argument> {
        self.entries.get(name)
    }

    /// Replaces (or adds) an entry, re-inferring its tag.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.entries.insert(name.into(), Argument::new(value));
    }

    /// Removes an entry.
    pub fn remove(&mut self, name: &str) -> Option<Argument> {
        self.entries.remove(name)
    }

    /// Returns a copy of this bag with one extra entry.
    pub fn with(&self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        let mut bag = self.clone();
        bag.set(name, value);
        bag
    }

    /// Returns `true` if an entry named `name` exists.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the bag has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over entries in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Argument)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Copies the raw values into a JSON object.
    pub fn to_map(&self) -> Map<String, Value> {
        self.entries
            .iter()
            .map(|(k, v)| (k.clone(), v.value.clone()))
            .collect()
    }

    /// Checks the bag against the parameters `schema` declares for
    /// `direction`, returning the first problem found.
    ///
    /// Entries the schema does not mention are ignored; optional
    /// parameters may be absent.
    pub fn check(&self, schema: &Schema, direction: Direction) -> Result<(), ArgumentError> {
        self.check_bound(schema, direction, None)
    }

    /// Like [`check`](Self::check), with `name` bound to `value` in place
    /// of any entry of that name. The value is borrowed, not copied into
    /// the bag.
    pub fn check_with_value(
        &self,
        schema: &Schema,
        direction: Direction,
        name: &str,
        value: &Value,
    ) -> Result<(), ArgumentError> {
        self.check_bound(schema, direction, Some((name, value)))
    }

    fn check_bound(
        &self,
        schema: &Schema,
        direction: Direction,
        bound: Option<(&str, &Value)>,
    ) -> Result<(), ArgumentError> {
        for parameter in schema.parameters(direction) {
            let value = match bound {
                Some((name, value)) if name == parameter.name => Some(value),
                _ => self.entries.get(&parameter.name).map(Argument::value),
            };
            match value {
                Some(value) if parameter.ty.admits_value(value) => {}
                Some(value) => {
                    return Err(ArgumentError::TypeMismatch {
                        name: parameter.name.clone(),
                        expected: parameter.ty,
                        found: ArgType::of(value),
                    })
                }
                None if parameter.required => {
                    return Err(ArgumentError::Missing {
                        name: parameter.name.clone(),
                    })
                }
                None => {}
            }
        }
        Ok(())
    }

    /// Returns `true` if [`check`](Self::check) passes.
    pub fn validate(&self, schema: &Schema, direction: Direction) -> bool {
        self.check(schema, direction).is_ok()
    }

    /// Reads a number, accepting integers, floats and finite numeric
    /// strings.
    pub fn get_f64(&self, name: &str) -> Result<f64, ArgumentError> {
        let value = self.get(name)?;
        value
            .as_f64()
            .or_else(|| {
                value
                    .as_str()
                    .and_then(|s| s.trim().parse::<f64>().ok())
                    .filter(|f| f.is_finite())
            })
            .ok_or_else(|| self.mismatch(name, ParamType::Number))
    }

    /// Reads an integer, accepting integral strings.
    pub fn get_i64(&self, name: &str) -> Result<i64, ArgumentError> {
        let value = self.get(name)?;
        value
            .as_i64()
            .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
            .ok_or_else(|| self.mismatch(name, ParamType::Integer))
    }

    /// Reads a string.
    pub fn get_str(&self, name: &str) -> Result<&str, ArgumentError> {
        self.get(name)?
            .as_str()
            .ok_or_else(|| self.mismatch(name, ParamType::String))
    }

    /// Reads a boolean, accepting `"true"`/`"false"`.
    pub fn get_bool(&self, name: &str) -> Result<bool, ArgumentError> {
        let value = self.get(name)?;
        value
            .as_bool()
            .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
            .ok_or_else(|| self.mismatch(name, ParamType::Boolean))
    }

    fn mismatch(&self, name: &str, expected: ParamType) -> ArgumentError {
        ArgumentError::TypeMismatch {
            name: name.to_string(),
            expected,
            found: self
                .entries
                .get(name)
                .map(Argument::ty)
                .unwrap_or(ArgType::Null),
        }
    }
}

impl FromIterator<(String, Value)> for ArgumentBag {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k, Argument::new(v)))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_build_infers_tags_without_coercion() {
        let args = ArgumentBag::build([
            ("i", json!(1)),
            ("f", json!(1.5)),
            ("s", json!("1")),
            ("b", json!(true)),
            ("l", json!([1])),
            ("o", json!({"k": 1})),
            ("n", json!(null)),
        ]);

        let tag = |name: &str| args.argument(name).map(Argument::ty);
        assert_eq!(tag("i"), Some(ArgType::Integer));
        assert_eq!(tag("f"), Some(ArgType::Float));
        assert_eq!(tag("s"), Some(ArgType::String));
        assert_eq!(tag("b"), Some(ArgType::Boolean));
        assert_eq!(tag("l"), Some(ArgType::List));
        assert_eq!(tag("o"), Some(ArgType::Object));
        assert_eq!(tag("n"), Some(ArgType::Null));
        assert_eq!(args.get("s"), Ok(&json!("1")));
    }

    #[test]
    fn test_get_missing_argument() {
        let args = ArgumentBag::new();
        assert_eq!(
            args.get("nope"),
            Err(ArgumentError::Missing {
                name: "nope".to_string()
            })
        );
    }

    #[test]
    fn test_set_reinfers_tag() {
        let mut args = ArgumentBag::build([("x", json!(1))]);
        args.set("x", "one");
        assert_eq!(args.argument("x").map(Argument::ty), Some(ArgType::String));
        assert_eq!(args.len(), 1);
    }

    #[test]
    fn test_validate_against_schema() {
        let schema = Schema::new()
            .input("threshold", ParamType::Number)
            .optional_input("label", ParamType::String);

        let ok = ArgumentBag::build([("threshold", json!(3)), ("extra", json!([]))]);
        assert!(ok.validate(&schema, Direction::Input));

        let wrong_type = ArgumentBag::build([("threshold", json!("high"))]);
        assert_eq!(
            wrong_type.check(&schema, Direction::Input),
            Err(ArgumentError::TypeMismatch {
                name: "threshold".to_string(),
                expected: ParamType::Number,
                found: ArgType::String,
            })
        );

        let missing = ArgumentBag::build([("label", json!("x"))]);
        assert!(!missing.validate(&schema, Direction::Input));

        // Output parameters are not consulted for input validation.
        let schema = schema.output("result", ParamType::Boolean);
        assert!(ok.validate(&schema, Direction::Input));
        assert!(!ok.validate(&schema, Direction::Output));
    }

    #[test]
    fn test_typed_accessors() {
        let args = ArgumentBag::build([
            ("n", json!(2)),
            ("text_n", json!("2.5")),
            ("flag", json!("false")),
            ("name", json!("alice")),
        ]);

        assert_eq!(args.get_f64("n"), Ok(2.0));
        assert_eq!(args.get_f64("text_n"), Ok(2.5));
        assert_eq!(args.get_i64("n"), Ok(2));
        assert_eq!(args.get_bool("flag"), Ok(false));
        assert_eq!(args.get_str("name"), Ok("alice"));
        assert!(matches!(
            args.get_i64("name"),
            Err(ArgumentError::TypeMismatch { found: ArgType::String, .. })
        ));

        let nan = ArgumentBag::build([("x", json!("NaN"))]);
        assert!(nan.get_f64("x").is_err());
    }

    #[test]
    fn test_check_with_bound_value() {
        let schema = Schema::new()
            .input("value", ParamType::List)
            .input("index", ParamType::Integer);
        let args = ArgumentBag::build([("index", json!(0)), ("value", json!("ignored"))]);

        assert_eq!(
            args.check_with_value(&schema, Direction::Input, "value", &json!([1, 2])),
            Ok(())
        );
        assert_eq!(
            args.check_with_value(&schema, Direction::Input, "value", &json!(3)),
            Err(ArgumentError::TypeMismatch {
                name: "value".to_string(),
                expected: ParamType::List,
                found: ArgType::Integer,
            })
        );
        assert_eq!(
            ArgumentBag::new().check_with_value(&schema, Direction::Input, "value", &json!([])),
            Err(ArgumentError::Missing {
                name: "index".to_string(),
            })
        );
    }

    #[test]
    fn test_with_does_not_modify_original() {
        let args = ArgumentBag::build([("a", json!(1))]);
        let augmented = args.with("value", json!(5));
        assert!(augmented.contains("value"));
        assert!(!args.contains("value"));
    }

    #[test]
    fn test_structural_equality() {
        let a = ArgumentBag::build([("x", json!(1.5)), ("y", json!("s"))]);
        let b = ArgumentBag::build([("y", json!("s")), ("x", json!(1.5))]);
        assert_eq!(a, b);

        let c = ArgumentBag::build([("x", json!(1)), ("y", json!("s"))]);
        assert_ne!(a, c);
    }
}
