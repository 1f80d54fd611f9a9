//! Parameter schemas declared by plugins.

use crate::argument::{ArgType, Argument};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Whether a parameter is consumed or produced by a plugin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Supplied to the plugin.
    Input,
    /// Returned by the plugin.
    Output,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Input => write!(f, "input"),
            Direction::Output => write!(f, "output"),
        }
    }
}

/// The type a schema expects for a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    /// Anything, including null.
    Any,
    /// `true` or `false`.
    Boolean,
    /// A whole number.
    Integer,
    /// Any number, integral or not.
    Number,
    /// Text.
    String,
    /// An array.
    List,
    /// A keyed structure.
    Object,
}

impl ParamType {
    /// Returns `true` if an argument with the given value may be passed
    /// where this type is expected.
    ///
    /// This is the only place coercion happens: integers are numbers, and
    /// strings are accepted for scalar types when they parse as one.
    /// Strings naming non-finite floats (`"NaN"`, `"inf"`) are not numbers.
    pub fn admits(self, argument: &Argument) -> bool {
        self.admits_value(argument.value())
    }

    /// Same as [`admits`](Self::admits), for a value not held in an
    /// [`Argument`].
    pub fn admits_value(self, value: &Value) -> bool {
        match (self, ArgType::of(value)) {
            (ParamType::Any, _) => true,
            (ParamType::Boolean, ArgType::Boolean)
            | (ParamType::Integer, ArgType::Integer)
            | (ParamType::Number, ArgType::Integer | ArgType::Float)
            | (ParamType::String, ArgType::String)
            | (ParamType::List, ArgType::List)
            | (ParamType::Object, ArgType::Object) => true,
            (ParamType::Boolean | ParamType::Integer | ParamType::Number, ArgType::String) => {
                let text = value.as_str().unwrap_or_default().trim();
                match self {
                    ParamType::Boolean => text.parse::<bool>().is_ok(),
                    ParamType::Integer => text.parse::<i64>().is_ok(),
                    _ => text.parse::<f64>().is_ok_and(f64::is_finite),
                }
            }
            _ => false,
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ParamType::Any => "any",
            ParamType::Boolean => "boolean",
            ParamType::Integer => "integer",
            ParamType::Number => "number",
            ParamType::String => "string",
            ParamType::List => "list",
            ParamType::Object => "object",
        };
        f.write_str(name)
    }
}

/// One declared parameter of a plugin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    /// Argument name the parameter binds to.
    pub name: String,
    /// Expected type.
    #[serde(rename = "type")]
    pub ty: ParamType,
    /// Input or output.
    pub direction: Direction,
    /// Whether validation fails when the argument is absent.
    #[serde(default = "default_required")]
    pub required: bool,
}

fn default_required() -> bool {
    true
}

/// The parameter list a plugin declares.
///
/// # Examples
///
/// ```
/// use shirube_core::{Direction, ParamType, Schema};
///
/// let schema = Schema::new()
///     .input("value", ParamType::Number)
///     .input("threshold", ParamType::Number)
///     .optional_input("inclusive", ParamType::Boolean)
///     .output("result", ParamType::Boolean);
///
/// assert_eq!(schema.parameters(Direction::Input).count(), 3);
/// assert!(schema.get("threshold", Direction::Input).is_some());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    parameters: Vec<Parameter>,
}

impl Schema {
    /// Creates an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a required input parameter.
    pub fn input(self, name: impl Into<String>, ty: ParamType) -> Self {
        self.with(name, ty, Direction::Input, true)
    }

    /// Adds an optional input parameter.
    pub fn optional_input(self, name: impl Into<String>, ty: ParamType) -> Self {
        self.with(name, ty, Direction::Input, false)
    }

    /// Adds an output parameter.
    pub fn output(self, name: impl Into<String>, ty: ParamType) -> Self {
        self.with(name, ty, Direction::Output, true)
    }

    fn with(
        mut self,
        name: impl Into<String>,
        ty: ParamType,
        direction: Direction,
        required: bool,
    ) -> Self {
        self.parameters.push(Parameter {
            name: name.into(),
            ty,
            direction,
            required,
        });
        self
    }

    /// Looks up a parameter by name and direction.
    pub fn get(&self, name: &str, direction: Direction) -> Option<&Parameter> {
        self.parameters
            .iter()
            .find(|p| p.direction == direction && p.name == name)
    }

    /// Iterates over the parameters of one direction, in declaration order.
    pub fn parameters(&self, direction: Direction) -> impl Iterator<Item = &Parameter> {
        self.parameters
            .iter()
            .filter(move |p| p.direction == direction)
    }

    /// Returns `true` if no parameters are declared.
    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_exact_matches_are_admitted() {
        assert!(ParamType::Integer.admits(&Argument::new(json!(3))));
        assert!(ParamType::Number.admits(&Argument::new(json!(3.5))));
        assert!(ParamType::String.admits(&Argument::new(json!("x"))));
        assert!(ParamType::List.admits(&Argument::new(json!([1, 2]))));
        assert!(ParamType::Object.admits(&Argument::new(json!({"a": 1}))));
        assert!(ParamType::Any.admits(&Argument::new(json!(null))));
    }

    #[test]
    fn test_integer_widens_to_number_but_not_back() {
        assert!(ParamType::Number.admits(&Argument::new(json!(7))));
        assert!(!ParamType::Integer.admits(&Argument::new(json!(7.0))));
    }

    #[test]
    fn test_numeric_strings_are_coerced() {
        assert!(ParamType::Integer.admits(&Argument::new(json!("42"))));
        assert!(ParamType::Number.admits(&Argument::new(json!(" 4.2 "))));
        assert!(ParamType::Boolean.admits(&Argument::new(json!("true"))));
        assert!(!ParamType::Integer.admits(&Argument::new(json!("forty"))));
        assert!(!ParamType::String.admits(&Argument::new(json!(42))));
    }

    #[test]
    fn test_non_finite_strings_are_not_numbers() {
        for text in ["NaN", "inf", "-infinity", "1e400"] {
            assert!(!ParamType::Number.admits_value(&json!(text)), "{}", text);
        }
        assert!(ParamType::Number.admits_value(&json!("1e300")));
        assert!(ParamType::Any.admits_value(&json!("NaN")));
    }

    #[test]
    fn test_schema_lookup_respects_direction() {
        let schema = Schema::new()
            .input("value", ParamType::Number)
            .output("value", ParamType::String);

        assert_eq!(
            schema.get("value", Direction::Input).map(|p| p.ty),
            Some(ParamType::Number)
        );
        assert_eq!(
            schema.get("value", Direction::Output).map(|p| p.ty),
            Some(ParamType::String)
        );
        assert_eq!(schema.parameters(Direction::Output).count(), 1);
    }

    #[test]
    fn test_parameter_required_defaults_to_true() {
        let parameter: Parameter =
            serde_json::from_value(json!({"name": "n", "type": "integer", "direction": "input"}))
                .expect("valid parameter");
        assert!(parameter.required);
        assert_eq!(parameter.ty, ParamType::Integer);
    }
}
