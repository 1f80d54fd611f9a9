//! Built-in transforms and conditions.
//!
//! Installed by [`PluginRegistry::with_builtins`] and
//! [`TransitionEngineBuilder::with_builtins`](crate::TransitionEngineBuilder::with_builtins).
//!
//! | kind      | action         | arguments                                           |
//! |-----------|----------------|-----------------------------------------------------|
//! | transform | `add`          | `num`                                               |
//! | transform | `subtract`     | `subtractor`                                        |
//! | transform | `multiply`     | `multiplier`                                        |
//! | transform | `divide`       | `divisor`                                           |
//! | transform | `linear_scale` | `min_value`, `max_value`, `low_scale`, `high_scale` |
//! | transform | `json_select`  | `path` (dot separated)                              |
//! | transform | `list_select`  | `index` (negative counts from the end)              |
//! | transform | `length`       |                                                     |
//! | condition | `equals`       | `expected`                                          |
//! | condition | `greater_than` | `threshold`                                         |
//! | condition | `less_than`    | `threshold`                                         |
//! | condition | `in_range`     | `min`, `max` (inclusive)                            |
//! | condition | `contains`     | `item`                                              |
//! | condition | `regex_match`  | `pattern`                                           |

use crate::registry::PluginRegistry;
use regex::Regex;
use shirube_core::{
    ArgType, ArgumentBag, ConditionPlugin, ParamType, PluginError, Schema, TransformPlugin, Value,
};
use tracing::debug;

/// Registers every built-in plugin whose name is still free.
pub fn install(registry: &mut PluginRegistry) {
    let results = [
        registry.register_transform("add", Add),
        registry.register_transform("subtract", Subtract),
        registry.register_transform("multiply", Multiply),
        registry.register_transform("divide", Divide),
        registry.register_transform("linear_scale", LinearScale),
        registry.register_transform("json_select", JsonSelect),
        registry.register_transform("list_select", ListSelect),
        registry.register_transform("length", Length),
        registry.register_condition("equals", Equals),
        registry.register_condition("greater_than", GreaterThan),
        registry.register_condition("less_than", LessThan),
        registry.register_condition("in_range", InRange),
        registry.register_condition("contains", Contains),
        registry.register_condition("regex_match", RegexMatch),
    ];
    for result in results {
        if let Err(e) = result {
            debug!("Built-in skipped: {}", e);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Num {
    Int(i64),
    Float(f64),
}

impl Num {
    fn as_f64(self) -> f64 {
        match self {
            Num::Int(i) => i as f64,
            Num::Float(f) => f,
        }
    }

    fn into_value(self) -> Result<Value, PluginError> {
        match self {
            Num::Int(i) => Ok(Value::from(i)),
            Num::Float(f) => finite(f),
        }
    }
}

/// Converts a float result, refusing NaN and infinities.
fn finite(f: f64) -> Result<Value, PluginError> {
    serde_json::Number::from_f64(f)
        .map(Value::Number)
        .ok_or_else(|| PluginError::failed("non-finite result"))
}

fn number(value: &Value) -> Option<Num> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .map(Num::Int)
            .or_else(|| n.as_f64().map(Num::Float)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .map(Num::Int)
                .ok()
                .or_else(|| s.parse::<f64>().ok().filter(|f| f.is_finite()).map(Num::Float))
        }
        _ => None,
    }
}

fn input_number(value: &Value) -> Result<Num, PluginError> {
    number(value).ok_or_else(|| invalid_input("number", value))
}

fn arg_number(args: &ArgumentBag, name: &str) -> Result<Num, PluginError> {
    let value = args.get(name)?;
    number(value).ok_or_else(|| {
        PluginError::from(shirube_core::ArgumentError::TypeMismatch {
            name: name.to_string(),
            expected: ParamType::Number,
            found: ArgType::of(value),
        })
    })
}

fn invalid_input(expected: &str, found: &Value) -> PluginError {
    PluginError::InvalidInput {
        expected: expected.to_string(),
        found: ArgType::of(found).to_string(),
    }
}

fn arithmetic(
    value: &Value,
    operand: Num,
    int_op: fn(i64, i64) -> Option<i64>,
    float_op: fn(f64, f64) -> f64,
) -> Result<Value, PluginError> {
    let lhs = input_number(value)?;
    let result = match (lhs, operand) {
        (Num::Int(a), Num::Int(b)) => int_op(a, b)
            .map(Num::Int)
            .unwrap_or_else(|| Num::Float(float_op(a as f64, b as f64))),
        (a, b) => Num::Float(float_op(a.as_f64(), b.as_f64())),
    };
    result.into_value()
}

fn numeric_value_schema() -> Schema {
    Schema::new().input("value", ParamType::Number)
}

/// `value + num`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Add;

impl TransformPlugin for Add {
    fn schema(&self) -> Schema {
        numeric_value_schema().input("num", ParamType::Number)
    }

    fn apply(&self, args: &ArgumentBag, value: Value) -> Result<Value, PluginError> {
        arithmetic(&value, arg_number(args, "num")?, i64::checked_add, |a, b| a + b)
    }
}

/// `value - subtractor`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Subtract;

impl TransformPlugin for Subtract {
    fn schema(&self) -> Schema {
        numeric_value_schema().input("subtractor", ParamType::Number)
    }

    fn apply(&self, args: &ArgumentBag, value: Value) -> Result<Value, PluginError> {
        arithmetic(&value, arg_number(args, "subtractor")?, i64::checked_sub, |a, b| a - b)
    }
}

/// `value * multiplier`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Multiply;

impl TransformPlugin for Multiply {
    fn schema(&self) -> Schema {
        numeric_value_schema().input("multiplier", ParamType::Number)
    }

    fn apply(&self, args: &ArgumentBag, value: Value) -> Result<Value, PluginError> {
        arithmetic(&value, arg_number(args, "multiplier")?, i64::checked_mul, |a, b| a * b)
    }
}

/// `value / divisor`, always producing a float.
#[derive(Debug, Clone, Copy, Default)]
pub struct Divide;

impl TransformPlugin for Divide {
    fn schema(&self) -> Schema {
        numeric_value_schema().input("divisor", ParamType::Number)
    }

    fn apply(&self, args: &ArgumentBag, value: Value) -> Result<Value, PluginError> {
        let divisor = arg_number(args, "divisor")?.as_f64();
        if divisor == 0.0 {
            return Err(PluginError::failed("division by zero"));
        }
        finite(input_number(&value)?.as_f64() / divisor)
    }
}

/// Maps `value` from `[min_value, max_value]` onto `[low_scale, high_scale]`,
/// clamping at both ends.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearScale;

impl TransformPlugin for LinearScale {
    fn schema(&self) -> Schema {
        numeric_value_schema()
            .input("min_value", ParamType::Number)
            .input("max_value", ParamType::Number)
            .input("low_scale", ParamType::Number)
            .input("high_scale", ParamType::Number)
    }

    fn apply(&self, args: &ArgumentBag, value: Value) -> Result<Value, PluginError> {
        let min = args.get_f64("min_value")?;
        let max = args.get_f64("max_value")?;
        let low = args.get_f64("low_scale")?;
        let high = args.get_f64("high_scale")?;
        if max <= min {
            return Err(PluginError::failed("max_value must be greater than min_value"));
        }
        let fraction = ((input_number(&value)?.as_f64() - min) / (max - min)).clamp(0.0, 1.0);
        finite(low + fraction * (high - low))
    }
}

/// Walks a dot-separated path through objects and arrays.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSelect;

impl TransformPlugin for JsonSelect {
    fn schema(&self) -> Schema {
        Schema::new().input("path", ParamType::String)
    }

    fn apply(&self, args: &ArgumentBag, value: Value) -> Result<Value, PluginError> {
        let path = args.get_str("path")?;
        let mut working = &value;
        for segment in path.split('.').filter(|s| !s.is_empty()) {
            let next = match working {
                Value::Object(map) => map.get(segment),
                Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
                _ => None,
            };
            working = next.ok_or_else(|| {
                PluginError::failed(format!("path segment '{}' not found in '{}'", segment, path))
            })?;
        }
        Ok(working.clone())
    }
}

/// Picks one element of a list.
#[derive(Debug, Clone, Copy, Default)]
pub struct ListSelect;

impl TransformPlugin for ListSelect {
    fn schema(&self) -> Schema {
        Schema::new()
            .input("value", ParamType::List)
            .input("index", ParamType::Integer)
    }

    fn apply(&self, args: &ArgumentBag, value: Value) -> Result<Value, PluginError> {
        let index = args.get_i64("index")?;
        let mut items = match value {
            Value::Array(items) => items,
            other => return Err(invalid_input("list", &other)),
        };
        let len = items.len() as i64;
        let position = if index < 0 { len + index } else { index };
        if position < 0 || position >= len {
            return Err(PluginError::failed(format!(
                "index {} out of range for list of length {}",
                index, len
            )));
        }
        Ok(items.swap_remove(position as usize))
    }
}

/// Length of a string (in characters), list, or object.
#[derive(Debug, Clone, Copy, Default)]
pub struct Length;

impl TransformPlugin for Length {
    fn apply(&self, _args: &ArgumentBag, value: Value) -> Result<Value, PluginError> {
        let len = match &value {
            Value::String(s) => s.chars().count(),
            Value::Array(items) => items.len(),
            Value::Object(map) => map.len(),
            other => return Err(invalid_input("string, list or object", other)),
        };
        Ok(Value::from(len))
    }
}

fn loosely_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(_), Value::Number(_)) => {
            number(a).map(Num::as_f64) == number(b).map(Num::as_f64)
        }
        _ => a == b,
    }
}

/// Value equals `expected`. Numbers compare by magnitude, so `3 == 3.0`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Equals;

impl ConditionPlugin for Equals {
    fn schema(&self) -> Schema {
        Schema::new().input("expected", ParamType::Any)
    }

    fn check(&self, args: &ArgumentBag, value: &Value) -> Result<bool, PluginError> {
        Ok(loosely_equal(args.get("expected")?, value))
    }
}

/// Value is strictly greater than `threshold`.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreaterThan;

impl ConditionPlugin for GreaterThan {
    fn schema(&self) -> Schema {
        Schema::new().input("threshold", ParamType::Number)
    }

    fn check(&self, args: &ArgumentBag, value: &Value) -> Result<bool, PluginError> {
        Ok(input_number(value)?.as_f64() > args.get_f64("threshold")?)
    }
}

/// Value is strictly less than `threshold`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LessThan;

impl ConditionPlugin for LessThan {
    fn schema(&self) -> Schema {
        Schema::new().input("threshold", ParamType::Number)
    }

    fn check(&self, args: &ArgumentBag, value: &Value) -> Result<bool, PluginError> {
        Ok(input_number(value)?.as_f64() < args.get_f64("threshold")?)
    }
}

/// `min <= value <= max`.
#[derive(Debug, Clone, Copy, Default)]
pub struct InRange;

impl ConditionPlugin for InRange {
    fn schema(&self) -> Schema {
        Schema::new()
            .input("min", ParamType::Number)
            .input("max", ParamType::Number)
    }

    fn check(&self, args: &ArgumentBag, value: &Value) -> Result<bool, PluginError> {
        let n = input_number(value)?.as_f64();
        Ok(args.get_f64("min")? <= n && n <= args.get_f64("max")?)
    }
}

/// Substring for strings, element for lists, key for objects.
#[derive(Debug, Clone, Copy, Default)]
pub struct Contains;

impl ConditionPlugin for Contains {
    fn schema(&self) -> Schema {
        Schema::new().input("item", ParamType::Any)
    }

    fn check(&self, args: &ArgumentBag, value: &Value) -> Result<bool, PluginError> {
        let item = args.get("item")?;
        match value {
            Value::String(s) => Ok(item.as_str().is_some_and(|needle| s.contains(needle))),
            Value::Array(items) => Ok(items.iter().any(|v| loosely_equal(v, item))),
            Value::Object(map) => Ok(item.as_str().is_some_and(|key| map.contains_key(key))),
            other => Err(invalid_input("string, list or object", other)),
        }
    }
}

/// Matches `pattern` against the value. Non-string values are matched
/// against their JSON text.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegexMatch;

impl ConditionPlugin for RegexMatch {
    fn schema(&self) -> Schema {
        Schema::new().input("pattern", ParamType::String)
    }

    fn check(&self, args: &ArgumentBag, value: &Value) -> Result<bool, PluginError> {
        let pattern = args.get_str("pattern")?;
        let regex = Regex::new(pattern)
            .map_err(|e| PluginError::failed(format!("invalid pattern '{}': {}", pattern, e)))?;
        Ok(match value {
            Value::String(s) => regex.is_match(s),
            other => regex.is_match(&other.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use shirube_core::PluginKind;

    fn args<const N: usize>(pairs: [(&str, Value); N]) -> ArgumentBag {
        ArgumentBag::build(pairs)
    }

    #[test]
    fn test_install_registers_everything() {
        let registry = PluginRegistry::with_builtins();
        assert_eq!(
            registry.names(PluginKind::Transform),
            vec![
                "add",
                "divide",
                "json_select",
                "length",
                "linear_scale",
                "list_select",
                "multiply",
                "subtract"
            ]
        );
        assert_eq!(registry.names(PluginKind::Condition).len(), 6);
    }

    #[test]
    fn test_arithmetic_keeps_integers() {
        assert_eq!(Add.apply(&args([("num", json!(1))]), json!(3)), Ok(json!(4)));
        assert_eq!(
            Multiply.apply(&args([("multiplier", json!(2))]), json!(4)),
            Ok(json!(8))
        );
        assert_eq!(
            Subtract.apply(&args([("subtractor", json!(0.5))]), json!(2)),
            Ok(json!(1.5))
        );
        assert_eq!(Divide.apply(&args([("divisor", json!(4))]), json!(2)), Ok(json!(0.5)));
    }

    #[test]
    fn test_divide_by_zero_fails() {
        assert!(Divide
            .apply(&args([("divisor", json!(0))]), json!(1))
            .is_err());
    }

    #[test]
    fn test_non_finite_results_fail_instead_of_becoming_null() {
        assert_eq!(
            Multiply.apply(&args([("multiplier", json!(10))]), json!(1e308)),
            Err(PluginError::failed("non-finite result"))
        );
        assert_eq!(
            Divide.apply(&args([("divisor", json!(1e-308))]), json!(1e308)),
            Err(PluginError::failed("non-finite result"))
        );
        // Integer overflow widens to a finite float.
        assert_eq!(
            Add.apply(&args([("num", json!(1))]), json!(i64::MAX)),
            Ok(json!(i64::MAX as f64 + 1.0))
        );
    }

    #[test]
    fn test_non_finite_string_operands_are_rejected() {
        for text in ["NaN", "inf", "-inf"] {
            assert!(matches!(
                Add.apply(&args([("num", json!(text))]), json!(1)),
                Err(PluginError::Argument(_))
            ));
            assert!(GreaterThan.check(&args([("threshold", json!(0))]), &json!(text)).is_err());
        }
    }

    #[test]
    fn test_overflow_cannot_satisfy_a_null_check() {
        let registry = PluginRegistry::with_builtins();
        let guard = crate::Guard::with_transforms(
            "equals",
            args([("expected", json!(null))]),
            vec![crate::Transform::new("multiply", args([("multiplier", json!(10))]))],
        );
        assert!(matches!(
            guard.evaluate(&registry, &json!(1e308)),
            Err(shirube_core::TransitionError::PluginExecution { ref action, .. })
                if action == "multiply"
        ));

        // A "NaN" operand fails validation, so the transform passes through.
        let nan = crate::Transform::new("add", args([("num", json!("NaN"))]));
        assert_eq!(nan.apply(&registry, json!(1)), Ok(json!(1)));
    }

    #[test]
    fn test_linear_scale_clamps() {
        let scale = args([
            ("min_value", json!(0)),
            ("max_value", json!(10)),
            ("low_scale", json!(0)),
            ("high_scale", json!(100)),
        ]);
        assert_eq!(LinearScale.apply(&scale, json!(5)), Ok(json!(50.0)));
        assert_eq!(LinearScale.apply(&scale, json!(20)), Ok(json!(100.0)));
        assert_eq!(LinearScale.apply(&scale, json!(-3)), Ok(json!(0.0)));
    }

    #[test]
    fn test_json_select() {
        let doc = json!({"result": {"items": [{"score": 7}]}});
        assert_eq!(
            JsonSelect.apply(&args([("path", json!("result.items.0.score"))]), doc.clone()),
            Ok(json!(7))
        );
        assert!(JsonSelect
            .apply(&args([("path", json!("result.missing"))]), doc)
            .is_err());
    }

    #[test]
    fn test_list_select_supports_negative_index() {
        let list = json!(["a", "b", "c"]);
        assert_eq!(
            ListSelect.apply(&args([("index", json!(-1))]), list.clone()),
            Ok(json!("c"))
        );
        assert_eq!(
            ListSelect.apply(&args([("index", json!(1))]), list.clone()),
            Ok(json!("b"))
        );
        assert!(ListSelect.apply(&args([("index", json!(3))]), list).is_err());
    }

    #[test]
    fn test_length() {
        assert_eq!(Length.apply(&ArgumentBag::new(), json!("héllo")), Ok(json!(5)));
        assert_eq!(Length.apply(&ArgumentBag::new(), json!([1, 2])), Ok(json!(2)));
        assert!(Length.apply(&ArgumentBag::new(), json!(3)).is_err());
    }

    #[test]
    fn test_comparisons() {
        let threshold = args([("threshold", json!(10))]);
        assert_eq!(GreaterThan.check(&threshold, &json!(10.5)), Ok(true));
        assert_eq!(GreaterThan.check(&threshold, &json!(10)), Ok(false));
        assert_eq!(LessThan.check(&threshold, &json!("9")), Ok(true));
        assert!(LessThan.check(&threshold, &json!([1])).is_err());

        let range = args([("min", json!(1)), ("max", json!(3))]);
        assert_eq!(InRange.check(&range, &json!(3)), Ok(true));
        assert_eq!(InRange.check(&range, &json!(3.1)), Ok(false));
    }

    #[test]
    fn test_equals_compares_numbers_by_magnitude() {
        assert_eq!(Equals.check(&args([("expected", json!(3))]), &json!(3.0)), Ok(true));
        assert_eq!(
            Equals.check(&args([("expected", json!("3"))]), &json!(3)),
            Ok(false)
        );
    }

    #[test]
    fn test_contains() {
        assert_eq!(Contains.check(&args([("item", json!("ell"))]), &json!("hello")), Ok(true));
        assert_eq!(Contains.check(&args([("item", json!(2))]), &json!([1, 2.0])), Ok(true));
        assert_eq!(Contains.check(&args([("item", json!("k"))]), &json!({"k": 0})), Ok(true));
        assert!(Contains.check(&args([("item", json!(1))]), &json!(1)).is_err());
    }

    #[test]
    fn test_regex_match() {
        let pattern = args([("pattern", json!(r"^v\d+\.\d+$"))]);
        assert_eq!(RegexMatch.check(&pattern, &json!("v1.2")), Ok(true));
        assert_eq!(RegexMatch.check(&pattern, &json!("1.2")), Ok(false));
        assert_eq!(
            RegexMatch.check(&args([("pattern", json!("^4"))]), &json!(42)),
            Ok(true)
        );
        assert!(RegexMatch.check(&args([("pattern", json!("("))]), &json!("x")).is_err());
    }
}
