//! Runtime values of the expression language.
//!
//! Scalars are native; arrays and objects keep their `serde_json` payload so
//! that model data flows through member access without being rebuilt.
//! Conversions (truthiness, string and number coercion, loose equality)
//! follow the scripting semantics template authors expect from `{{ }}`.

use serde_json::{Map, Number, Value as JsonValue};
use std::cmp::Ordering;
use std::fmt;

#[derive(Clone, Debug, Default, PartialEq)]
pub enum Value {
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<JsonValue>),
    Object(Map<String, JsonValue>),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }

    pub fn is_nullish(&self) -> bool {
        matches!(self, Value::Undefined | Value::Null)
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Undefined | Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::String(s) => !s.is_empty(),
            Value::Array(_) | Value::Object(_) => true,
        }
    }

    pub fn to_number(&self) -> f64 {
        match self {
            Value::Undefined => f64::NAN,
            Value::Null => 0.0,
            Value::Bool(b) => f64::from(u8::from(*b)),
            Value::Number(n) => *n,
            Value::String(s) => string_to_number(s),
            Value::Array(_) => string_to_number(&self.to_string()),
            Value::Object(_) => f64::NAN,
        }
    }

    /// String form used when splicing into surrounding text: `undefined` becomes empty.
    pub fn to_interpolated_string(&self) -> String {
        match self {
            Value::Undefined => String::new(),
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }

    /// Number of iterations a `for` loop performs over this value.
    pub fn length(&self) -> Option<usize> {
        match self {
            Value::Array(items) => Some(items.len()),
            Value::String(s) => Some(s.chars().count()),
            _ => None,
        }
    }

    /// Enumerable keys in their natural order: object keys in insertion order,
    /// array and string indices as strings.
    pub fn keys(&self) -> Vec<String> {
        match self {
            Value::Object(map) => map.keys().cloned().collect(),
            Value::Array(items) => (0..items.len()).map(|i| i.to_string()).collect(),
            Value::String(s) => (0..s.chars().count()).map(|i| i.to_string()).collect(),
            _ => Vec::new(),
        }
    }

    pub fn into_json(self) -> JsonValue {
        match self {
            Value::Undefined | Value::Null => JsonValue::Null,
            Value::Bool(b) => JsonValue::Bool(b),
            Value::Number(n) => number_to_json(n),
            Value::String(s) => JsonValue::String(s),
            Value::Array(items) => JsonValue::Array(items),
            Value::Object(map) => JsonValue::Object(map),
        }
    }

    fn is_primitive(&self) -> bool {
        !matches!(self, Value::Array(_) | Value::Object(_))
    }

    /// Arrays and objects collapse to their string form; primitives are unchanged.
    fn to_primitive(&self) -> Value {
        if self.is_primitive() {
            self.clone()
        } else {
            Value::String(self.to_string())
        }
    }

    pub fn strict_equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a == b,
            _ => self == other,
        }
    }

    pub fn loose_equals(&self, other: &Value) -> bool {
        match (self, other) {
            (a, b) if a.is_nullish() || b.is_nullish() => a.is_nullish() && b.is_nullish(),
            (Value::Number(_), Value::String(_)) | (Value::String(_), Value::Number(_)) => {
                self.to_number() == other.to_number()
            }
            (Value::Bool(_), _) => Value::Number(self.to_number()).loose_equals(other),
            (_, Value::Bool(_)) => self.loose_equals(&Value::Number(other.to_number())),
            (a, b) if a.is_primitive() != b.is_primitive() => {
                a.to_primitive().loose_equals(&b.to_primitive())
            }
            _ => self.strict_equals(other),
        }
    }

    /// Relational comparison; `None` when the operands are unordered (NaN involved).
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self.to_primitive(), other.to_primitive()) {
            (Value::String(a), Value::String(b)) => Some(a.cmp(&b)),
            (a, b) => a.to_number().partial_cmp(&b.to_number()),
        }
    }

    pub fn add(&self, other: &Value) -> Value {
        let (a, b) = (self.to_primitive(), other.to_primitive());
        if matches!(a, Value::String(_)) || matches!(b, Value::String(_)) {
            Value::String(format!("{a}{b}"))
        } else {
            Value::Number(a.to_number() + b.to_number())
        }
    }
}

impl From<JsonValue> for Value {
    fn from(json: JsonValue) -> Self {
        match json {
            JsonValue::Null => Value::Null,
            JsonValue::Bool(b) => Value::Bool(b),
            JsonValue::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            JsonValue::String(s) => Value::String(s),
            JsonValue::Array(items) => Value::Array(items),
            JsonValue::Object(map) => Value::Object(map),
        }
    }
}

impl From<&JsonValue> for Value {
    fn from(json: &JsonValue) -> Self {
        match json {
            JsonValue::Null => Value::Null,
            JsonValue::Bool(b) => Value::Bool(*b),
            JsonValue::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            JsonValue::String(s) => Value::String(s.clone()),
            JsonValue::Array(items) => Value::Array(items.clone()),
            JsonValue::Object(map) => Value::Object(map.clone()),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => f.write_str("undefined"),
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => f.write_str(&format_number(*n)),
            Value::String(s) => f.write_str(s),
            Value::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i != 0 {
                        f.write_str(",")?;
                    }
                    if !item.is_null() {
                        write!(f, "{}", Value::from(item))?;
                    }
                }
                Ok(())
            }
            Value::Object(_) => f.write_str("[object Object]"),
        }
    }
}

pub(crate) fn number_to_json(n: f64) -> JsonValue {
    const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;
    if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
        // Integral and inside the exact range, so the cast is lossless.
        return JsonValue::from(n as i64);
    }
    Number::from_f64(n).map_or(JsonValue::Null, JsonValue::Number)
}

pub(crate) fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if n == 0.0 {
        return "0".to_string();
    }

    // Shortest round-trip digits, with the value read as 0.DIGITS x 10^point.
    let scientific = format!("{:e}", n.abs());
    let (mantissa, exponent) = scientific.split_once('e').unwrap_or((scientific.as_str(), "0"));
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    let point = exponent.parse::<i32>().unwrap_or(0) + 1;
    let len = digits.len() as i32;

    let mut out = String::new();
    if n < 0.0 {
        out.push('-');
    }
    if len <= point && point <= 21 {
        out.push_str(&digits);
        out.extend(std::iter::repeat_n('0', (point - len) as usize));
    } else if 0 < point && point <= 21 {
        let (int, frac) = digits.split_at(point as usize);
        out.push_str(int);
        out.push('.');
        out.push_str(frac);
    } else if -6 < point && point <= 0 {
        out.push_str("0.");
        out.extend(std::iter::repeat_n('0', (-point) as usize));
        out.push_str(&digits);
    } else {
        let (first, rest) = digits.split_at(1);
        out.push_str(first);
        if !rest.is_empty() {
            out.push('.');
            out.push_str(rest);
        }
        let exp = point - 1;
        out.push('e');
        out.push(if exp < 0 { '-' } else { '+' });
        out.push_str(&exp.abs().to_string());
    }
    out
}

fn string_to_number(s: &str) -> f64 {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    match trimmed {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }
    if let Some(hex) = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        return u64::from_str_radix(hex, 16).map_or(f64::NAN, |v| v as f64);
    }
    let numeric = trimmed
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'e' | b'E' | b'+' | b'-'));
    if !numeric {
        return f64::NAN;
    }
    trimmed.parse().unwrap_or(f64::NAN)
}

/// Canonical array index form of a property key (`0`, `1`, `"2"`), if any.
pub(crate) fn array_index(key: &Value) -> Option<usize> {
    match key {
        Value::Number(n) if n.fract() == 0.0 && *n >= 0.0 && *n < usize::MAX as f64 => {
            Some(*n as usize)
        }
        Value::String(s) => {
            let canonical = !s.is_empty()
                && s.bytes().all(|b| b.is_ascii_digit())
                && (s == "0" || !s.starts_with('0'));
            if canonical { s.parse().ok() } else { None }
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn truthiness_matches_template_expectations() {
        for falsy in [
            Value::Undefined,
            Value::Null,
            Value::Bool(false),
            Value::Number(0.0),
            Value::Number(f64::NAN),
            Value::from(""),
        ] {
            assert!(!falsy.is_truthy(), "{falsy:?} should be falsy");
        }
        for truthy in [
            Value::from("0"),
            Value::from("false"),
            Value::Number(-1.0),
            Value::from(json!([])),
            Value::from(json!({})),
        ] {
            assert!(truthy.is_truthy(), "{truthy:?} should be truthy");
        }
    }

    #[test]
    fn numbers_print_without_trailing_fraction() {
        assert_eq!(Value::Number(3.0).to_string(), "3");
        assert_eq!(Value::Number(-0.0).to_string(), "0");
        assert_eq!(Value::Number(2.5).to_string(), "2.5");
        assert_eq!(Value::Number(0.1 + 0.2).to_string(), "0.30000000000000004");
        assert_eq!(Value::Number(1.0 / 0.0).to_string(), "Infinity");
    }

    #[test]
    fn very_large_and_small_numbers_use_exponents() {
        let cases = [
            (1e21, "1e+21"),
            (-1.5e22, "-1.5e+22"),
            (1e20, "100000000000000000000"),
            (123456.789, "123456.789"),
            (0.000001, "0.000001"),
            (1e-7, "1e-7"),
            (-2.5e-9, "-2.5e-9"),
        ];
        for (n, expected) in cases {
            assert_eq!(Value::Number(n).to_string(), expected, "formatting {n:?}");
        }
    }

    #[test]
    fn arrays_and_objects_stringify() {
        assert_eq!(Value::from(json!([1, "a", null, [2, 3]])).to_string(), "1,a,,2,3");
        assert_eq!(Value::from(json!({"a": 1})).to_string(), "[object Object]");
        assert_eq!(Value::Undefined.to_string(), "undefined");
        assert_eq!(Value::Undefined.to_interpolated_string(), "");
    }

    #[test]
    fn string_coercion_to_number() {
        assert_eq!(Value::from(" 42 ").to_number(), 42.0);
        assert_eq!(Value::from("").to_number(), 0.0);
        assert_eq!(Value::from("0x10").to_number(), 16.0);
        assert!(Value::from("inf").to_number().is_nan());
        assert!(Value::from("12px").to_number().is_nan());
        assert_eq!(Value::from(json!([7])).to_number(), 7.0);
    }

    #[test]
    fn addition_concatenates_when_either_side_is_text() {
        assert_eq!(Value::Number(1.0).add(&Value::Number(2.0)), Value::Number(3.0));
        assert_eq!(Value::from("a").add(&Value::Number(1.0)), Value::from("a1"));
        assert_eq!(Value::Bool(true).add(&Value::Number(1.0)), Value::Number(2.0));
        assert_eq!(
            Value::from(json!([1, 2])).add(&Value::from("x")),
            Value::from("1,2x")
        );
    }

    #[test]
    fn loose_and_strict_equality() {
        assert!(Value::Null.loose_equals(&Value::Undefined));
        assert!(!Value::Null.strict_equals(&Value::Undefined));
        assert!(Value::Number(1.0).loose_equals(&Value::from("1")));
        assert!(Value::Bool(true).loose_equals(&Value::Number(1.0)));
        assert!(!Value::Number(f64::NAN).strict_equals(&Value::Number(f64::NAN)));
        assert!(!Value::Number(0.0).loose_equals(&Value::Null));
    }

    #[test]
    fn comparison_orders_strings_lexically_and_numbers_numerically() {
        assert_eq!(Value::from("10").compare(&Value::from("9")), Some(Ordering::Less));
        assert_eq!(Value::Number(10.0).compare(&Value::from("9")), Some(Ordering::Greater));
        assert_eq!(Value::Number(f64::NAN).compare(&Value::Number(1.0)), None);
    }

    #[test]
    fn keys_follow_insertion_order() {
        let value = Value::from(json!({"z": 1, "y": 2, "x": 3}));
        assert_eq!(value.keys(), ["z", "y", "x"]);
        assert_eq!(Value::from(json!(["a", "b"])).keys(), ["0", "1"]);
        assert!(Value::Number(3.0).keys().is_empty());
    }

    #[test]
    fn integral_numbers_become_json_integers() {
        assert_eq!(Value::Number(3.0).into_json(), json!(3));
        assert_eq!(Value::Number(0.5).into_json(), json!(0.5));
        assert_eq!(Value::Number(f64::NAN).into_json(), JsonValue::Null);
        assert_eq!(Value::Undefined.into_json(), JsonValue::Null);
    }

    #[test]
    fn array_index_accepts_canonical_forms_only() {
        assert_eq!(array_index(&Value::Number(2.0)), Some(2));
        assert_eq!(array_index(&Value::from("2")), Some(2));
        assert_eq!(array_index(&Value::from("02")), None);
        assert_eq!(array_index(&Value::Number(1.5)), None);
        assert_eq!(array_index(&Value::from("length")), None);
    }
}
