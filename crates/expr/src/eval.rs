use crate::error::{Error, Result};
use crate::parser::{BinaryOp, Expr, LogicalOp, UnaryOp, parse_expression};
use crate::scope::Scope;
use crate::value::{Value, array_index};
use serde_json::Value as JsonValue;
use std::cmp::Ordering;

/// Parses and evaluates `src` against `scope`.
pub fn evaluate(src: &str, scope: &dyn Scope) -> Result<Value> {
    let expr = parse_expression(src)?;
    eval_expr(&expr, scope)
}

pub fn eval_expr(expr: &Expr, scope: &dyn Scope) -> Result<Value> {
    Evaluator { scope }.eval(expr)
}

/// Result of resolving a name or property path: borrowed from the scope when
/// possible, so only the final value of a chain like `a.b[0].c` is cloned.
enum Resolved<'a> {
    Borrowed(&'a JsonValue),
    Owned(Value),
}

impl Resolved<'_> {
    fn into_value(self) -> Value {
        match self {
            Resolved::Borrowed(json) => Value::from(json),
            Resolved::Owned(value) => value,
        }
    }
}

enum ArrayMember<'a> {
    Length(usize),
    Element(&'a JsonValue),
    Missing,
}

struct Evaluator<'s> {
    scope: &'s dyn Scope,
}

impl<'s> Evaluator<'s> {
    fn eval(&self, expr: &Expr) -> Result<Value> {
        match expr {
            Expr::Literal(value) => Ok(value.clone()),
            Expr::Array(items) => items
                .iter()
                .map(|item| self.eval(item).map(Value::into_json))
                .collect::<Result<Vec<_>>>()
                .map(Value::Array),
            Expr::Ident(_) | Expr::Member { .. } | Expr::Index { .. } => {
                Ok(self.resolve(expr)?.into_value())
            }
            Expr::Unary { op, operand } => {
                let value = self.eval(operand)?;
                Ok(match op {
                    UnaryOp::Not => Value::Bool(!value.is_truthy()),
                    UnaryOp::Neg => Value::Number(-value.to_number()),
                    UnaryOp::Plus => Value::Number(value.to_number()),
                })
            }
            Expr::Binary { op, lhs, rhs } => {
                let lhs = self.eval(lhs)?;
                let rhs = self.eval(rhs)?;
                Ok(apply_binary(*op, &lhs, &rhs))
            }
            Expr::Logical { op, lhs, rhs } => {
                let lhs = self.eval(lhs)?;
                match (op, lhs.is_truthy()) {
                    (LogicalOp::And, true) | (LogicalOp::Or, false) => self.eval(rhs),
                    _ => Ok(lhs),
                }
            }
            Expr::Conditional {
                test,
                consequent,
                alternate,
            } => {
                if self.eval(test)?.is_truthy() {
                    self.eval(consequent)
                } else {
                    self.eval(alternate)
                }
            }
        }
    }

    fn resolve(&self, expr: &Expr) -> Result<Resolved<'s>> {
        match expr {
            Expr::Ident(name) => self
                .scope
                .lookup(name)
                .map(Resolved::Borrowed)
                .ok_or_else(|| Error::Unbound { name: name.clone() }),
            Expr::Member { object, property } => {
                let base = self.resolve(object)?;
                member(base, &Value::String(property.clone()))
            }
            Expr::Index { object, index } => {
                let base = self.resolve(object)?;
                let key = self.eval(index)?;
                member(base, &key)
            }
            other => Ok(Resolved::Owned(self.eval(other)?)),
        }
    }
}

fn member<'a>(base: Resolved<'a>, key: &Value) -> Result<Resolved<'a>> {
    match base {
        Resolved::Borrowed(json) => Ok(match json {
            JsonValue::Null => return Err(property_of_nothing(key, "null")),
            JsonValue::Object(map) => map
                .get(&key.to_string())
                .map_or(Resolved::Owned(Value::Undefined), Resolved::Borrowed),
            JsonValue::Array(items) => match array_member(items, key) {
                ArrayMember::Length(len) => Resolved::Owned(Value::Number(len as f64)),
                ArrayMember::Element(item) => Resolved::Borrowed(item),
                ArrayMember::Missing => Resolved::Owned(Value::Undefined),
            },
            JsonValue::String(s) => Resolved::Owned(string_member(s, key)),
            JsonValue::Bool(_) | JsonValue::Number(_) => Resolved::Owned(Value::Undefined),
        }),
        Resolved::Owned(value) => Ok(Resolved::Owned(match value {
            Value::Undefined => return Err(property_of_nothing(key, "undefined")),
            Value::Null => return Err(property_of_nothing(key, "null")),
            Value::Object(map) => map
                .get(&key.to_string())
                .map_or(Value::Undefined, Value::from),
            Value::Array(items) => match array_member(&items, key) {
                ArrayMember::Length(len) => Value::Number(len as f64),
                ArrayMember::Element(item) => Value::from(item),
                ArrayMember::Missing => Value::Undefined,
            },
            Value::String(s) => string_member(&s, key),
            Value::Bool(_) | Value::Number(_) => Value::Undefined,
        })),
    }
}

fn property_of_nothing(key: &Value, target: &'static str) -> Error {
    Error::PropertyOfNothing {
        property: key.to_string(),
        target,
    }
}

fn array_member<'a>(items: &'a [JsonValue], key: &Value) -> ArrayMember<'a> {
    if matches!(key, Value::String(s) if s == "length") {
        return ArrayMember::Length(items.len());
    }
    array_index(key)
        .and_then(|i| items.get(i))
        .map_or(ArrayMember::Missing, ArrayMember::Element)
}

fn string_member(s: &str, key: &Value) -> Value {
    if matches!(key, Value::String(k) if k == "length") {
        return Value::Number(s.chars().count() as f64);
    }
    array_index(key)
        .and_then(|i| s.chars().nth(i))
        .map_or(Value::Undefined, |c| Value::String(c.to_string()))
}

pub(crate) fn apply_binary(op: BinaryOp, lhs: &Value, rhs: &Value) -> Value {
    match op {
        BinaryOp::Add => lhs.add(rhs),
        BinaryOp::Sub => Value::Number(lhs.to_number() - rhs.to_number()),
        BinaryOp::Mul => Value::Number(lhs.to_number() * rhs.to_number()),
        BinaryOp::Div => Value::Number(lhs.to_number() / rhs.to_number()),
        BinaryOp::Rem => Value::Number(lhs.to_number() % rhs.to_number()),
        BinaryOp::Eq => Value::Bool(lhs.loose_equals(rhs)),
        BinaryOp::NotEq => Value::Bool(!lhs.loose_equals(rhs)),
        BinaryOp::StrictEq => Value::Bool(lhs.strict_equals(rhs)),
        BinaryOp::StrictNotEq => Value::Bool(!lhs.strict_equals(rhs)),
        BinaryOp::Lt => Value::Bool(lhs.compare(rhs) == Some(Ordering::Less)),
        BinaryOp::Le => Value::Bool(matches!(
            lhs.compare(rhs),
            Some(Ordering::Less | Ordering::Equal)
        )),
        BinaryOp::Gt => Value::Bool(lhs.compare(rhs) == Some(Ordering::Greater)),
        BinaryOp::Ge => Value::Bool(matches!(
            lhs.compare(rhs),
            Some(Ordering::Greater | Ordering::Equal)
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn model() -> JsonValue {
        json!({
            "title": "Test",
            "isTrue": false,
            "ifTrue": "is true",
            "ifFalse": "is false",
            "complex": { "subitem": "success" },
            "list": ["a", "b", "c"],
            "count": 3,
            "nothing": null,
        })
    }

    fn eval(src: &str) -> Value {
        evaluate(src, &model()).unwrap_or_else(|err| panic!("`{src}` failed: {err}"))
    }

    #[test]
    fn reads_values_from_the_model() {
        let model = model();
        for key in ["title", "isTrue", "ifTrue", "ifFalse", "complex", "list"] {
            assert_eq!(eval(key), Value::from(&model[key]), "key `{key}`");
        }
        assert_eq!(eval("complex.subitem"), Value::from("success"));
        assert_eq!(eval("complex['subitem']"), Value::from("success"));
    }

    #[test]
    fn executes_statements() {
        assert_eq!(eval("1+2"), Value::Number(3.0));
        assert_eq!(eval("isTrue ? ifTrue : ifFalse"), Value::from("is false"));
        assert_eq!(eval("complex.subitem + 'test'"), Value::from("successtest"));
        assert_eq!(eval("(count - 1) * 2 % 3"), Value::Number(1.0));
        assert_eq!(eval("-count + +'2'"), Value::Number(-1.0));
    }

    #[test]
    fn logical_operators_short_circuit_and_return_operands() {
        assert_eq!(eval("isTrue && missing"), Value::Bool(false));
        assert_eq!(eval("title || missing"), Value::from("Test"));
        assert_eq!(eval("nothing || 'fallback'"), Value::from("fallback"));
        assert_eq!(eval("!(!true && isTrue)"), Value::Bool(true));
    }

    #[test]
    fn comparisons() {
        assert_eq!(eval("count > 2 && count <= 3"), Value::Bool(true));
        assert_eq!(eval("count == '3'"), Value::Bool(true));
        assert_eq!(eval("count === '3'"), Value::Bool(false));
        assert_eq!(eval("nothing == undefined"), Value::Bool(true));
        assert_eq!(eval("title != 'Test'"), Value::Bool(false));
    }

    #[test]
    fn computed_index_and_length() {
        assert_eq!(eval("list[count - 1]"), Value::from("c"));
        assert_eq!(eval("list.length"), Value::Number(3.0));
        assert_eq!(eval("title.length"), Value::Number(4.0));
        assert_eq!(eval("title[0]"), Value::from("T"));
        assert_eq!(eval("list[10]"), Value::Undefined);
        assert_eq!(eval("complex.missing"), Value::Undefined);
        assert_eq!(eval("[1, 'a'][1]"), Value::from("a"));
    }

    #[test]
    fn unbound_names_are_errors() {
        assert_eq!(
            evaluate("missing", &model()),
            Err(Error::Unbound {
                name: "missing".to_string()
            })
        );
    }

    #[test]
    fn property_of_nothing_is_an_error() {
        assert!(matches!(
            evaluate("complex.missing.deeper", &model()),
            Err(Error::PropertyOfNothing { target: "undefined", .. })
        ));
        assert!(matches!(
            evaluate("nothing.x", &model()),
            Err(Error::PropertyOfNothing { target: "null", .. })
        ));
    }

    #[test]
    fn division_follows_float_semantics() {
        assert_eq!(eval("1 / 0"), Value::Number(f64::INFINITY));
        assert_eq!(eval("7 % -3"), Value::Number(1.0));
        assert!(matches!(eval("'a' * 2"), Value::Number(n) if n.is_nan()));
    }
}
