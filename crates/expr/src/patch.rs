//! Model-patch statements: `target op expr; ...`.
//!
//! The only way template content can change the model. Targets are names
//! with optional `.name` / `[expr]` segments; operators are `= += -= *= /=`.

use crate::error::{Error, Result};
use crate::eval::{apply_binary, eval_expr};
use crate::parser::{Assignment, Expr, parse_statements};
use crate::scope::ScopeMut;
use crate::value::{Value, array_index};
use serde_json::Value as JsonValue;

/// Parses `src` and applies each statement to `scope` in order.
///
/// Statements are applied one at a time, so a later statement observes the
/// effect of an earlier one. On error, statements already applied stay applied.
pub fn apply_statements<S: ScopeMut>(src: &str, scope: &mut S) -> Result<usize> {
    let statements = parse_statements(src)?;
    for statement in &statements {
        apply(statement, scope)?;
    }
    Ok(statements.len())
}

fn apply<S: ScopeMut>(statement: &Assignment, scope: &mut S) -> Result<()> {
    let (root, path) = target_path(&statement.target, &*scope)?;
    let rhs = eval_expr(&statement.value, &*scope)?;
    let value = match statement.op.binary() {
        None => rhs,
        Some(op) => {
            let current = eval_expr(&statement.target, &*scope)?;
            apply_binary(op, &current, &rhs)
        }
    };
    let value = value.into_json();

    let Some((last, parents)) = path.split_last() else {
        log::trace!(target: "expr.patch", "bind {root}");
        scope.assign(&root, value);
        return Ok(());
    };

    let mut slot = scope
        .lookup_mut(&root)
        .ok_or_else(|| Error::Unbound { name: root.clone() })?;
    for key in parents {
        slot = child_mut(slot, key)?;
    }
    set_member(slot, last, value)
}

fn target_path<S: ScopeMut>(target: &Expr, scope: &S) -> Result<(String, Vec<Value>)> {
    match target {
        Expr::Ident(name) => Ok((name.clone(), Vec::new())),
        Expr::Member { object, property } => {
            let (root, mut path) = target_path(object, scope)?;
            path.push(Value::String(property.clone()));
            Ok((root, path))
        }
        Expr::Index { object, index } => {
            let (root, mut path) = target_path(object, scope)?;
            path.push(eval_expr(index, scope)?);
            Ok((root, path))
        }
        _ => Err(Error::InvalidAssignment {
            message: "assignment target must be a name or property".to_string(),
        }),
    }
}

fn child_mut<'a>(slot: &'a mut JsonValue, key: &Value) -> Result<&'a mut JsonValue> {
    let found = match slot {
        JsonValue::Object(map) => map.get_mut(&key.to_string()),
        JsonValue::Array(items) => array_index(key).and_then(|i| items.get_mut(i)),
        _ => None,
    };
    found.ok_or_else(|| Error::InvalidAssignment {
        message: format!("cannot assign through missing property `{key}`"),
    })
}

fn set_member(slot: &mut JsonValue, key: &Value, value: JsonValue) -> Result<()> {
    match slot {
        JsonValue::Object(map) => {
            map.insert(key.to_string(), value);
            Ok(())
        }
        JsonValue::Array(items) => match array_index(key) {
            Some(i) if i < items.len() => {
                items[i] = value;
                Ok(())
            }
            Some(i) if i == items.len() => {
                items.push(value);
                Ok(())
            }
            _ => Err(Error::InvalidAssignment {
                message: format!("`{key}` is not a writable index of an array of {}", items.len()),
            }),
        },
        other => Err(Error::InvalidAssignment {
            message: format!(
                "cannot set property `{key}` on {}",
                Value::from(&*other).type_name()
            ),
        }),
    }
}
