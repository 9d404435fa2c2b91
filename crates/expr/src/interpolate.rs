//! `{{expr}}` / `{{expr#helper}}` marker rewriting.

use crate::error::{Error, Result};
use crate::eval::evaluate;
use crate::helpers::Helpers;
use crate::scope::Scope;
use crate::value::Value;
use memchr::memmem;

/// Delimiters recognised by [`interpolate_with`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Markers {
    pub start: String,
    pub end: String,
    /// Separates the expression from a helper name. Empty disables helpers.
    pub helper: String,
}

impl Markers {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
            ..Self::default()
        }
    }
}

impl Default for Markers {
    fn default() -> Self {
        Self {
            start: "{{".to_string(),
            end: "}}".to_string(),
            helper: "#".to_string(),
        }
    }
}

/// [`interpolate_with`] using the default `{{`, `}}` and `#` markers.
pub fn interpolate(text: &str, scope: &dyn Scope, helpers: &Helpers) -> Result<Value> {
    interpolate_with(text, scope, helpers, &Markers::default())
}

/// Replaces every marker in `text` with the value of its expression.
///
/// Contract:
/// - Text without markers comes back unchanged as a string.
/// - When `text` is exactly one marker, the typed value is returned as is.
/// - Otherwise each value is stringified (`undefined` as empty) and spliced in;
///   substituted text is never scanned again.
/// - Marker ends and helper separators inside quoted string literals are not
///   structural; a backslash always escapes the next character.
pub fn interpolate_with(
    text: &str,
    scope: &dyn Scope,
    helpers: &Helpers,
    markers: &Markers,
) -> Result<Value> {
    if markers.start.is_empty() || markers.end.is_empty() {
        return Ok(Value::String(text.to_string()));
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = memmem::find(rest.as_bytes(), markers.start.as_bytes()) {
        let body_start = start + markers.start.len();
        let Some(span) = scan_marker(&rest[body_start..], markers) else {
            return Err(Error::UnterminatedMarker {
                text: text.to_string(),
            });
        };
        let body = &rest[body_start..body_start + span.end];
        let (source, helper) = match span.helper {
            Some(at) => (&body[..at], Some(body[at + markers.helper.len()..].trim())),
            None => (body, None),
        };

        let mut value = evaluate(source, scope)?;
        if let Some(name) = helper {
            let Some(helper) = helpers.get(name) else {
                return Err(Error::UnknownHelper {
                    name: name.to_string(),
                });
            };
            value = helper(value, scope);
        }

        let after = body_start + span.end + markers.end.len();
        if start == 0 && after == rest.len() && rest.len() == text.len() {
            return Ok(value);
        }

        out.push_str(&rest[..start]);
        out.push_str(&value.to_interpolated_string());
        rest = &rest[after..];
    }

    out.push_str(rest);
    Ok(Value::String(out))
}

struct MarkerSpan {
    /// Offset of the end marker within the body.
    end: usize,
    /// Offset of the helper separator within the body.
    helper: Option<usize>,
}

fn scan_marker(body: &str, markers: &Markers) -> Option<MarkerSpan> {
    let mut quote: Option<char> = None;
    let mut chars = body.char_indices();

    while let Some((i, c)) = chars.next() {
        match c {
            '\\' => {
                chars.next();
            }
            '\'' | '"' => match quote {
                Some(open) if open == c => quote = None,
                None => quote = Some(c),
                Some(_) => {}
            },
            _ if quote.is_none() && body[i..].starts_with(markers.end.as_str()) => {
                return Some(MarkerSpan { end: i, helper: None });
            }
            _ if quote.is_none()
                && !markers.helper.is_empty()
                && body[i..].starts_with(markers.helper.as_str()) =>
            {
                // The helper name is plain text up to the end marker.
                let name_start = i + markers.helper.len();
                let end = memmem::find(body[name_start..].as_bytes(), markers.end.as_bytes())?;
                return Some(MarkerSpan {
                    end: name_start + end,
                    helper: Some(i),
                });
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value as JsonValue, json};

    fn model() -> JsonValue {
        json!({
            "title": "Test",
            "isTrue": false,
            "ifTrue": "is true",
            "ifFalse": "is false",
            "complex": { "subitem": "success" },
            "list": [1, 2],
        })
    }

    fn helpers() -> Helpers {
        let mut helpers = Helpers::new();
        helpers.register(&["upper", "u"], |value, _| {
            Value::String(value.to_string().to_uppercase())
        });
        helpers
    }

    fn rewrite(text: &str) -> Value {
        interpolate(text, &model(), &helpers())
            .unwrap_or_else(|err| panic!("`{text}` failed: {err}"))
    }

    fn rewrite_with(text: &str, start: &str, end: &str) -> Value {
        interpolate_with(text, &model(), &helpers(), &Markers::new(start, end))
            .unwrap_or_else(|err| panic!("`{text}` failed: {err}"))
    }

    #[test]
    fn sole_marker_returns_typed_value() {
        let model = model();
        for key in ["title", "isTrue", "ifTrue", "ifFalse", "complex", "list"] {
            assert_eq!(
                rewrite(&format!("{{{{{key}}}}}")),
                Value::from(&model[key]),
                "key `{key}`"
            );
        }
        assert_eq!(rewrite("{{complex.subitem}}"), Value::from("success"));
        assert_eq!(rewrite("{{1+2}}"), Value::Number(3.0));
        assert_eq!(rewrite("{{isTrue ? ifTrue : ifFalse}}"), Value::from("is false"));
    }

    #[test]
    fn embedded_markers_are_stringified() {
        assert_eq!(rewrite("[{{1+2}}]"), Value::from("[3]"));
        assert_eq!(rewrite("{{title}}: {{list}}"), Value::from("Test: 1,2"));
        assert_eq!(rewrite("{{isTrue}}!"), Value::from("false!"));
        assert_eq!(rewrite("a{{complex.missing}}b"), Value::from("ab"));
    }

    #[test]
    fn text_without_markers_is_unchanged() {
        for text in ["", "plain", "a } b { c", "{ {1} }"] {
            assert_eq!(rewrite(text), Value::from(text));
        }
    }

    #[test]
    fn custom_markers() {
        assert_eq!(rewrite_with("|1+2|", "|", "|"), Value::Number(3.0));
        assert_eq!(rewrite_with("<<1+2>>", "<<", ">>"), Value::Number(3.0));
        assert_eq!(rewrite_with("!!!1+2___", "!!!", "___"), Value::Number(3.0));
        assert_eq!(rewrite_with("a1+2___", "a", "___"), Value::Number(3.0));
    }

    #[test]
    fn substituted_text_is_not_rescanned() {
        let model = json!({ "raw": "{{title}}", "title": "x" });
        let out = interpolate("<{{raw}}>", &model, &Helpers::new()).unwrap();
        assert_eq!(out, Value::from("<{{title}}>"));
    }

    #[test]
    fn helper_separator_inside_strings_is_literal() {
        assert_eq!(rewrite("{{'marker#marker'#upper}}"), Value::from("MARKER#MARKER"));
        assert_eq!(rewrite(r#"{{"marker<#>marker"}}"#), Value::from("marker<#>marker"));
        assert_eq!(rewrite(r##"{{"#"}}"##), Value::from("#"));
        assert_eq!(rewrite(r"{{'it\'s#' # u }}"), Value::from("IT'S#"));
    }

    #[test]
    fn end_marker_inside_strings_is_literal() {
        assert_eq!(rewrite("{{'}}'}}"), Value::from("}}"));
        assert_eq!(rewrite("<{{\"a}}b\" + 1}}>"), Value::from("<a}}b1>"));
    }

    #[test]
    fn unknown_helper_is_an_error() {
        assert_eq!(
            interpolate("{{title#nope}}", &model(), &helpers()),
            Err(Error::UnknownHelper {
                name: "nope".to_string()
            })
        );
    }

    #[test]
    fn unterminated_marker_is_an_error() {
        assert!(matches!(
            interpolate("a {{title", &model(), &helpers()),
            Err(Error::UnterminatedMarker { .. })
        ));
        assert!(matches!(
            interpolate("{{'}}", &model(), &helpers()),
            Err(Error::UnterminatedMarker { .. })
        ));
    }

    #[test]
    fn evaluation_errors_propagate() {
        assert!(matches!(
            interpolate("x {{missing}}", &model(), &helpers()),
            Err(Error::Unbound { .. })
        ));
    }
}
