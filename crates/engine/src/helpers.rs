//! Built-in interpolation helpers.

use expr::{Helpers, Value};
use html::escape_html;
use std::fmt::Write;

/// Characters `encode_uri` leaves alone besides ASCII letters and digits.
const URI_RESERVED_AND_UNESCAPED: &[u8] = b";,/?:@&=+$-_.!~*'()#";

/// Registry with `escape` (`e`, `html`) and `encode` (`u`, `url`) installed.
///
/// `escape` writes non-ASCII text as numeric character references (`é` becomes
/// `&#233;`), keeping named entities for the markup characters and `&nbsp;`.
pub fn builtin_helpers() -> Helpers {
    let mut helpers = Helpers::new();
    helpers.register(&["e", "html", "escape"], |value, _| {
        Value::String(escape_html(&value.to_interpolated_string()))
    });
    helpers.register(&["u", "url", "encode"], |value, _| {
        Value::String(encode_uri(&value.to_interpolated_string()))
    });
    helpers
}

/// Percent-encodes `s` as a whole URI: reserved delimiters survive, every other
/// byte outside the unreserved set is written as `%XX` of its UTF-8 encoding.
pub fn encode_uri(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for &b in s.as_bytes() {
        if b.is_ascii_alphanumeric() || URI_RESERVED_AND_UNESCAPED.contains(&b) {
            out.push(char::from(b));
        } else {
            let _ = write!(out, "%{b:02X}");
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use expr::interpolate;
    use serde_json::json;

    fn rewrite(text: &str) -> Value {
        interpolate(text, &json!({}), &builtin_helpers())
            .unwrap_or_else(|err| panic!("`{text}` failed: {err}"))
    }

    #[test]
    fn marker_inside_string_is_not_a_helper() {
        assert_eq!(rewrite("{{'marker#marker'#escape}}"), Value::from("marker#marker"));
        assert_eq!(
            rewrite(r##"{{"<marker#marker>"#escape}}"##),
            Value::from("&lt;marker#marker&gt;")
        );
        assert_eq!(rewrite(r#"{{"marker<#>marker"}}"#), Value::from("marker<#>marker"));
        assert_eq!(rewrite(r##"{{"#"}}"##), Value::from("#"));
    }

    #[test]
    fn escape_processes_quoted_markup() {
        assert_eq!(rewrite("{{'<div/>'#escape}}"), Value::from("&lt;div/&gt;"));
        assert_eq!(rewrite("{{'<café>'#e}}"), Value::from("&lt;caf&#233;&gt;"));
        assert_eq!(rewrite(r##"{{"<div/>"#escape}}"##), Value::from("&lt;div/&gt;"));
        assert_eq!(
            rewrite(r##"{{"<div>'\'\"test\"\''</div>"#escape}}"##),
            Value::from("&lt;div&gt;&apos;&apos;&quot;test&quot;&apos;&apos;&lt;/div&gt;")
        );
    }

    #[test]
    fn escape_aliases() {
        for alias in ["escape", "e", "html"] {
            assert_eq!(
                rewrite(&format!(r"{{{{'<>&@test!#\'!-'#{alias}}}}}")),
                Value::from("&lt;&gt;&amp;@test!#&apos;!-"),
                "alias `{alias}`"
            );
        }
    }

    #[test]
    fn encode_keeps_uri_delimiters() {
        assert_eq!(
            rewrite("{{'http://website.com/qwer?t # y&uio .p+test?'#encode}}"),
            Value::from("http://website.com/qwer?t%20#%20y&uio%20.p+test?")
        );
        assert_eq!(rewrite("{{'a b'#u}}"), rewrite("{{'a b'#url}}"));
    }

    #[test]
    fn encode_percent_encodes_utf8_bytes() {
        assert_eq!(encode_uri("café"), "caf%C3%A9");
        assert_eq!(encode_uri("100%\"<>"), "100%25%22%3C%3E");
    }

    #[test]
    fn helpers_stringify_non_strings() {
        assert_eq!(rewrite("{{1 + 2#e}}"), Value::from("3"));
        assert_eq!(rewrite("{{undefined#e}}"), Value::from(""));
    }
}
