//! Template markup tokenizer with a constrained, practical name character set.
//!
//! Supported tag-name characters (ASCII only): `[A-Za-z0-9:_-]`.
//! Attribute names additionally accept `$` and `.` so component parameters
//! (`$title`, `$item.label`) survive tokenization.
//!
//! Text and attribute values are kept verbatim: entities are not decoded, so
//! markup produced by escaping helpers round-trips through parse/serialize
//! unchanged.
//!
//! Known limitations (intentional):
//! - Not an HTML5 tokenizer/state machine (no standard parse-error recovery).
//! - Tag/attribute names are restricted to ASCII.
//! - Rawtext close-tag scanning accepts only ASCII whitespace before `>` (see
//!   `find_rawtext_close_tag`).
use crate::types::Token;
use memchr::memchr;

const HTML_COMMENT_START: &str = "<!--";
const HTML_COMMENT_END: &str = "-->";

fn starts_with_ignore_ascii_case_at(haystack: &[u8], start: usize, needle: &[u8]) -> bool {
    haystack.len() >= start + needle.len()
        && haystack[start..start + needle.len()].eq_ignore_ascii_case(needle)
}

// it only attempts matches starting at ASCII <
// < cannot appear in UTF-8 continuation bytes
const SCRIPT_CLOSE_TAG: &[u8] = b"</script";
const STYLE_CLOSE_TAG: &[u8] = b"</style";

fn find_rawtext_close_tag(haystack: &str, close_tag: &[u8]) -> Option<(usize, usize)> {
    let hay_bytes = haystack.as_bytes();
    let len = hay_bytes.len();
    let n = close_tag.len();
    debug_assert!(n >= 2);
    debug_assert!(close_tag[0] == b'<' && close_tag[1] == b'/');
    if len < n {
        return None;
    }
    let mut i = 0;
    while i + n <= len {
        let rel = memchr(b'<', &hay_bytes[i..])?;
        i += rel;
        if i + n > len {
            return None;
        }
        if hay_bytes[i + 1] == b'/' && starts_with_ignore_ascii_case_at(hay_bytes, i, close_tag) {
            let mut k = i + n;
            while k < len && hay_bytes[k].is_ascii_whitespace() {
                k += 1;
            }
            if k < len && hay_bytes[k] == b'>' {
                return Some((i, k + 1));
            }
        }
        i += 1;
    }
    None
}

pub(crate) fn is_void_element(name: &str) -> bool {
    matches!(
        name,
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "param"
            | "source"
            | "track"
            | "wbr"
    )
}

fn is_tag_name_char(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'-' || c == b'_' || c == b':'
}

fn is_attr_name_char(c: u8) -> bool {
    is_tag_name_char(c) || c == b'$' || c == b'.'
}

/// Tokenizes template markup into a flat token list.
pub fn tokenize(input: &str) -> Vec<Token> {
    let mut out = Vec::new();
    let mut i = 0;
    let bytes = input.as_bytes();
    // Invariant: we scan by byte, but any slice endpoints must be UTF-8 char boundaries.
    // We only cut slices at ASCII structural bytes or at positions reached by scanning
    // ASCII-only tokens; therefore slice endpoints remain UTF-8 boundaries.
    while i < bytes.len() {
        if bytes[i] != b'<' {
            let start = i;
            i = memchr(b'<', &bytes[i..]).map_or(bytes.len(), |rel| i + rel);
            debug_assert!(input.is_char_boundary(start));
            debug_assert!(input.is_char_boundary(i));
            out.push(Token::Text(input[start..i].to_string()));
            continue;
        }
        // now b[i] == b'<'
        if input[i..].starts_with(HTML_COMMENT_START) {
            let body_start = i + HTML_COMMENT_START.len();
            if let Some(end) = input[body_start..].find(HTML_COMMENT_END) {
                out.push(Token::Comment(input[body_start..body_start + end].to_string()));
                i = body_start + end + HTML_COMMENT_END.len();
                continue;
            }
            out.push(Token::Comment(input[body_start..].to_string()));
            break;
        }
        if starts_with_ignore_ascii_case_at(bytes, i, b"<!doctype") {
            let rest = &input[i + 2..];
            if let Some(end) = rest.find('>') {
                out.push(Token::Doctype(rest[..end].trim().to_string()));
                i += 2 + end + 1;
                continue;
            }
            break;
        }
        // end tag?
        if i + 2 <= bytes.len() && bytes[i + 1] == b'/' {
            let start = i + 2;
            let mut j = start;
            while j < bytes.len() && is_tag_name_char(bytes[j]) {
                j += 1;
            }
            let name = input[start..j].to_ascii_lowercase();
            j = memchr(b'>', &bytes[j..]).map_or(bytes.len(), |rel| j + rel + 1);
            out.push(Token::EndTag(name));
            i = j;
            continue;
        }
        // start tag
        let start = i + 1;
        let mut j = start;
        while j < bytes.len() && is_tag_name_char(bytes[j]) {
            j += 1;
        }
        if j == start {
            // A lone `<` (e.g. `a < b` in text) is literal text.
            out.push(Token::Text("<".to_string()));
            i += 1;
            continue;
        }
        let name = input[start..j].to_ascii_lowercase();
        let mut k = j;
        let mut attributes: Vec<(String, Option<String>)> = Vec::new();
        let len = bytes.len();
        let mut self_closing = false;

        let skip_whitespace = |k: &mut usize| {
            while *k < len && bytes[*k].is_ascii_whitespace() {
                *k += 1;
            }
        };

        loop {
            skip_whitespace(&mut k);
            if k >= len {
                break;
            }
            if bytes[k] == b'>' {
                k += 1;
                break;
            }
            if bytes[k] == b'/' {
                if k + 1 < len && bytes[k + 1] == b'>' {
                    self_closing = true;
                    k += 2;
                    break;
                }
                k += 1;
                continue;
            }
            let name_start = k;
            while k < len && is_attr_name_char(bytes[k]) {
                k += 1;
            }
            if name_start == k {
                k += 1;
                continue;
            }
            let attribute_name = input[name_start..k].to_ascii_lowercase();

            skip_whitespace(&mut k);
            let value = if k < len && bytes[k] == b'=' {
                k += 1;
                skip_whitespace(&mut k);
                if k < len && (bytes[k] == b'"' || bytes[k] == b'\'') {
                    let quote = bytes[k];
                    k += 1;
                    let vstart = k;
                    k = memchr(quote, &bytes[k..]).map_or(len, |rel| k + rel);
                    let raw = &input[vstart..k];
                    if k < len {
                        k += 1;
                    }
                    Some(raw.to_string())
                } else {
                    let vstart = k;
                    while k < len && !bytes[k].is_ascii_whitespace() && bytes[k] != b'>' {
                        if bytes[k] == b'/' && k + 1 < len && bytes[k + 1] == b'>' {
                            break;
                        }
                        k += 1;
                    }
                    Some(input[vstart..k].to_string())
                }
            } else {
                None
            };
            attributes.push((attribute_name, value));
        }
        if is_void_element(&name) {
            self_closing = true;
        }

        let rawtext = !self_closing && (name == "script" || name == "style");
        out.push(Token::StartTag {
            name: name.clone(),
            attributes,
            self_closing,
        });

        if rawtext {
            // Rawtext close tags are fixed-length ASCII sequences; we can scan linearly
            // without allocating or creating lowercase buffers.
            let close_tag = if name == "script" {
                SCRIPT_CLOSE_TAG
            } else {
                STYLE_CLOSE_TAG
            };
            if let Some((rel_start, rel_end)) = find_rawtext_close_tag(&input[k..], close_tag) {
                let raw = &input[k..k + rel_start];
                if !raw.is_empty() {
                    out.push(Token::Text(raw.to_string()));
                }
                out.push(Token::EndTag(name));
                i = k + rel_end;
                continue;
            }
            // If the rawtext close tag is missing, emit an implicit end tag and
            // treat the remainder as rawtext content.
            let raw = &input[k..];
            if !raw.is_empty() {
                out.push(Token::Text(raw.to_string()));
            }
            out.push(Token::EndTag(name));
            break;
        }

        i = k;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start_tag(name: &str, attributes: &[(&str, Option<&str>)], self_closing: bool) -> Token {
        Token::StartTag {
            name: name.to_string(),
            attributes: attributes
                .iter()
                .map(|(k, v)| (k.to_string(), v.map(str::to_string)))
                .collect(),
            self_closing,
        }
    }

    #[test]
    fn tokenize_preserves_utf8_text_nodes() {
        let tokens = tokenize("<p>120×32</p>");
        assert!(
            tokens
                .iter()
                .any(|t| matches!(t, Token::Text(s) if s == "120×32")),
            "expected UTF-8 text token, got: {tokens:?}"
        );
    }

    #[test]
    fn tokenize_accepts_dollar_parameter_attributes() {
        let tokens = tokenize(r#"<component id="card" $title $size="2">x</component>"#);
        assert_eq!(
            tokens[0],
            start_tag(
                "component",
                &[("id", Some("card")), ("$title", None), ("$size", Some("2"))],
                false
            )
        );
    }

    #[test]
    fn tokenize_keeps_entities_and_markers_verbatim() {
        let tokens = tokenize(r#"<a title="{{a &amp; b}}">&lt;{{x#escape}}&gt;</a>"#);
        assert_eq!(
            tokens,
            vec![
                start_tag("a", &[("title", Some("{{a &amp; b}}"))], false),
                Token::Text("&lt;{{x#escape}}&gt;".to_string()),
                Token::EndTag("a".to_string()),
            ]
        );
    }

    #[test]
    fn tokenize_lowercases_names() {
        let tokens = tokenize("<DiV ID=one></DIV>");
        assert_eq!(
            tokens,
            vec![
                start_tag("div", &[("id", Some("one"))], false),
                Token::EndTag("div".to_string()),
            ]
        );
    }

    #[test]
    fn tokenize_marks_void_and_self_closing_tags() {
        let tokens = tokenize(r#"<link rel=stylesheet><include name="nav"/>"#);
        assert_eq!(
            tokens,
            vec![
                start_tag("link", &[("rel", Some("stylesheet"))], true),
                start_tag("include", &[("name", Some("nav"))], true),
            ]
        );
    }

    #[test]
    fn tokenize_finds_script_end_tag_case_insensitive() {
        let tokens = tokenize(r#"<script type="text/pearl">a = b < c;</ScRiPt>"#);
        assert_eq!(
            tokens,
            vec![
                start_tag("script", &[("type", Some("text/pearl"))], false),
                Token::Text("a = b < c;".to_string()),
                Token::EndTag("script".to_string()),
            ]
        );
    }

    #[test]
    fn tokenize_handles_rawtext_without_close_tag() {
        let mut body = String::new();
        for _ in 0..10_000 {
            body.push_str("x<y>\n");
        }
        let input = format!("<style>{body}");
        let tokens = tokenize(&input);
        assert!(
            matches!(
                tokens.as_slice(),
                [Token::StartTag { name, .. }, Token::Text(text), Token::EndTag(end)]
                    if name == "style" && *text == body && end == "style"
            ),
            "expected implicit rawtext close, got {} tokens",
            tokens.len()
        );
    }

    #[test]
    fn tokenize_treats_lone_angle_bracket_as_text() {
        let tokens = tokenize("1 < 2");
        let text: String = tokens
            .iter()
            .map(|t| match t {
                Token::Text(s) => s.as_str(),
                other => panic!("unexpected token {other:?}"),
            })
            .collect();
        assert_eq!(text, "1 < 2");
    }

    #[test]
    fn tokenize_handles_comments_and_doctype() {
        let tokens = tokenize("<!DOCTYPE html><!-- note --><p></p>");
        assert_eq!(tokens[0], Token::Doctype("DOCTYPE html".to_string()));
        assert_eq!(tokens[1], Token::Comment(" note ".to_string()));
    }

    #[test]
    fn tokenize_handles_many_simple_tags_linearly() {
        let mut input = String::new();
        for _ in 0..20_000 {
            input.push_str("<a></a>");
        }
        assert_eq!(tokenize(&input).len(), 40_000);
    }
}
