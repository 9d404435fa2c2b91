use std::fmt::Write;

/// Encode `s` so it renders as literal text in markup.
///
/// Contract:
/// - `&` `<` `>` `"` `'` become `&amp;` `&lt;` `&gt;` `&quot;` `&apos;`.
/// - U+00A0 becomes `&nbsp;`; every other non-ASCII character becomes a
///   decimal reference such as `&#233;`. Characters with a longer named form
///   (`&eacute;`) still get the numeric one.
/// - ASCII outside the five markup characters is copied unchanged.
/// - The output is safe both as element text and inside a quoted attribute value.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + s.len() / 8);
    let mut copy_start = 0;

    for (i, c) in s.char_indices() {
        let named = match c {
            '&' => "&amp;",
            '<' => "&lt;",
            '>' => "&gt;",
            '"' => "&quot;",
            '\'' => "&apos;",
            '\u{a0}' => "&nbsp;",
            c if c.is_ascii() => continue,
            _ => "",
        };
        // Flush the plain run before the character being replaced.
        out.push_str(&s[copy_start..i]);
        if named.is_empty() {
            let _ = write!(out, "&#{};", u32::from(c));
        } else {
            out.push_str(named);
        }
        copy_start = i + c.len_utf8();
    }

    out.push_str(&s[copy_start..]);
    out
}
