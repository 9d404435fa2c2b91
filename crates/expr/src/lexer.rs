use crate::error::{Error, Result};

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum TokenKind {
    Number(f64),
    String(String),
    Ident(String),
    Punct(Punct),
    Eof,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Punct {
    LParen,
    RParen,
    LBracket,
    RBracket,
    Dot,
    Comma,
    Question,
    Colon,
    Semicolon,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Bang,
    AndAnd,
    OrOr,
    EqEq,
    NotEq,
    EqEqEq,
    NotEqEq,
    Lt,
    Le,
    Gt,
    Ge,
    Assign,
    PlusAssign,
    MinusAssign,
    StarAssign,
    SlashAssign,
}

impl Punct {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Punct::LParen => "(",
            Punct::RParen => ")",
            Punct::LBracket => "[",
            Punct::RBracket => "]",
            Punct::Dot => ".",
            Punct::Comma => ",",
            Punct::Question => "?",
            Punct::Colon => ":",
            Punct::Semicolon => ";",
            Punct::Plus => "+",
            Punct::Minus => "-",
            Punct::Star => "*",
            Punct::Slash => "/",
            Punct::Percent => "%",
            Punct::Bang => "!",
            Punct::AndAnd => "&&",
            Punct::OrOr => "||",
            Punct::EqEq => "==",
            Punct::NotEq => "!=",
            Punct::EqEqEq => "===",
            Punct::NotEqEq => "!==",
            Punct::Lt => "<",
            Punct::Le => "<=",
            Punct::Gt => ">",
            Punct::Ge => ">=",
            Punct::Assign => "=",
            Punct::PlusAssign => "+=",
            Punct::MinusAssign => "-=",
            Punct::StarAssign => "*=",
            Punct::SlashAssign => "/=",
        }
    }
}

// Longest operators first so `===` wins over `==` and `=`.
const PUNCTUATORS: &[Punct] = &[
    Punct::EqEqEq,
    Punct::NotEqEq,
    Punct::AndAnd,
    Punct::OrOr,
    Punct::EqEq,
    Punct::NotEq,
    Punct::Le,
    Punct::Ge,
    Punct::PlusAssign,
    Punct::MinusAssign,
    Punct::StarAssign,
    Punct::SlashAssign,
    Punct::LParen,
    Punct::RParen,
    Punct::LBracket,
    Punct::RBracket,
    Punct::Dot,
    Punct::Comma,
    Punct::Question,
    Punct::Colon,
    Punct::Semicolon,
    Punct::Plus,
    Punct::Minus,
    Punct::Star,
    Punct::Slash,
    Punct::Percent,
    Punct::Bang,
    Punct::Lt,
    Punct::Gt,
    Punct::Assign,
];

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Token {
    pub kind: TokenKind,
    pub offset: usize,
}

pub(crate) fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_ident_continue(c: char) -> bool {
    is_ident_start(c) || c.is_ascii_digit()
}

pub(crate) fn lex(src: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let bytes = src.as_bytes();
    let mut i = 0;

    while i < src.len() {
        let Some(c) = src[i..].chars().next() else {
            break;
        };
        if c.is_whitespace() {
            i += c.len_utf8();
            continue;
        }
        let start = i;

        if c.is_ascii_digit()
            || (c == '.' && bytes.get(i + 1).is_some_and(|b| b.is_ascii_digit()))
        {
            let (value, end) = lex_number(src, i)?;
            tokens.push(Token {
                kind: TokenKind::Number(value),
                offset: start,
            });
            i = end;
            continue;
        }

        if c == '\'' || c == '"' {
            let (value, end) = lex_string(src, i, c)?;
            tokens.push(Token {
                kind: TokenKind::String(value),
                offset: start,
            });
            i = end;
            continue;
        }

        if is_ident_start(c) {
            let end = src[i..]
                .char_indices()
                .find(|&(_, ch)| !is_ident_continue(ch))
                .map_or(src.len(), |(rel, _)| i + rel);
            tokens.push(Token {
                kind: TokenKind::Ident(src[i..end].to_string()),
                offset: start,
            });
            i = end;
            continue;
        }

        let Some(punct) = PUNCTUATORS
            .iter()
            .copied()
            .find(|p| src[i..].starts_with(p.as_str()))
        else {
            return Err(Error::syntax(src, i, format!("unexpected character `{c}`")));
        };
        tokens.push(Token {
            kind: TokenKind::Punct(punct),
            offset: start,
        });
        i += punct.as_str().len();
    }

    tokens.push(Token {
        kind: TokenKind::Eof,
        offset: src.len(),
    });
    Ok(tokens)
}

fn lex_number(src: &str, start: usize) -> Result<(f64, usize)> {
    let bytes = src.as_bytes();
    let mut i = start;

    if bytes[i] == b'0' && matches!(bytes.get(i + 1), Some(b'x' | b'X')) {
        let digits_start = i + 2;
        let mut j = digits_start;
        while j < bytes.len() && bytes[j].is_ascii_hexdigit() {
            j += 1;
        }
        let value = u64::from_str_radix(&src[digits_start..j], 16)
            .map_err(|_| Error::syntax(src, start, "malformed hex literal"))?;
        return Ok((value as f64, j));
    }

    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    if i < bytes.len() && bytes[i] == b'.' {
        i += 1;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
    }
    if i < bytes.len() && matches!(bytes[i], b'e' | b'E') {
        let mut j = i + 1;
        if j < bytes.len() && matches!(bytes[j], b'+' | b'-') {
            j += 1;
        }
        if j < bytes.len() && bytes[j].is_ascii_digit() {
            while j < bytes.len() && bytes[j].is_ascii_digit() {
                j += 1;
            }
            i = j;
        }
    }
    if bytes.get(i).is_some_and(|&b| b.is_ascii_alphabetic() || b == b'_' || b == b'$') {
        return Err(Error::syntax(src, i, "identifier directly after number"));
    }

    let value = src[start..i]
        .parse::<f64>()
        .map_err(|_| Error::syntax(src, start, "malformed number literal"))?;
    Ok((value, i))
}

fn lex_string(src: &str, start: usize, quote: char) -> Result<(String, usize)> {
    let mut out = String::new();
    let mut chars = src[start + 1..].char_indices();

    while let Some((rel, c)) = chars.next() {
        if c == quote {
            return Ok((out, start + 1 + rel + c.len_utf8()));
        }
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some((esc_rel, esc)) = chars.next() else {
            break;
        };
        match esc {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            '0' => out.push('\0'),
            'u' => {
                let hex_start = start + 1 + esc_rel + 1;
                let hex = src
                    .get(hex_start..hex_start + 4)
                    .filter(|h| h.bytes().all(|b| b.is_ascii_hexdigit()))
                    .ok_or_else(|| Error::syntax(src, hex_start, "malformed \\u escape"))?;
                let ch = u32::from_str_radix(hex, 16)
                    .ok()
                    .and_then(char::from_u32)
                    .unwrap_or('\u{FFFD}');
                out.push(ch);
                for _ in 0..4 {
                    chars.next();
                }
            }
            // `\'`, `\"`, `\\` and any other escaped character stand for themselves.
            other => out.push(other),
        }
    }

    Err(Error::syntax(src, start, "unterminated string literal"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        lex(src)
            .unwrap_or_else(|err| panic!("lex `{src}` failed: {err}"))
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn lexes_operators_longest_first() {
        assert_eq!(
            kinds("a === b !== c"),
            vec![
                TokenKind::Ident("a".into()),
                TokenKind::Punct(Punct::EqEqEq),
                TokenKind::Ident("b".into()),
                TokenKind::Punct(Punct::NotEqEq),
                TokenKind::Ident("c".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn identifiers_may_use_dollar_and_underscore() {
        assert_eq!(
            kinds("$.arg _x"),
            vec![
                TokenKind::Ident("$".into()),
                TokenKind::Punct(Punct::Dot),
                TokenKind::Ident("arg".into()),
                TokenKind::Ident("_x".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn numbers_support_fraction_exponent_and_hex() {
        assert_eq!(
            kinds("1.5 .5 2e3 0x1F"),
            vec![
                TokenKind::Number(1.5),
                TokenKind::Number(0.5),
                TokenKind::Number(2000.0),
                TokenKind::Number(31.0),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn strings_decode_escapes() {
        assert_eq!(
            kinds(r#"'it\'s' "say \"hi\"" 'a\nb' 'é'"#),
            vec![
                TokenKind::String("it's".into()),
                TokenKind::String("say \"hi\"".into()),
                TokenKind::String("a\nb".into()),
                TokenKind::String("é".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn unterminated_string_is_a_syntax_error() {
        assert!(matches!(lex("'abc"), Err(Error::Syntax { offset: 0, .. })));
    }

    #[test]
    fn stray_character_reports_offset() {
        assert!(matches!(lex("a @ b"), Err(Error::Syntax { offset: 2, .. })));
    }
}
