//! Recursive-descent parser for template expressions and model-patch statements.
//!
//! Precedence, lowest first: `?:`, `||`, `&&`, equality, relational, additive,
//! multiplicative, unary, postfix member/index access, primary.

use crate::error::{Error, Result};
use crate::lexer::{Punct, Token, TokenKind, lex};
use crate::value::Value;

#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Literal(Value),
    Array(Vec<Expr>),
    Ident(String),
    Member {
        object: Box<Expr>,
        property: String,
    },
    Index {
        object: Box<Expr>,
        index: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Logical {
        op: LogicalOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Conditional {
        test: Box<Expr>,
        consequent: Box<Expr>,
        alternate: Box<Expr>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Neg,
    Plus,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    NotEq,
    StrictEq,
    StrictNotEq,
    Lt,
    Le,
    Gt,
    Ge,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssignOp {
    Assign,
    Add,
    Sub,
    Mul,
    Div,
}

impl AssignOp {
    /// Binary operator a compound assignment applies before storing.
    pub fn binary(self) -> Option<BinaryOp> {
        match self {
            AssignOp::Assign => None,
            AssignOp::Add => Some(BinaryOp::Add),
            AssignOp::Sub => Some(BinaryOp::Sub),
            AssignOp::Mul => Some(BinaryOp::Mul),
            AssignOp::Div => Some(BinaryOp::Div),
        }
    }
}

/// `target op value`, where `target` is an identifier with optional member/index segments.
#[derive(Clone, Debug, PartialEq)]
pub struct Assignment {
    pub target: Expr,
    pub op: AssignOp,
    pub value: Expr,
}

pub fn parse_expression(src: &str) -> Result<Expr> {
    let mut parser = Parser::new(src)?;
    let expr = parser.expression()?;
    parser.expect_eof()?;
    Ok(expr)
}

/// Parses `;`-separated assignments. Empty statements are allowed.
pub fn parse_statements(src: &str) -> Result<Vec<Assignment>> {
    let mut parser = Parser::new(src)?;
    let mut out = Vec::new();
    loop {
        while parser.eat(Punct::Semicolon) {}
        if parser.at_eof() {
            break;
        }
        out.push(parser.assignment()?);
        if !parser.eat(Punct::Semicolon) {
            parser.expect_eof()?;
            break;
        }
    }
    Ok(out)
}

/// Deepest nesting of sub-expressions the parser accepts.
const MAX_DEPTH: usize = 128;

struct Parser<'src> {
    src: &'src str,
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl<'src> Parser<'src> {
    fn new(src: &'src str) -> Result<Self> {
        Ok(Self {
            src,
            tokens: lex(src)?,
            pos: 0,
            depth: 0,
        })
    }

    fn peek(&self) -> &Token {
        // The token list always ends with Eof and `pos` never moves past it.
        &self.tokens[self.pos]
    }

    fn advance(&mut self) -> Token {
        let token = self.tokens[self.pos].clone();
        if !matches!(token.kind, TokenKind::Eof) {
            self.pos += 1;
        }
        token
    }

    fn at_eof(&self) -> bool {
        matches!(self.peek().kind, TokenKind::Eof)
    }

    fn at(&self, punct: Punct) -> bool {
        self.peek().kind == TokenKind::Punct(punct)
    }

    fn eat(&mut self, punct: Punct) -> bool {
        if self.at(punct) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn error(&self, message: impl Into<String>) -> Error {
        Error::syntax(self.src, self.peek().offset, message)
    }

    /// Goes one level deeper into the expression tree. A failed parse is
    /// abandoned, so only successful paths need to call [`Parser::leave`].
    fn enter(&mut self) -> Result<()> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(self.error(format!(
                "expression nests deeper than {MAX_DEPTH} levels"
            )));
        }
        Ok(())
    }

    fn leave(&mut self, levels: usize) {
        self.depth -= levels;
    }

    fn expect(&mut self, punct: Punct) -> Result<()> {
        if self.eat(punct) {
            Ok(())
        } else {
            Err(self.error(format!("expected `{}`", punct.as_str())))
        }
    }

    fn expect_eof(&self) -> Result<()> {
        match &self.peek().kind {
            TokenKind::Eof => Ok(()),
            TokenKind::Punct(Punct::LParen) => Err(self.error("function calls are not supported")),
            TokenKind::Punct(
                Punct::Assign
                | Punct::PlusAssign
                | Punct::MinusAssign
                | Punct::StarAssign
                | Punct::SlashAssign,
            ) => Err(self.error("assignment is not allowed in expressions")),
            other => Err(self.error(format!("unexpected {}", describe(other)))),
        }
    }

    fn assignment(&mut self) -> Result<Assignment> {
        let target_offset = self.peek().offset;
        let target = self.postfix()?;
        if !is_place(&target) {
            return Err(Error::syntax(
                self.src,
                target_offset,
                "assignment target must be a name or property",
            ));
        }
        let op = match &self.peek().kind {
            TokenKind::Punct(Punct::Assign) => AssignOp::Assign,
            TokenKind::Punct(Punct::PlusAssign) => AssignOp::Add,
            TokenKind::Punct(Punct::MinusAssign) => AssignOp::Sub,
            TokenKind::Punct(Punct::StarAssign) => AssignOp::Mul,
            TokenKind::Punct(Punct::SlashAssign) => AssignOp::Div,
            other => {
                return Err(self.error(format!(
                    "expected assignment operator, found {}",
                    describe(other)
                )));
            }
        };
        self.advance();
        let value = self.expression()?;
        Ok(Assignment { target, op, value })
    }

    fn expression(&mut self) -> Result<Expr> {
        self.enter()?;
        let expr = self.conditional()?;
        self.leave(1);
        Ok(expr)
    }

    fn conditional(&mut self) -> Result<Expr> {
        let test = self.logical_or()?;
        if !self.eat(Punct::Question) {
            return Ok(test);
        }
        self.enter()?;
        let consequent = self.conditional()?;
        self.expect(Punct::Colon)?;
        let alternate = self.conditional()?;
        self.leave(1);
        Ok(Expr::Conditional {
            test: Box::new(test),
            consequent: Box::new(consequent),
            alternate: Box::new(alternate),
        })
    }

    fn logical_or(&mut self) -> Result<Expr> {
        let mut lhs = self.logical_and()?;
        let mut folds = 0;
        while self.eat(Punct::OrOr) {
            self.enter()?;
            folds += 1;
            let rhs = self.logical_and()?;
            lhs = Expr::Logical {
                op: LogicalOp::Or,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        self.leave(folds);
        Ok(lhs)
    }

    fn logical_and(&mut self) -> Result<Expr> {
        let mut lhs = self.equality()?;
        let mut folds = 0;
        while self.eat(Punct::AndAnd) {
            self.enter()?;
            folds += 1;
            let rhs = self.equality()?;
            lhs = Expr::Logical {
                op: LogicalOp::And,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        self.leave(folds);
        Ok(lhs)
    }

    fn binary_level(
        &mut self,
        table: &[(Punct, BinaryOp)],
        next: fn(&mut Self) -> Result<Expr>,
    ) -> Result<Expr> {
        let mut lhs = next(self)?;
        let mut folds = 0;
        'outer: loop {
            for &(punct, op) in table {
                if self.eat(punct) {
                    self.enter()?;
                    folds += 1;
                    let rhs = next(self)?;
                    lhs = Expr::Binary {
                        op,
                        lhs: Box::new(lhs),
                        rhs: Box::new(rhs),
                    };
                    continue 'outer;
                }
            }
            self.leave(folds);
            return Ok(lhs);
        }
    }

    fn equality(&mut self) -> Result<Expr> {
        self.binary_level(
            &[
                (Punct::EqEqEq, BinaryOp::StrictEq),
                (Punct::NotEqEq, BinaryOp::StrictNotEq),
                (Punct::EqEq, BinaryOp::Eq),
                (Punct::NotEq, BinaryOp::NotEq),
            ],
            Self::relational,
        )
    }

    fn relational(&mut self) -> Result<Expr> {
        self.binary_level(
            &[
                (Punct::Le, BinaryOp::Le),
                (Punct::Ge, BinaryOp::Ge),
                (Punct::Lt, BinaryOp::Lt),
                (Punct::Gt, BinaryOp::Gt),
            ],
            Self::additive,
        )
    }

    fn additive(&mut self) -> Result<Expr> {
        self.binary_level(
            &[(Punct::Plus, BinaryOp::Add), (Punct::Minus, BinaryOp::Sub)],
            Self::multiplicative,
        )
    }

    fn multiplicative(&mut self) -> Result<Expr> {
        self.binary_level(
            &[
                (Punct::Star, BinaryOp::Mul),
                (Punct::Slash, BinaryOp::Div),
                (Punct::Percent, BinaryOp::Rem),
            ],
            Self::unary,
        )
    }

    fn unary(&mut self) -> Result<Expr> {
        let op = if self.eat(Punct::Bang) {
            UnaryOp::Not
        } else if self.eat(Punct::Minus) {
            UnaryOp::Neg
        } else if self.eat(Punct::Plus) {
            UnaryOp::Plus
        } else {
            return self.postfix();
        };
        self.enter()?;
        let operand = self.unary()?;
        self.leave(1);
        Ok(Expr::Unary {
            op,
            operand: Box::new(operand),
        })
    }

    fn postfix(&mut self) -> Result<Expr> {
        let mut expr = self.primary()?;
        let mut folds = 0;
        loop {
            if self.at(Punct::Dot) || self.at(Punct::LBracket) {
                self.enter()?;
                folds += 1;
            }
            if self.eat(Punct::Dot) {
                let token = self.advance();
                let TokenKind::Ident(property) = token.kind else {
                    return Err(Error::syntax(
                        self.src,
                        token.offset,
                        "expected property name after `.`",
                    ));
                };
                expr = Expr::Member {
                    object: Box::new(expr),
                    property,
                };
            } else if self.eat(Punct::LBracket) {
                let index = self.expression()?;
                self.expect(Punct::RBracket)?;
                expr = Expr::Index {
                    object: Box::new(expr),
                    index: Box::new(index),
                };
            } else if self.at(Punct::LParen) {
                return Err(self.error("function calls are not supported"));
            } else {
                self.leave(folds);
                return Ok(expr);
            }
        }
    }

    fn primary(&mut self) -> Result<Expr> {
        let token = self.advance();
        match token.kind {
            TokenKind::Number(n) => Ok(Expr::Literal(Value::Number(n))),
            TokenKind::String(s) => Ok(Expr::Literal(Value::String(s))),
            TokenKind::Ident(name) => Ok(match name.as_str() {
                "true" => Expr::Literal(Value::Bool(true)),
                "false" => Expr::Literal(Value::Bool(false)),
                "null" => Expr::Literal(Value::Null),
                "undefined" => Expr::Literal(Value::Undefined),
                _ => Expr::Ident(name),
            }),
            TokenKind::Punct(Punct::LParen) => {
                let inner = self.expression()?;
                self.expect(Punct::RParen)?;
                Ok(inner)
            }
            TokenKind::Punct(Punct::LBracket) => {
                let mut items = Vec::new();
                while !self.at(Punct::RBracket) {
                    items.push(self.expression()?);
                    if !self.eat(Punct::Comma) {
                        break;
                    }
                }
                self.expect(Punct::RBracket)?;
                Ok(Expr::Array(items))
            }
            other => Err(Error::syntax(
                self.src,
                token.offset,
                format!("expected an expression, found {}", describe(&other)),
            )),
        }
    }
}

fn is_place(expr: &Expr) -> bool {
    match expr {
        Expr::Ident(_) => true,
        Expr::Member { object, .. } | Expr::Index { object, .. } => is_place(object),
        _ => false,
    }
}

fn describe(kind: &TokenKind) -> String {
    match kind {
        TokenKind::Number(n) => format!("number `{}`", Value::Number(*n)),
        TokenKind::String(s) => format!("string {s:?}"),
        TokenKind::Ident(name) => format!("`{name}`"),
        TokenKind::Punct(p) => format!("`{}`", p.as_str()),
        TokenKind::Eof => "end of input".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(name: &str) -> Box<Expr> {
        Box::new(Expr::Ident(name.to_string()))
    }

    fn num(n: f64) -> Box<Expr> {
        Box::new(Expr::Literal(Value::Number(n)))
    }

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        assert_eq!(
            parse_expression("1 + 2 * 3").ok(),
            Some(Expr::Binary {
                op: BinaryOp::Add,
                lhs: num(1.0),
                rhs: Box::new(Expr::Binary {
                    op: BinaryOp::Mul,
                    lhs: num(2.0),
                    rhs: num(3.0),
                }),
            })
        );
    }

    #[test]
    fn subtraction_is_left_associative() {
        assert_eq!(
            parse_expression("a - b - c").ok(),
            Some(Expr::Binary {
                op: BinaryOp::Sub,
                lhs: Box::new(Expr::Binary {
                    op: BinaryOp::Sub,
                    lhs: ident("a"),
                    rhs: ident("b"),
                }),
                rhs: ident("c"),
            })
        );
    }

    #[test]
    fn ternary_is_right_associative() {
        let parsed = parse_expression("a ? b : c ? d : e");
        let Ok(Expr::Conditional { alternate, .. }) = parsed else {
            panic!("expected conditional, got {parsed:?}");
        };
        assert!(matches!(*alternate, Expr::Conditional { .. }));
    }

    #[test]
    fn member_and_index_chain() {
        assert_eq!(
            parse_expression("value.nested[0].text").ok(),
            Some(Expr::Member {
                object: Box::new(Expr::Index {
                    object: Box::new(Expr::Member {
                        object: ident("value"),
                        property: "nested".to_string(),
                    }),
                    index: num(0.0),
                }),
                property: "text".to_string(),
            })
        );
    }

    #[test]
    fn keywords_become_literals() {
        assert_eq!(
            parse_expression("undefined").ok(),
            Some(Expr::Literal(Value::Undefined))
        );
        assert_eq!(
            parse_expression("[true, null]").ok(),
            Some(Expr::Array(vec![
                Expr::Literal(Value::Bool(true)),
                Expr::Literal(Value::Null),
            ]))
        );
    }

    #[test]
    fn calls_and_assignments_are_rejected() {
        for src in ["alert(1)", "a.b()", "a = 1", "x += 2"] {
            assert!(
                matches!(parse_expression(src), Err(Error::Syntax { .. })),
                "`{src}` should not parse as an expression"
            );
        }
    }

    #[test]
    fn trailing_tokens_are_rejected() {
        assert!(matches!(
            parse_expression("1 2"),
            Err(Error::Syntax { offset: 2, .. })
        ));
        assert!(parse_expression("").is_err());
    }

    #[test]
    fn deep_nesting_is_a_syntax_error() {
        let parens = format!("{}1{}", "(".repeat(100_000), ")".repeat(100_000));
        assert!(matches!(parse_expression(&parens), Err(Error::Syntax { .. })));
        assert!(matches!(
            parse_expression(&"!".repeat(100_000)),
            Err(Error::Syntax { .. })
        ));
        let chain = vec!["1"; 100_000].join(" + ");
        assert!(matches!(parse_expression(&chain), Err(Error::Syntax { .. })));
        assert!(parse_statements(&format!("a{} = 1", ".b".repeat(100_000))).is_err());
    }

    #[test]
    fn moderate_nesting_still_parses() {
        let parens = format!("{}1{}", "(".repeat(40), ")".repeat(40));
        assert_eq!(
            parse_expression(&parens).ok(),
            Some(Expr::Literal(Value::Number(1.0)))
        );
        let chain = vec!["x"; 50].join(" && ");
        assert!(parse_expression(&chain).is_ok());
    }

    #[test]
    fn statements_split_on_semicolons() {
        let statements = parse_statements("a = 1; b.c += 2;; d[0] = 'x';").unwrap_or_default();
        assert_eq!(statements.len(), 3);
        assert_eq!(statements[1].op, AssignOp::Add);
        assert!(matches!(statements[2].target, Expr::Index { .. }));
    }

    #[test]
    fn statements_require_place_targets() {
        assert!(parse_statements("1 = 2").is_err());
        assert!(parse_statements("a + 1").is_err());
        assert!(parse_statements("a = 1 b = 2").is_err());
    }
}
