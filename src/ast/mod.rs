use std::fmt;

use serde::Serialize;

use crate::lexer::Token;

pub mod source_map;
pub use source_map::SourceMap;

// ---- Span infrastructure ----

/// Byte range within source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub const UNKNOWN: Span = Span { start: 0, end: 0 };

    pub fn new(start: usize, end: usize) -> Self {
        Span { start, end }
    }

    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<std::ops::Range<usize>> for Span {
    fn from(range: std::ops::Range<usize>) -> Self {
        Span { start: range.start, end: range.end }
    }
}

// ---- Core AST types ----

/// Arithmetic operators accepted between two operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum InfixOp {
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "-")]
    Sub,
}

impl InfixOp {
    pub fn symbol(self) -> &'static str {
        match self {
            InfixOp::Add => "+",
            InfixOp::Sub => "-",
        }
    }
}

impl fmt::Display for InfixOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Expressions
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Expr {
    /// `12`
    Integer {
        value: i64,
        #[serde(skip)]
        token: Token,
    },

    /// `left + right`, `left - right`
    Infix {
        op: InfixOp,
        left: Box<Expr>,
        right: Box<Expr>,
        #[serde(skip)]
        token: Token,
    },

    /// Poison node standing in for an operand that failed to parse.
    /// Only ever present alongside a recorded `ParseError`.
    Error {
        #[serde(skip)]
        token: Token,
    },
}

impl Expr {
    /// The token this node was built from: the literal for integers,
    /// the operator for infix expressions.
    pub fn token(&self) -> &Token {
        match self {
            Expr::Integer { token, .. } | Expr::Infix { token, .. } | Expr::Error { token } => token,
        }
    }

    /// Source range covered by the whole subtree.
    pub fn span(&self) -> Span {
        match self {
            Expr::Integer { token, .. } | Expr::Error { token } => token.span,
            Expr::Infix { left, right, token, .. } => {
                left.span().merge(token.span).merge(right.span())
            }
        }
    }

    pub fn is_error(&self) -> bool {
        match self {
            Expr::Error { .. } => true,
            Expr::Integer { .. } => false,
            Expr::Infix { left, right, .. } => left.is_error() || right.is_error(),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Integer { value, .. } => write!(f, "{value}"),
            Expr::Infix { op, left, right, .. } => write!(f, "({left} {op} {right})"),
            Expr::Error { token } => write!(f, "<error {:?}>", token.lexeme),
        }
    }
}

/// Root of a parse: exactly one expression.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Program {
    pub expression: Expr,
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.expression)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::TokenKind;

    fn int(value: i64, start: usize) -> Expr {
        let text = value.to_string();
        let end = start + text.len();
        Expr::Integer {
            value,
            token: Token::new(TokenKind::IntegerLiteral, text, 1, start + 1, Span::new(start, end)),
        }
    }

    fn infix(op: InfixOp, left: Expr, right: Expr, at: usize) -> Expr {
        Expr::Infix {
            op,
            left: Box::new(left),
            right: Box::new(right),
            token: Token::new(
                if op == InfixOp::Add { TokenKind::Plus } else { TokenKind::Minus },
                op.symbol(),
                1,
                at + 1,
                Span::new(at, at + 1),
            ),
        }
    }

    #[test]
    fn span_merge() {
        let a = Span::new(3, 5);
        let b = Span::new(1, 4);
        assert_eq!(a.merge(b), Span::new(1, 5));
        assert_eq!(Span::new(2, 6).len(), 4);
        assert!(Span::UNKNOWN.is_empty());
    }

    #[test]
    fn display_is_fully_parenthesised() {
        // 12 + 7 - 5
        let tree = infix(
            InfixOp::Sub,
            infix(InfixOp::Add, int(12, 0), int(7, 5), 3),
            int(5, 9),
            7,
        );
        assert_eq!(tree.to_string(), "((12 + 7) - 5)");
        assert_eq!(tree.span(), Span::new(0, 10));
    }

    #[test]
    fn error_node_poisons_the_tree() {
        let bad = Expr::Error {
            token: Token::new(TokenKind::Identifier, "x", 1, 5, Span::new(4, 5)),
        };
        let tree = infix(InfixOp::Add, int(1, 0), bad, 2);
        assert!(tree.is_error());
        assert!(!int(1, 0).is_error());
    }

    #[test]
    fn serializes_without_tokens() {
        let program = Program {
            expression: infix(InfixOp::Add, int(1, 0), int(2, 4), 2),
        };
        let json = serde_json::to_value(&program).unwrap();
        assert_eq!(json["expression"]["Infix"]["op"], "+");
        assert_eq!(json["expression"]["Infix"]["left"]["Integer"]["value"], 1);
        assert!(json["expression"]["Infix"].get("token").is_none());
    }
}
