use crate::ast::*;
use crate::lexer::{LexError, Token, TokenKind, Tokenizer};

/// Recursive-descent parser with one token of lookahead.
///
/// Grammar:
///
/// ```text
/// expression := integer ( ('+' | '-') integer )*
/// ```
///
/// Lexical errors abort parsing and come back as `Err`. Malformed operands
/// are recorded in `errors()` and replaced with `Expr::Error` so the rest of
/// the expression still gets parsed.
pub struct Parser<'src> {
    tokenizer: Tokenizer<'src>,
    current: Token,
    peek: Token,
    errors: Vec<ParseError>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Parse error at {line}:{column}: {message}")]
pub struct ParseError {
    pub code: &'static str,
    pub line: usize,
    pub column: usize,
    pub span: Span,
    pub message: String,
}

type Result<T> = std::result::Result<T, LexError>;

impl<'src> Parser<'src> {
    /// Reads two tokens to fill `current` and `peek`.
    pub fn new(mut tokenizer: Tokenizer<'src>) -> Result<Self> {
        let current = tokenizer.next_token()?;
        let peek = tokenizer.next_token()?;
        Ok(Parser { tokenizer, current, peek, errors: Vec::new() })
    }

    /// Recoverable errors collected so far. Check this before trusting the
    /// tree returned by `parse_program`.
    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<ParseError> {
        self.errors
    }

    /// After `parse_program`: the first token the grammar did not consume,
    /// if the input did not end there.
    pub fn unconsumed(&self) -> Option<&Token> {
        (self.peek.kind != TokenKind::Eof).then_some(&self.peek)
    }

    fn next_token(&mut self) -> Result<()> {
        let next = self.tokenizer.next_token()?;
        self.current = std::mem::replace(&mut self.peek, next);
        Ok(())
    }

    fn error(&mut self, code: &'static str, message: String) {
        self.errors.push(ParseError {
            code,
            line: self.current.line,
            column: self.current.column,
            span: self.current.span,
            message,
        });
    }

    // ---- Top-level parsing ----

    pub fn parse_program(&mut self) -> Result<Program> {
        let expression = self.parse_expression()?;
        if let Some(token) = self.unconsumed() {
            // Only one expression is accepted; anything after it is left unread.
            log::warn!(
                "ignoring trailing input starting with {} {:?} at {}:{}",
                token.kind,
                token.lexeme,
                token.line,
                token.column
            );
        }
        log::debug!("parsed `{}` with {} error(s)", expression, self.errors.len());
        Ok(Program { expression })
    }

    fn parse_expression(&mut self) -> Result<Expr> {
        let mut left = self.parse_integer_literal();

        while matches!(self.peek.kind, TokenKind::Plus | TokenKind::Minus) {
            self.next_token()?; // onto the operator
            left = self.parse_infix_expression(left)?;
        }
        Ok(left)
    }

    fn parse_integer_literal(&mut self) -> Expr {
        let token = self.current.clone();

        if token.kind != TokenKind::IntegerLiteral {
            let found = match token.kind {
                TokenKind::Eof => "end of input".to_string(),
                kind if kind.is_keyword() => format!("reserved word '{}'", token.lexeme),
                kind => format!("{} {:?}", kind, token.lexeme),
            };
            self.error("BFY-P002", format!("expected integer literal, got {found}"));
            return Expr::Error { token };
        }

        match token.lexeme.parse::<i64>() {
            Ok(value) => Expr::Integer { value, token },
            Err(_) => {
                self.error("BFY-P001", format!("could not parse {:?} as integer", token.lexeme));
                Expr::Error { token }
            }
        }
    }

    fn parse_infix_expression(&mut self, left: Expr) -> Result<Expr> {
        let token = self.current.clone();
        let op = match token.kind {
            TokenKind::Minus => InfixOp::Sub,
            _ => InfixOp::Add,
        };

        self.next_token()?; // onto the right operand
        let right = self.parse_integer_literal();

        Ok(Expr::Infix { op, left: Box::new(left), right: Box::new(right), token })
    }
}

/// Parse a whole source text.
/// Returns `(program, errors)`. The program may contain `Expr::Error` poison
/// nodes; check `errors.is_empty()` before compiling it.
pub fn parse(source: &str) -> Result<(Program, Vec<ParseError>)> {
    let mut parser = Parser::new(Tokenizer::new(source))?;
    let program = parser.parse_program()?;
    Ok((program, parser.into_errors()))
}
