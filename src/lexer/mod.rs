use logos::Logos;

use crate::ast::Span;

mod token;
pub use token::{KEYWORDS, Token, TokenKind};

/// What went wrong while scanning. Also serves as the scanner's error type,
/// so the default value stands in for "no rule matched here".
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LexErrorKind {
    #[error("unexpected character '{}'", .0.escape_debug())]
    UnexpectedCharacter(char),
    #[error("invalid escape sequence '\\{}'", .0.escape_debug())]
    InvalidEscape(char),
    #[error("unterminated character literal")]
    UnterminatedChar,
    #[error("unterminated string literal")]
    UnterminatedString,
}

impl Default for LexErrorKind {
    fn default() -> Self {
        LexErrorKind::UnexpectedCharacter(char::REPLACEMENT_CHARACTER)
    }
}

/// A lexical failure. These are fatal: once one is returned the token
/// stream cannot be trusted past it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} at {line}:{column}")]
pub struct LexError {
    pub kind: LexErrorKind,
    pub span: Span,
    pub line: usize,
    pub column: usize,
}

impl LexError {
    pub fn code(&self) -> &'static str {
        match self.kind {
            LexErrorKind::UnexpectedCharacter(_) => "BFY-L001",
            LexErrorKind::InvalidEscape(_) => "BFY-L002",
            LexErrorKind::UnterminatedChar => "BFY-L003",
            LexErrorKind::UnterminatedString => "BFY-L004",
        }
    }

    /// Every lex error comes with a suggested fix.
    pub fn suggestion(&self) -> String {
        match self.kind {
            LexErrorKind::UnexpectedCharacter(c) if c.is_alphabetic() => {
                "Identifiers may only contain ASCII letters and digits".to_string()
            }
            LexErrorKind::UnexpectedCharacter(c) => {
                format!("Remove '{}'; it is not part of the language", c.escape_debug())
            }
            LexErrorKind::InvalidEscape(_) => {
                r#"Supported escapes are \n \t \r \' \" and \\"#.to_string()
            }
            LexErrorKind::UnterminatedChar => {
                "A character literal holds exactly one character, e.g. 'a' or '\\n'".to_string()
            }
            LexErrorKind::UnterminatedString => "Add the closing '\"'".to_string(),
        }
    }
}

/// Lazy, forward-only token stream over one source text.
///
/// Line and column are running counters advanced over every byte the
/// scanner passes, so positions are only ever computed moving forward.
/// Once the input is exhausted `next_token` keeps returning `Eof`.
pub struct Tokenizer<'src> {
    source: &'src str,
    lexer: logos::Lexer<'src, TokenKind>,
    offset: usize,
    line: usize,
    column: usize,
    finished: bool,
}

impl<'src> Tokenizer<'src> {
    pub fn new(source: &'src str) -> Self {
        Tokenizer {
            source,
            lexer: TokenKind::lexer(source),
            offset: 0,
            line: 1,
            column: 1,
            finished: false,
        }
    }

    pub fn source(&self) -> &'src str {
        self.source
    }

    pub fn next_token(&mut self) -> Result<Token, LexError> {
        let token = match self.lexer.next() {
            Some(Ok(kind)) => {
                let span = Span::from(self.lexer.span());
                let lexeme = match kind {
                    TokenKind::CharLiteral | TokenKind::StringLiteral => {
                        std::mem::take(&mut self.lexer.extras)
                    }
                    _ => self.lexer.slice().to_string(),
                };
                let (line, column) = self.advance_to(span.start);
                Token::new(kind, lexeme, line, column, span)
            }
            Some(Err(kind)) => return Err(self.error(kind)),
            None => {
                let end = self.source.len();
                let (line, column) = self.advance_to(end);
                Token::new(TokenKind::Eof, "", line, column, Span::new(end, end))
            }
        };
        log::trace!("{}:{} {}", token.line, token.column, token);
        Ok(token)
    }

    /// Moves the line/column counters forward to `target`.
    fn advance_to(&mut self, target: usize) -> (usize, usize) {
        if target > self.offset {
            let passed = self.source.as_bytes().get(self.offset..target).unwrap_or(&[]);
            for &b in passed {
                if b == b'\n' {
                    self.line += 1;
                    self.column = 1;
                } else {
                    self.column += 1;
                }
            }
            self.offset = target;
        }
        (self.line, self.column)
    }

    fn error(&mut self, kind: LexErrorKind) -> LexError {
        let span = Span::from(self.lexer.span());
        let (kind, at) = match kind {
            LexErrorKind::UnexpectedCharacter(_) => {
                let ch = self.lexer.slice().chars().next().unwrap_or(char::REPLACEMENT_CHARACTER);
                (LexErrorKind::UnexpectedCharacter(ch), span.start)
            }
            LexErrorKind::InvalidEscape(escape) => {
                (kind, span.end.saturating_sub(escape.len_utf8()))
            }
            LexErrorKind::UnterminatedChar | LexErrorKind::UnterminatedString => (kind, span.start),
        };
        let end = match kind {
            LexErrorKind::UnexpectedCharacter(ch) => at + ch.len_utf8(),
            _ => span.end,
        };
        let (line, column) = self.advance_to(at);
        LexError { kind, span: Span::new(at, end.max(at)), line, column }
    }
}

/// Yields tokens up to and including the first `Eof` or the first error.
impl Iterator for Tokenizer<'_> {
    type Item = Result<Token, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let item = self.next_token();
        self.finished = match &item {
            Ok(token) => token.kind == TokenKind::Eof,
            Err(_) => true,
        };
        Some(item)
    }
}

/// Lex source code into the full token list, ending with `Eof`.
/// Returns the first lexical error instead of a partial list.
pub fn lex(source: &str) -> Result<Vec<Token>, LexError> {
    let tokens: Vec<Token> = Tokenizer::new(source).collect::<Result<_, _>>()?;
    log::debug!("lexed {} token(s) from {} byte(s)", tokens.len(), source.len());
    Ok(tokens)
}
