use std::fmt;

use logos::Logos;
use serde::{Serialize, Serializer};

use super::LexErrorKind;
use crate::ast::Span;

/// Every lexical class the tokenizer can produce.
///
/// The vocabulary covers a larger imperative language than the parser
/// currently accepts; only integer literals, `+` and `-` are consumed
/// downstream.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[logos(skip r"[ \t\n\r\x0B\x0C]+")]
#[logos(error = LexErrorKind)]
#[logos(extras = String)]
pub enum TokenKind {
    // Keywords
    #[token("public")]
    Public,
    #[token("class")]
    Class,
    #[token("static")]
    Static,
    #[token("void")]
    Void,
    #[token("main")]
    Main,
    #[token("char")]
    Char,
    #[token("int")]
    Int,
    #[token("printf")]
    Printf,
    #[token("scanf")]
    Scanf,
    #[token("switch")]
    Switch,
    #[token("case")]
    Case,
    #[token("default")]
    Default,
    #[token("for")]
    For,
    #[token("if")]
    If,
    #[token("else")]
    Else,
    #[token("while")]
    While,
    #[token("do")]
    Do,
    #[token("return")]
    Return,
    #[token("break")]
    Break,
    #[token("continue")]
    Continue,

    // Identifiers and literals
    #[regex(r"[A-Za-z][A-Za-z0-9]*")]
    Identifier,
    #[token("\"", string_literal)]
    StringLiteral,
    #[token("'", char_literal)]
    CharLiteral,
    #[regex(r"[0-9]+")]
    IntegerLiteral,

    // Operators
    #[token("=")]
    Assign,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Multiply,
    #[token("/")]
    Divide,
    #[token("<")]
    Less,
    #[token("<=")]
    LessEqual,
    #[token(">")]
    Greater,
    #[token(">=")]
    GreaterEqual,
    #[token("!=")]
    NotEqual,
    #[token("!")]
    Not,
    #[token("==")]
    Equal,

    // Punctuation
    #[token(",")]
    Comma,
    #[token(";")]
    Semicolon,
    #[token(":")]
    Colon,
    #[token("(")]
    LeftParen,
    #[token(")")]
    RightParen,
    #[token("{")]
    LeftBrace,
    #[token("}")]
    RightBrace,
    #[token("[")]
    LeftBracket,
    #[token("]")]
    RightBracket,

    /// Produced by the tokenizer wrapper, never by the scanner itself.
    Eof,
}

/// Reserved words and the kind each one lexes to.
pub static KEYWORDS: &[(&str, TokenKind)] = &[
    ("public", TokenKind::Public),
    ("class", TokenKind::Class),
    ("static", TokenKind::Static),
    ("void", TokenKind::Void),
    ("main", TokenKind::Main),
    ("char", TokenKind::Char),
    ("int", TokenKind::Int),
    ("printf", TokenKind::Printf),
    ("scanf", TokenKind::Scanf),
    ("switch", TokenKind::Switch),
    ("case", TokenKind::Case),
    ("default", TokenKind::Default),
    ("for", TokenKind::For),
    ("if", TokenKind::If),
    ("else", TokenKind::Else),
    ("while", TokenKind::While),
    ("do", TokenKind::Do),
    ("return", TokenKind::Return),
    ("break", TokenKind::Break),
    ("continue", TokenKind::Continue),
];

impl TokenKind {
    /// Fixed output code used by token dumps and the expected-output fixtures.
    pub fn code(self) -> &'static str {
        use TokenKind::*;
        match self {
            Public => "PUBLIC",
            Class => "CLASS",
            Static => "STATIC",
            Void => "VOIDTK",
            Main => "MAINTK",
            Char => "CHARTK",
            Int => "INTTK",
            Printf => "PRINTFTK",
            Scanf => "SCANFTK",
            Switch => "SWITCHTK",
            Case => "CASETK",
            Default => "DEFAULTTK",
            For => "FORTK",
            If => "IFTK",
            Else => "ELSETK",
            While => "WHILETK",
            Do => "DOTK",
            Return => "RETURNTK",
            Break => "BREAKTK",
            Continue => "CONTINUETK",
            Identifier => "IDENFR",
            StringLiteral => "STRCON",
            CharLiteral => "CHARCON",
            IntegerLiteral => "INTCON",
            Assign => "ASSIGN",
            Plus => "PLUS",
            Minus => "MINU",
            Multiply => "MULT",
            Divide => "DIV",
            Less => "LSS",
            LessEqual => "LEQ",
            Greater => "GRE",
            GreaterEqual => "GEQ",
            NotEqual => "NEQ",
            Not => "NOT",
            Equal => "EQL",
            Comma => "COMMA",
            Semicolon => "SEMICN",
            Colon => "COLON",
            LeftParen => "LPARENT",
            RightParen => "RPARENT",
            LeftBrace => "LBRACE",
            RightBrace => "RBRACE",
            LeftBracket => "LBRACK",
            RightBracket => "RBRACK",
            Eof => "EOF",
        }
    }

    pub fn is_keyword(self) -> bool {
        KEYWORDS.iter().any(|&(_, kind)| kind == self)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl Serialize for TokenKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

/// A classified, positioned fragment of source text.
///
/// `lexeme` is the source slice, except for character and string literals
/// where it holds the decoded value (quotes stripped, escapes resolved).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub line: usize,
    pub column: usize,
    #[serde(skip)]
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, line: usize, column: usize, span: Span) -> Self {
        Token { kind, lexeme: lexeme.into(), line, column, span }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:<8} {}", self.kind.code(), self.lexeme)
    }
}

// ---- Literal scanners ----
//
// Both run after logos has matched the opening quote. They consume the rest
// of the literal with `bump`, leave the decoded value in `extras`, and on
// failure bump past the offending input so the error span ends there.

fn unescape(escape: char) -> Option<char> {
    match escape {
        'n' => Some('\n'),
        't' => Some('\t'),
        'r' => Some('\r'),
        '\'' => Some('\''),
        '"' => Some('"'),
        '\\' => Some('\\'),
        _ => None,
    }
}

fn char_literal(lex: &mut logos::Lexer<TokenKind>) -> Result<(), LexErrorKind> {
    let rest = lex.remainder();
    let mut chars = rest.chars();

    let value = match chars.next() {
        None => return Err(LexErrorKind::UnterminatedChar),
        Some('\\') => {
            let Some(escape) = chars.next() else {
                lex.bump(1);
                return Err(LexErrorKind::UnterminatedChar);
            };
            lex.bump(1 + escape.len_utf8());
            unescape(escape).ok_or(LexErrorKind::InvalidEscape(escape))?
        }
        Some(c) => {
            lex.bump(c.len_utf8());
            c
        }
    };

    if !lex.remainder().starts_with('\'') {
        return Err(LexErrorKind::UnterminatedChar);
    }
    lex.bump(1);
    lex.extras = value.to_string();
    Ok(())
}

fn string_literal(lex: &mut logos::Lexer<TokenKind>) -> Result<(), LexErrorKind> {
    let rest = lex.remainder();
    let mut value = String::new();
    let mut chars = rest.char_indices();

    let scanned = loop {
        match chars.next() {
            None => break Err((rest.len(), LexErrorKind::UnterminatedString)),
            Some((i, '"')) => break Ok(i + 1),
            Some((_, '\\')) => match chars.next() {
                None => break Err((rest.len(), LexErrorKind::UnterminatedString)),
                Some((i, escape)) => match unescape(escape) {
                    Some(c) => value.push(c),
                    None => break Err((i + escape.len_utf8(), LexErrorKind::InvalidEscape(escape))),
                },
            },
            Some((_, c)) => value.push(c),
        }
    };

    match scanned {
        Ok(consumed) => {
            lex.bump(consumed);
            lex.extras = value;
            Ok(())
        }
        Err((consumed, kind)) => {
            lex.bump(consumed);
            Err(kind)
        }
    }
}
