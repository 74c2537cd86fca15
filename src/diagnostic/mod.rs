pub mod ansi;
pub mod json;
pub mod registry;

use crate::ast::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone)]
pub struct Label {
    pub span: Span,
    pub message: String,
    pub is_primary: bool,
}

#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: Option<&'static str>,
    pub message: String,
    pub labels: Vec<Label>,
    pub notes: Vec<String>,
    pub suggestion: Option<String>,
    pub source: Option<String>,
}

impl Diagnostic {
    pub fn error(message: impl Into<String>) -> Self {
        Diagnostic {
            severity: Severity::Error,
            code: None,
            message: message.into(),
            labels: Vec::new(),
            notes: Vec::new(),
            suggestion: None,
            source: None,
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Diagnostic { severity: Severity::Warning, ..Diagnostic::error(message) }
    }

    pub fn with_code(mut self, code: &'static str) -> Self {
        self.code = Some(code);
        self
    }

    pub fn with_span(mut self, span: Span, label: impl Into<String>) -> Self {
        self.labels.push(Label { span, message: label.into(), is_primary: true });
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

// ---- From impls for each stage's error type ----

impl From<&crate::lexer::LexError> for Diagnostic {
    fn from(e: &crate::lexer::LexError) -> Self {
        Diagnostic::error(e.kind.to_string())
            .with_code(e.code())
            .with_span(e.span, "here")
            .with_note("lexical errors stop the whole pipeline")
            .with_suggestion(e.suggestion())
    }
}

impl From<&crate::parser::ParseError> for Diagnostic {
    fn from(e: &crate::parser::ParseError) -> Self {
        Diagnostic::error(&e.message).with_code(e.code).with_span(e.span, "here")
    }
}

impl From<&crate::vm::CompileError> for Diagnostic {
    fn from(e: &crate::vm::CompileError) -> Self {
        let d = Diagnostic::error(e.to_string()).with_code(e.code());
        match e {
            crate::vm::CompileError::MalformedExpression { span, .. } => {
                d.with_span(*span, "not a valid operand")
            }
            crate::vm::CompileError::ConstantPoolOverflow => {
                d.with_note("constant indices are encoded in 16 bits")
            }
        }
    }
}

impl From<&crate::vm::VmError> for Diagnostic {
    fn from(e: &crate::vm::VmError) -> Self {
        let d = Diagnostic::error(e.to_string()).with_code(e.code());
        match e {
            crate::vm::VmError::StackOverflow { .. } => d.with_suggestion("raise the limit with --stack-size"),
            crate::vm::VmError::StackAllocation { .. } => d.with_suggestion("choose a smaller --stack-size"),
            _ => d,
        }
    }
}

/// One diagnostic per underlying error; a parse failure can carry several.
impl From<&crate::Error> for Vec<Diagnostic> {
    fn from(e: &crate::Error) -> Self {
        match e {
            crate::Error::Lex(e) => vec![Diagnostic::from(e)],
            crate::Error::Parse(errors) => errors.iter().map(Diagnostic::from).collect(),
            crate::Error::Compile(e) => vec![Diagnostic::from(e)],
            crate::Error::Runtime(e) => vec![Diagnostic::from(e)],
        }
    }
}
