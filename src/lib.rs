//! butterfly: source text → tokens → expression tree → bytecode → result.
//!
//! Each stage is usable on its own (`lexer`, `parser`, `vm::compiler`,
//! `vm`); the functions here chain them and fold their failures into one
//! [`Error`].

pub mod ast;
pub mod diagnostic;
pub mod lexer;
pub mod parser;
pub mod vm;

use lexer::LexError;
use parser::ParseError;
use vm::{Bytecode, CompileError, Vm, VmConfig, VmError};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error("{}", summarize(.0))]
    Parse(Vec<ParseError>),
    #[error(transparent)]
    Compile(#[from] CompileError),
    #[error(transparent)]
    Runtime(#[from] VmError),
}

fn summarize(errors: &[ParseError]) -> String {
    match errors {
        [] => "parse failed".to_string(),
        [only] => only.to_string(),
        [first, rest @ ..] => format!("{first} (and {} more)", rest.len()),
    }
}

impl Error {
    /// Lexical errors abort the pipeline outright; every other stage reports
    /// after having done as much work as it could.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Lex(_))
    }
}

/// Tokenize, parse and compile `source`.
pub fn compile(source: &str) -> Result<Bytecode, Error> {
    let (program, errors) = parser::parse(source)?;
    if !errors.is_empty() {
        return Err(Error::Parse(errors));
    }
    Ok(vm::compile(&program)?)
}

/// Run `source` to completion on a default-sized VM.
/// `Ok(None)` means the program left nothing on the stack.
pub fn run(source: &str) -> Result<Option<i64>, Error> {
    run_with_config(source, VmConfig::default())
}

pub fn run_with_config(source: &str, config: VmConfig) -> Result<Option<i64>, Error> {
    let bytecode = compile(source)?;
    let mut machine = Vm::with_config(bytecode, config)?;
    machine.run()?;
    Ok(machine.stack_top())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_end_to_end() {
        assert_eq!(run("12 + 7 - 5"), Ok(Some(14)));
        assert_eq!(run("  42\n"), Ok(Some(42)));
    }

    #[test]
    fn compile_end_to_end() {
        let bytecode = compile("12 + 7 - 5").unwrap();
        assert_eq!(bytecode.constants, vec![12, 7, 5]);
        assert_eq!(
            bytecode.instructions.to_string(),
            "OpConstant 0\nOpConstant 1\nOpAdd\nOpConstant 2\nOpSub\n"
        );
    }

    #[test]
    fn lex_errors_are_fatal() {
        let err = run("1 + @").unwrap_err();
        assert!(matches!(err, Error::Lex(_)));
        assert!(err.is_fatal());
        assert_eq!(err.to_string(), "unexpected character '@' at 1:5");
    }

    #[test]
    fn parse_errors_are_collected() {
        let err = run("99999999999999999999 + x").unwrap_err();
        match &err {
            Error::Parse(errors) => assert_eq!(errors.len(), 2),
            other => panic!("expected parse errors, got {other:?}"),
        }
        assert!(!err.is_fatal());
        assert!(err.to_string().contains("(and 1 more)"));
    }

    #[test]
    fn runtime_errors_surface() {
        let err = run_with_config("1 + 2", VmConfig { stack_capacity: 1 }).unwrap_err();
        assert_eq!(err, Error::Runtime(VmError::StackOverflow { capacity: 1, ip: 3 }));
    }

    #[test]
    fn oversized_stack_is_reported_not_aborted() {
        let err = run_with_config("1", VmConfig { stack_capacity: usize::MAX }).unwrap_err();
        assert_eq!(err, Error::Runtime(VmError::StackAllocation { capacity: usize::MAX }));
        assert!(!err.is_fatal());
    }

    #[test]
    fn zero_capacity_overflows_on_first_push() {
        let err = run_with_config("1", VmConfig { stack_capacity: 0 }).unwrap_err();
        assert_eq!(err, Error::Runtime(VmError::StackOverflow { capacity: 0, ip: 0 }));
    }
}
