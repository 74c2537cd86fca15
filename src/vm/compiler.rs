use crate::ast::*;

use super::bytecode::{Bytecode, Instructions, Opcode, make};

/// Largest constant pool an `OpConstant` operand can address.
pub const MAX_CONSTANTS: usize = u16::MAX as usize + 1;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompileError {
    #[error("malformed expression {lexeme:?} at {line}:{column}")]
    MalformedExpression { lexeme: String, line: usize, column: usize, span: Span },
    #[error("too many constants: the pool is limited to {MAX_CONSTANTS} entries")]
    ConstantPoolOverflow,
}

impl CompileError {
    pub fn code(&self) -> &'static str {
        match self {
            CompileError::MalformedExpression { .. } => "BFY-C001",
            CompileError::ConstantPoolOverflow => "BFY-C002",
        }
    }
}

type Result<T> = std::result::Result<T, CompileError>;

/// Single-pass, post-order tree walk into one bytecode artifact.
#[derive(Debug, Default)]
pub struct Compiler {
    instructions: Instructions,
    constants: Vec<i64>,
}

impl Compiler {
    pub fn new() -> Self {
        Compiler::default()
    }

    pub fn compile(&mut self, program: &Program) -> Result<()> {
        self.compile_expr(&program.expression)?;
        log::debug!(
            "compiled {} bytes of instructions, {} constant(s)",
            self.instructions.len(),
            self.constants.len()
        );
        Ok(())
    }

    fn compile_expr(&mut self, expr: &Expr) -> Result<()> {
        match expr {
            Expr::Infix { op, left, right, .. } => {
                self.compile_expr(left)?;
                self.compile_expr(right)?;
                match op {
                    InfixOp::Add => self.emit(Opcode::Add, &[]),
                    InfixOp::Sub => self.emit(Opcode::Sub, &[]),
                };
            }
            Expr::Integer { value, .. } => {
                let idx = self.add_constant(*value)?;
                self.emit(Opcode::Constant, &[idx]);
            }
            Expr::Error { token } => {
                return Err(CompileError::MalformedExpression {
                    lexeme: token.lexeme.clone(),
                    line: token.line,
                    column: token.column,
                    span: token.span,
                });
            }
        }
        Ok(())
    }

    /// Appends to the pool and returns the new entry's index.
    fn add_constant(&mut self, value: i64) -> Result<usize> {
        if self.constants.len() >= MAX_CONSTANTS {
            return Err(CompileError::ConstantPoolOverflow);
        }
        self.constants.push(value);
        Ok(self.constants.len() - 1)
    }

    fn emit(&mut self, op: Opcode, operands: &[usize]) -> usize {
        self.instructions.push(&make(op, operands))
    }

    pub fn bytecode(self) -> Bytecode {
        Bytecode { instructions: self.instructions, constants: self.constants }
    }
}

/// Compile a program in one go.
pub fn compile(program: &Program) -> Result<Bytecode> {
    let mut compiler = Compiler::new();
    compiler.compile(program)?;
    Ok(compiler.bytecode())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser;

    fn parse_program(source: &str) -> Program {
        let (prog, errors) = parser::parse(source).unwrap();
        assert!(errors.is_empty(), "parse errors: {:?}", errors);
        prog
    }

    fn concat(parts: Vec<Vec<u8>>) -> Vec<u8> {
        parts.concat()
    }

    #[test]
    fn compile_additive_chain() {
        let bytecode = compile(&parse_program("12 + 7 - 5")).unwrap();
        assert_eq!(bytecode.constants, vec![12, 7, 5]);
        assert_eq!(
            &bytecode.instructions[..],
            &concat(vec![
                make(Opcode::Constant, &[0]),
                make(Opcode::Constant, &[1]),
                make(Opcode::Add, &[]),
                make(Opcode::Constant, &[2]),
                make(Opcode::Sub, &[]),
            ])[..]
        );
        assert_eq!(
            bytecode.instructions.to_string(),
            "OpConstant 0\nOpConstant 1\nOpAdd\nOpConstant 2\nOpSub\n"
        );
    }

    #[test]
    fn compile_single_literal() {
        let bytecode = compile(&parse_program("42")).unwrap();
        assert_eq!(bytecode.constants, vec![42]);
        assert_eq!(&bytecode.instructions[..], &[0, 0, 0]);
    }

    #[test]
    fn repeated_values_get_their_own_slots() {
        let bytecode = compile(&parse_program("1 + 1")).unwrap();
        assert_eq!(bytecode.constants, vec![1, 1]);
        assert_eq!(bytecode.instructions.to_string(), "OpConstant 0\nOpConstant 1\nOpAdd\n");
    }

    #[test]
    fn poison_node_is_rejected() {
        let (prog, errors) = parser::parse("1 + x").unwrap();
        assert_eq!(errors.len(), 1);
        let err = compile(&prog).unwrap_err();
        match &err {
            CompileError::MalformedExpression { lexeme, line, column, .. } => {
                assert_eq!(lexeme, "x");
                assert_eq!((*line, *column), (1, 5));
            }
            other => panic!("expected malformed expression, got {other:?}"),
        }
        assert_eq!(err.code(), "BFY-C001");
    }

    #[test]
    fn constant_pool_limit_is_enforced() {
        let mut compiler = Compiler::new();
        compiler.constants = vec![0; MAX_CONSTANTS - 1];
        // the last addressable slot is still fine
        compiler.compile(&parse_program("7")).unwrap();
        assert_eq!(compiler.constants.len(), MAX_CONSTANTS);
        assert_eq!(&compiler.instructions[..], &[0, 0xFF, 0xFF]);
        // one more overflows instead of wrapping back to index 0
        let err = compiler.compile(&parse_program("8")).unwrap_err();
        assert_eq!(err, CompileError::ConstantPoolOverflow);
        assert_eq!(compiler.constants.len(), MAX_CONSTANTS);
    }
}
