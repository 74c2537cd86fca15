pub mod bytecode;
pub mod compiler;

pub use bytecode::{Bytecode, Definition, Instructions, Opcode};
pub use compiler::{CompileError, Compiler, compile};

use bytecode::read_operands;

/// Default value stack capacity.
pub const STACK_SIZE: usize = 2048;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VmConfig {
    pub stack_capacity: usize,
}

impl Default for VmConfig {
    fn default() -> Self {
        VmConfig { stack_capacity: STACK_SIZE }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VmError {
    #[error("stack overflow: capacity {capacity} exceeded at ip {ip}")]
    StackOverflow { capacity: usize, ip: usize },
    #[error("stack underflow at ip {ip}")]
    StackUnderflow { ip: usize },
    #[error("unknown opcode: {op} at ip {ip}")]
    UnknownOpcode { op: u8, ip: usize },
    #[error("truncated {name} instruction at ip {ip}")]
    TruncatedInstruction { name: &'static str, ip: usize },
    #[error("constant index {index} out of range (pool has {len})")]
    ConstantOutOfRange { index: usize, len: usize },
    #[error("cannot allocate a value stack of {capacity} slots")]
    StackAllocation { capacity: usize },
}

impl VmError {
    pub fn code(&self) -> &'static str {
        match self {
            VmError::StackOverflow { .. } => "BFY-R001",
            VmError::StackUnderflow { .. } => "BFY-R002",
            VmError::UnknownOpcode { .. } => "BFY-R003",
            VmError::TruncatedInstruction { .. } => "BFY-R004",
            VmError::ConstantOutOfRange { .. } => "BFY-R005",
            VmError::StackAllocation { .. } => "BFY-R006",
        }
    }
}

type VmResult<T> = Result<T, VmError>;

/// Stack machine over one compiled artifact.
///
/// The stack is allocated once at construction and never grows; `sp` is one
/// past the top occupied slot.
pub struct Vm {
    bytecode: Bytecode,
    stack: Vec<i64>,
    sp: usize,
}

impl Vm {
    pub fn new(bytecode: Bytecode) -> Self {
        Vm { bytecode, stack: vec![0; STACK_SIZE], sp: 0 }
    }

    /// Fails instead of aborting when the requested stack cannot be allocated.
    pub fn with_config(bytecode: Bytecode, config: VmConfig) -> VmResult<Self> {
        let capacity = config.stack_capacity;
        let mut stack = Vec::new();
        stack
            .try_reserve_exact(capacity)
            .map_err(|_| VmError::StackAllocation { capacity })?;
        stack.resize(capacity, 0);
        Ok(Vm { bytecode, stack, sp: 0 })
    }

    pub fn capacity(&self) -> usize {
        self.stack.len()
    }

    pub fn sp(&self) -> usize {
        self.sp
    }

    /// Top of the stack without popping it; `None` when empty.
    pub fn stack_top(&self) -> Option<i64> {
        self.sp.checked_sub(1).map(|top| self.stack[top])
    }

    fn push(&mut self, value: i64, ip: usize) -> VmResult<()> {
        if self.sp >= self.stack.len() {
            return Err(VmError::StackOverflow { capacity: self.stack.len(), ip });
        }
        self.stack[self.sp] = value;
        self.sp += 1;
        Ok(())
    }

    fn pop(&mut self, ip: usize) -> VmResult<i64> {
        if self.sp == 0 {
            return Err(VmError::StackUnderflow { ip });
        }
        self.sp -= 1;
        Ok(self.stack[self.sp])
    }

    pub fn run(&mut self) -> VmResult<()> {
        let mut ip = 0;
        while ip < self.bytecode.instructions.len() {
            let byte = self.bytecode.instructions[ip];
            let op = Opcode::try_from(byte).map_err(|op| VmError::UnknownOpcode { op, ip })?;

            match op {
                Opcode::Constant => {
                    let def = op.definition();
                    let (operands, read) = read_operands(def, &self.bytecode.instructions[ip + 1..])
                        .ok_or(VmError::TruncatedInstruction { name: def.name, ip })?;
                    let index = operands[0];
                    let value = *self.bytecode.constants.get(index).ok_or(VmError::ConstantOutOfRange {
                        index,
                        len: self.bytecode.constants.len(),
                    })?;
                    log::trace!("{ip:04} {} {index} -> {value}", def.name);
                    self.push(value, ip)?;
                    ip += 1 + read;
                }
                Opcode::Add | Opcode::Sub => {
                    // both operands or neither
                    if self.sp < 2 {
                        return Err(VmError::StackUnderflow { ip });
                    }
                    // right was pushed last
                    let right = self.pop(ip)?;
                    let left = self.pop(ip)?;
                    let result = match op {
                        Opcode::Add => left.wrapping_add(right),
                        _ => left.wrapping_sub(right),
                    };
                    log::trace!("{ip:04} {op} {left} {right} -> {result}");
                    self.push(result, ip)?;
                    ip += 1;
                }
            }
        }
        log::debug!("halted with sp={} top={:?}", self.sp, self.stack_top());
        Ok(())
    }
}
