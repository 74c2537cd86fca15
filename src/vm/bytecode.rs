use std::fmt;
use std::ops::Deref;

use serde::Serialize;

// ── Opcodes ─────────────────────────────────────────────────────────
//
// Every instruction is one opcode byte followed by its operands, each
// big-endian at the width listed in the opcode's definition.

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    /// Push `constants[operand]`. Operand: u16 pool index.
    Constant = 0,
    /// Pop right, pop left, push `left + right`.
    Add = 1,
    /// Pop right, pop left, push `left - right`.
    Sub = 2,
}

/// Name and operand layout of one opcode.
#[derive(Debug, PartialEq, Eq)]
pub struct Definition {
    pub name: &'static str,
    pub operand_widths: &'static [usize],
}

impl Definition {
    /// Total encoded width: opcode byte plus operands.
    pub fn width(&self) -> usize {
        1 + self.operand_widths.iter().sum::<usize>()
    }
}

static DEFINITIONS: [Definition; 3] = [
    Definition { name: "OpConstant", operand_widths: &[2] },
    Definition { name: "OpAdd", operand_widths: &[] },
    Definition { name: "OpSub", operand_widths: &[] },
];

impl Opcode {
    pub fn definition(self) -> &'static Definition {
        &DEFINITIONS[self as usize]
    }
}

impl TryFrom<u8> for Opcode {
    type Error = u8;

    fn try_from(byte: u8) -> Result<Self, u8> {
        match byte {
            0 => Ok(Opcode::Constant),
            1 => Ok(Opcode::Add),
            2 => Ok(Opcode::Sub),
            other => Err(other),
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.definition().name)
    }
}

// ── Instruction encoding ────────────────────────────────────────────

/// Encode one instruction. Operands beyond those the opcode declares are
/// ignored; each operand is truncated to its declared width.
pub fn make(op: Opcode, operands: &[usize]) -> Vec<u8> {
    let def = op.definition();
    let mut ins = Vec::with_capacity(def.width());
    ins.push(op as u8);
    for (&operand, &width) in operands.iter().zip(def.operand_widths) {
        match width {
            2 => ins.extend_from_slice(&(operand as u16).to_be_bytes()),
            _ => ins.push(operand as u8),
        }
    }
    ins
}

#[inline(always)]
pub fn read_u16(bytes: &[u8]) -> Option<u16> {
    match bytes {
        [hi, lo, ..] => Some(u16::from_be_bytes([*hi, *lo])),
        _ => None,
    }
}

/// Decode the operands of the instruction whose opcode byte precedes `bytes`.
/// Returns the operands and how many bytes they took, or `None` when the
/// stream ends early.
pub fn read_operands(def: &Definition, bytes: &[u8]) -> Option<(Vec<usize>, usize)> {
    let mut operands = Vec::with_capacity(def.operand_widths.len());
    let mut offset = 0;
    for &width in def.operand_widths {
        let operand = match width {
            2 => read_u16(bytes.get(offset..)?)? as usize,
            _ => *bytes.get(offset)? as usize,
        };
        operands.push(operand);
        offset += width;
    }
    Some((operands, offset))
}

// ── Instruction stream ──────────────────────────────────────────────

/// Raw encoded instructions. `Display` renders the disassembly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Instructions(Vec<u8>);

impl Instructions {
    pub fn new() -> Self {
        Instructions(Vec::new())
    }

    pub fn push(&mut self, ins: &[u8]) -> usize {
        let pos = self.0.len();
        self.0.extend_from_slice(ins);
        pos
    }
}

impl Deref for Instructions {
    type Target = [u8];
    fn deref(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for Instructions {
    fn from(bytes: Vec<u8>) -> Self {
        Instructions(bytes)
    }
}

impl FromIterator<Vec<u8>> for Instructions {
    fn from_iter<I: IntoIterator<Item = Vec<u8>>>(iter: I) -> Self {
        Instructions(iter.into_iter().flatten().collect())
    }
}

impl fmt::Display for Instructions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ip = 0;
        while ip < self.0.len() {
            let op = match Opcode::try_from(self.0[ip]) {
                Ok(op) => op,
                Err(byte) => {
                    writeln!(f, "ERROR: unknown opcode {byte} at {ip}")?;
                    ip += 1;
                    continue;
                }
            };
            let def = op.definition();
            let Some((operands, read)) = read_operands(def, &self.0[ip + 1..]) else {
                writeln!(f, "ERROR: truncated {} at {ip}", def.name)?;
                break;
            };
            write!(f, "{}", def.name)?;
            for operand in operands {
                write!(f, " {operand}")?;
            }
            writeln!(f)?;
            ip += 1 + read;
        }
        Ok(())
    }
}

// ── Artifact ────────────────────────────────────────────────────────

/// Compiled program: the instruction stream and the constant pool its
/// `OpConstant` operands index into. Only meaningful as a pair.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Bytecode {
    pub instructions: Instructions,
    pub constants: Vec<i64>,
}
