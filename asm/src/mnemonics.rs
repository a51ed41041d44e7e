//! Matches a mnemonic plus its parsed operands against the shape the
//! encoding table requires: operand counts and shapes must match the
//! mnemonic.

use vm16::Instruction;

use crate::ast::Operand;
use crate::error::AssembleError;
use crate::labels::LabelTable;

fn operand_count_err(
    line: usize,
    mnemonic: &str,
    expected: usize,
    operands: &[Operand],
) -> AssembleError {
    AssembleError::OperandArity {
        line,
        mnemonic: mnemonic.to_string(),
        expected,
        found: operands.len(),
    }
}

fn as_register(operand: &Operand, line: usize, mnemonic: &str, index: usize) -> Result<u8, AssembleError> {
    match *operand {
        Operand::Register(id) => Ok(id),
        _ => Err(AssembleError::OperandShape {
            line,
            mnemonic: mnemonic.to_string(),
            index,
        }),
    }
}

/// An operand expected to carry a numeric value in `[lo, hi]` once masked:
/// an immediate, or `offset(Rs)`'s offset half.
fn as_ranged_value(
    operand: &Operand,
    lo: i64,
    hi: i64,
    bits: u32,
    line: usize,
    mnemonic: &str,
    index: usize,
) -> Result<i64, AssembleError> {
    let value = match *operand {
        Operand::Immediate(v) => v as i64,
        Operand::Indexed(v, _) => v as i64,
        _ => {
            return Err(AssembleError::OperandShape {
                line,
                mnemonic: mnemonic.to_string(),
                index,
            })
        }
    };
    if value < lo || value > hi {
        return Err(AssembleError::ImmediateOutOfRange { line, value, bits });
    }
    Ok(value)
}

/// imm8 accepts the union of the signed and zero-extended ranges: immediates
/// are masked to the field width at encode time, so both `-128..=127` (for
/// LOADI/branches) and `0..=255` (for ADDI's zero-extension) must round-trip
/// through one literal syntax.
fn as_imm8(operand: &Operand, line: usize, mnemonic: &str, index: usize) -> Result<u8, AssembleError> {
    let v = as_ranged_value(operand, -128, 255, 8, line, mnemonic, index)?;
    Ok(v as u8)
}

fn as_offset4(operand: &Operand, line: usize, mnemonic: &str, index: usize) -> Result<u8, AssembleError> {
    let v = as_ranged_value(operand, 0, 15, 4, line, mnemonic, index)?;
    Ok(v as u8)
}

fn indexed_register(operand: &Operand, line: usize, mnemonic: &str, index: usize) -> Result<u8, AssembleError> {
    match *operand {
        Operand::Indexed(_, rs) => Ok(rs),
        _ => Err(AssembleError::OperandShape {
            line,
            mnemonic: mnemonic.to_string(),
            index,
        }),
    }
}

/// Resolves a JMP target: a label or a bare immediate, both truncated to the
/// low 12 bits of a byte address (no alignment shift).
fn resolve_addr12(operand: &Operand, line: usize, labels: &LabelTable) -> Result<u16, AssembleError> {
    let address = match operand {
        Operand::Label(name) => labels.resolve(name, line)?,
        Operand::Immediate(v) => *v as u16,
        _ => {
            return Err(AssembleError::OperandShape {
                line,
                mnemonic: "JMP".to_string(),
                index: 0,
            })
        }
    };
    Ok(address & 0x0FFF)
}

/// Resolves a BEQ/BNE target to its pc-relative imm8 offset: `(target -
/// (address + 2)) / 2`, rejecting anything that doesn't fit a signed 8-bit
/// field as `BranchOutOfRange` rather than silently wrapping.
fn resolve_branch_offset(
    operand: &Operand,
    address: u16,
    line: usize,
    mnemonic: &str,
    labels: &LabelTable,
) -> Result<u8, AssembleError> {
    let target = match operand {
        Operand::Label(name) => labels.resolve(name, line)?,
        Operand::Immediate(v) => *v as u16,
        _ => {
            return Err(AssembleError::OperandShape {
                line,
                mnemonic: mnemonic.to_string(),
                index: 1,
            })
        }
    };
    let from = address as i32 + 2;
    let delta = target as i32 - from;
    if delta % 2 != 0 {
        return Err(AssembleError::BranchOutOfRange {
            line,
            from: address,
            target: target as u32,
        });
    }
    let offset = delta / 2;
    if !(-128..=127).contains(&offset) {
        return Err(AssembleError::BranchOutOfRange {
            line,
            from: address,
            target: target as u32,
        });
    }
    Ok(offset as i8 as u8)
}

/// Translates one parsed line into the `Instruction` the codec encodes,
/// resolving any label reference against the (by now complete) label table.
pub fn to_instruction(
    mnemonic: &str,
    operands: &[Operand],
    address: u16,
    line: usize,
    labels: &LabelTable,
) -> Result<Instruction, AssembleError> {
    let upper = mnemonic.to_ascii_uppercase();
    let m = upper.as_str();

    let arity = |n: usize| -> Result<(), AssembleError> {
        if operands.len() != n {
            Err(operand_count_err(line, m, n, operands))
        } else {
            Ok(())
        }
    };

    match m {
        "NOP" => {
            arity(0)?;
            Ok(Instruction::Nop)
        }
        "HALT" => {
            arity(0)?;
            Ok(Instruction::Halt)
        }
        "ADD" | "SUB" | "AND" | "OR" | "XOR" | "SHL" | "SHR" => {
            arity(3)?;
            let rd = as_register(&operands[0], line, m, 0)?;
            let rs = as_register(&operands[1], line, m, 1)?;
            let rt = as_register(&operands[2], line, m, 2)?;
            Ok(match m {
                "ADD" => Instruction::Add { rd, rs, rt },
                "SUB" => Instruction::Sub { rd, rs, rt },
                "AND" => Instruction::And { rd, rs, rt },
                "OR" => Instruction::Or { rd, rs, rt },
                "XOR" => Instruction::Xor { rd, rs, rt },
                "SHL" => Instruction::Shl { rd, rs, rt },
                "SHR" => Instruction::Shr { rd, rs, rt },
                _ => unreachable!(),
            })
        }
        "NOT" => {
            arity(2)?;
            let rd = as_register(&operands[0], line, m, 0)?;
            let rs = as_register(&operands[1], line, m, 1)?;
            Ok(Instruction::Not { rd, rs })
        }
        "ADDI" | "LOADI" => {
            arity(2)?;
            let rd = as_register(&operands[0], line, m, 0)?;
            let imm8 = as_imm8(&operands[1], line, m, 1)?;
            Ok(if m == "ADDI" {
                Instruction::Addi { rd, imm8 }
            } else {
                Instruction::Loadi { rd, imm8 }
            })
        }
        "LOAD" | "STORE" => {
            arity(2)?;
            let rd = as_register(&operands[0], line, m, 0)?;
            let rs = indexed_register(&operands[1], line, m, 1)?;
            let offset4 = as_offset4(&operands[1], line, m, 1)?;
            Ok(if m == "LOAD" {
                Instruction::Load { rd, rs, offset4 }
            } else {
                Instruction::Store { rd, rs, offset4 }
            })
        }
        "JMP" => {
            arity(1)?;
            let addr12 = resolve_addr12(&operands[0], line, labels)?;
            Ok(Instruction::Jmp { addr12 })
        }
        "BEQ" | "BNE" => {
            arity(2)?;
            let rd = as_register(&operands[0], line, m, 0)?;
            let imm8 = resolve_branch_offset(&operands[1], address, line, m, labels)?;
            Ok(if m == "BEQ" {
                Instruction::Beq { rd, imm8 }
            } else {
                Instruction::Bne { rd, imm8 }
            })
        }
        other => Err(AssembleError::UnknownMnemonic {
            line,
            mnemonic: other.to_string(),
        }),
    }
}
