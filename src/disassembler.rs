//! Pure inverse of the codec. Holds no architectural state and
//! never executes anything.

use crate::codec::{decode, sign_extend_imm8, Instruction};

/// One disassembled instruction.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DisassembledRecord {
    pub byte_address: u16,
    pub raw_word: u16,
    pub mnemonic: &'static str,
    pub operands: String,
    pub comment: String,
}

fn format_reg(id: u8) -> String {
    format!("R{:X}", id)
}

fn format_imm8(v: u8) -> String {
    format!("0x{:02X}", v)
}

fn format_addr12(v: u16) -> String {
    format!("0x{:03X}", v)
}

fn operand_text(instr: &Instruction) -> String {
    match *instr {
        Instruction::Nop | Instruction::Halt => String::new(),
        Instruction::Add { rd, rs, rt }
        | Instruction::Sub { rd, rs, rt }
        | Instruction::And { rd, rs, rt }
        | Instruction::Or { rd, rs, rt }
        | Instruction::Xor { rd, rs, rt }
        | Instruction::Shl { rd, rs, rt }
        | Instruction::Shr { rd, rs, rt } => {
            format!("{}, {}, {}", format_reg(rd), format_reg(rs), format_reg(rt))
        }
        Instruction::Not { rd, rs } => format!("{}, {}", format_reg(rd), format_reg(rs)),
        Instruction::Addi { rd, imm8 } | Instruction::Loadi { rd, imm8 } => {
            format!("{}, {}", format_reg(rd), format_imm8(imm8))
        }
        Instruction::Load { rd, rs, offset4 } | Instruction::Store { rd, rs, offset4 } => {
            format!("{}, {}({})", format_reg(rd), offset4, format_reg(rs))
        }
        Instruction::Jmp { addr12 } => format_addr12(addr12),
        Instruction::Beq { rd, imm8 } | Instruction::Bne { rd, imm8 } => {
            format!("{}, {}", format_reg(rd), sign_extend_imm8(imm8) as i16)
        }
        Instruction::Unknown { opcode } => format!("0x{:X}", opcode),
    }
}

fn comment_text(byte_address: u16, instr: &Instruction) -> String {
    match *instr {
        Instruction::Beq { imm8, .. } | Instruction::Bne { imm8, .. } => {
            let offset = sign_extend_imm8(imm8) as i16 as i32 * 2;
            let target = (byte_address as i32 + 2 + offset) as u16;
            format!("-> 0x{:04X}", target)
        }
        Instruction::Jmp { addr12 } => format!("-> 0x{:03X}", addr12),
        _ => String::new(),
    }
}

/// Disassembles one code word at the given byte address.
pub fn disassemble_one(byte_address: u16, word: u16) -> DisassembledRecord {
    let instr = decode(word);
    let mnemonic = if matches!(instr, Instruction::Unknown { .. }) {
        "???"
    } else {
        instr.mnemonic()
    };

    DisassembledRecord {
        byte_address,
        raw_word: word,
        mnemonic,
        operands: operand_text(&instr),
        comment: comment_text(byte_address, &instr),
    }
}

/// Disassembles a sequence of code words starting at byte address 0, one
/// instruction per word (this ISA has no variable-length encodings).
pub fn disassemble(words: &[u16]) -> Vec<DisassembledRecord> {
    words
        .iter()
        .enumerate()
        .map(|(i, &word)| disassemble_one((i * 2) as u16, word))
        .collect()
}
