//! Assembler error taxonomy: every failure carries the source line it came
//! from so the CLI can point back at the offending text.

use crate::parser::Rule;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssembleError {
    #[error("line {line}: {source}")]
    Lex {
        line: usize,
        #[source]
        source: Box<pest::error::Error<Rule>>,
    },

    #[error("line {line}: unknown mnemonic '{mnemonic}'")]
    UnknownMnemonic { line: usize, mnemonic: String },

    #[error("line {line}: undefined label '{label}'")]
    UnknownLabel { line: usize, label: String },

    #[error("line {line}: label '{label}' is already defined at line {first_line}")]
    DuplicateLabel {
        line: usize,
        first_line: usize,
        label: String,
    },

    #[error("line {line}: '{mnemonic}' takes {expected} operand(s), found {found}")]
    OperandArity {
        line: usize,
        mnemonic: String,
        expected: usize,
        found: usize,
    },

    #[error("line {line}: '{mnemonic}' operand {index} has the wrong shape")]
    OperandShape {
        line: usize,
        mnemonic: String,
        index: usize,
    },

    #[error("line {line}: immediate {value} does not fit in {bits} bits")]
    ImmediateOutOfRange {
        line: usize,
        value: i64,
        bits: u32,
    },

    #[error("line {line}: branch target 0x{target:04X} is out of range of an 8-bit offset from 0x{from:04X}")]
    BranchOutOfRange { line: usize, from: u16, target: u32 },
}

impl From<pest::error::Error<Rule>> for AssembleError {
    fn from(source: pest::error::Error<Rule>) -> Self {
        let line = match source.line_col {
            pest::error::LineColLocation::Pos((l, _)) => l,
            pest::error::LineColLocation::Span((l, _), _) => l,
        };
        AssembleError::Lex {
            line,
            source: Box::new(source),
        }
    }
}
