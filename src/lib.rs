//! `vm16`: the codec, executor and disassembler for a fixed-width 16-bit
//! instruction set. See `vm16-asm` for the assembler that targets it.

pub mod codec;
pub mod constants;
pub mod disassembler;
pub mod error;
pub mod executor;
pub mod memory;
pub mod register;

pub use codec::{decode, encode, Instruction};
pub use disassembler::{disassemble, disassemble_one, DisassembledRecord};
pub use error::ExecutorError;
pub use executor::{Executor, RunReport, Snapshot, State};

/// A single 16-bit instruction or data value.
pub type Word = u16;
