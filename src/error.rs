use thiserror::Error;

/// Failures raised by the [`crate::executor::Executor`].
///
/// These are terminal for the executor that raised them until [`reset`] is
/// called; the core never aborts the host process, all failures are values.
///
/// [`reset`]: crate::executor::Executor::reset
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutorError {
    /// `step` was called while the executor was already Halted or Faulted.
    #[error("step called on a halted or faulted executor")]
    HaltedStep,

    /// The fetched word's top nibble did not match any entry in the encoding
    /// table. Unreachable for the fixed 0x0-0xF opcode space today; kept so a
    /// future opcode reassignment has somewhere to land.
    #[error("unknown opcode 0x{opcode:X} at pc=0x{pc:04X}")]
    UnknownOpcode { pc: u16, opcode: u8 },

    /// Raised by default on an out-of-range LOAD/STORE. Pass
    /// `with_strict_memory(false)` to opt into the reference's legacy
    /// behavior of silently suppressing the access instead.
    #[error("memory access out of range at address 0x{address:04X}")]
    MemoryOutOfRange { address: u16 },

    /// `load_program` was given an odd start address; every instruction and
    /// data word must be word-aligned.
    #[error("program load address 0x{address:04X} is not word-aligned")]
    UnalignedLoad { address: u16 },

    /// `load_program` was given more words than fit in memory from the start
    /// address onward.
    #[error("program of {words} words does not fit in memory starting at 0x{address:04X}")]
    ProgramTooLarge { address: u16, words: usize },
}
