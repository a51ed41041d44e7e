//! The interpreting executor: owns architectural state and advances it one
//! instruction at a time.

use crate::codec::{self, sign_extend_imm8, zero_extend_imm8, Instruction};
use crate::constants::*;
use crate::error::ExecutorError;
use crate::memory::Memory;
use crate::register::RegisterFile;

/// The executor's run state. `Halted` and `Faulted` are terminal, exited
/// only by [`Executor::reset`].
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum State {
    Running,
    Halted,
    Faulted,
}

/// An immutable copy of architectural state, minus memory. Cheap to retain:
/// memory is excluded specifically so run histories stay bounded in size.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Snapshot {
    pub registers: [u16; REGISTER_COUNT],
    pub pc: u16,
    pub sp: u16,
    pub lr: u16,
    pub sr: u16,
    pub cycle: u64,
    pub state: State,
}

/// Result of [`Executor::run`]: the per-step history plus how it ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunReport {
    pub history: Vec<Snapshot>,
    pub outcome: Result<(), ExecutorError>,
}

impl Snapshot {
    pub fn zero_flag(&self) -> bool {
        self.sr & (1 << SR_ZERO_BIT) != 0
    }

    pub fn negative_flag(&self) -> bool {
        self.sr & (1 << SR_NEGATIVE_BIT) != 0
    }

    pub fn carry_flag(&self) -> bool {
        self.sr & (1 << SR_CARRY_BIT) != 0
    }
}

/// The interpreter. Single-threaded, owns one register file, one memory
/// image, and the scalar state around it. Two executors share no state and
/// are independently safe to use in parallel.
pub struct Executor {
    registers: RegisterFile,
    memory: Memory,
    pc: u16,
    sp: u16,
    lr: u16,
    sr: u16,
    cycle: u64,
    state: State,
    /// When `true` (the default), an out-of-range LOAD/STORE raises
    /// `MemoryOutOfRange`. Set to `false` to opt into the reference's legacy
    /// behavior of silently suppressing the access instead.
    strict_memory: bool,
}

impl Executor {
    pub fn new() -> Executor {
        Executor {
            registers: RegisterFile::new(),
            memory: Memory::new(),
            pc: 0,
            sp: INITIAL_SP,
            lr: 0,
            sr: 0,
            cycle: 0,
            state: State::Running,
            strict_memory: true,
        }
    }

    /// `true` (the default) faults on out-of-range LOAD/STORE; pass `false`
    /// to opt into the reference's silent-suppression legacy behavior.
    pub fn with_strict_memory(mut self, strict: bool) -> Executor {
        self.strict_memory = strict;
        self
    }

    pub fn register(&self, id: u8) -> u16 {
        self.registers.get(id)
    }

    pub fn pc(&self) -> u16 {
        self.pc
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Copies `words` into memory starting at `start_byte_addr`. Does not
    /// reset any other architectural state.
    pub fn load_program(&mut self, words: &[u16], start_byte_addr: u16) -> Result<(), ExecutorError> {
        if start_byte_addr % 2 != 0 {
            return Err(ExecutorError::UnalignedLoad {
                address: start_byte_addr,
            });
        }
        if !self.memory.load_words(start_byte_addr, words) {
            return Err(ExecutorError::ProgramTooLarge {
                address: start_byte_addr,
                words: words.len(),
            });
        }
        Ok(())
    }

    /// Restores initial state: all registers zero, PC=0, SP=0xFFFE, LR=0,
    /// SR=0, Running, cycle=0, and zeroed memory.
    pub fn reset(&mut self) {
        self.registers = RegisterFile::new();
        self.memory.clear();
        self.pc = 0;
        self.sp = INITIAL_SP;
        self.lr = 0;
        self.sr = 0;
        self.cycle = 0;
        self.state = State::Running;
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            registers: self.registers.as_array(),
            pc: self.pc,
            sp: self.sp,
            lr: self.lr,
            sr: self.sr,
            cycle: self.cycle,
            state: self.state,
        }
    }

    /// Executes exactly one instruction: fetch, PC+2, cycle+1, halt-check,
    /// dispatch. Returns the fault as an `Err` if the executor was already
    /// terminal, or if the fetched opcode is unrecognized.
    pub fn step(&mut self) -> Result<(), ExecutorError> {
        if self.state != State::Running {
            return Err(ExecutorError::HaltedStep);
        }

        let fetch_pc = self.pc;
        let word = self.memory.read_word(fetch_pc).unwrap_or(HALT_WORD);

        self.pc = self.pc.wrapping_add(2);
        self.cycle += 1;

        if word == HALT_WORD {
            self.state = State::Halted;
            return Ok(());
        }

        let instr = codec::decode(word);
        match self.dispatch(instr) {
            Ok(()) => Ok(()),
            Err(ExecutorError::UnknownOpcode { .. }) => {
                self.state = State::Faulted;
                Err(ExecutorError::UnknownOpcode {
                    pc: fetch_pc,
                    opcode: ((word & OP_MASK) >> OP_OFFSET) as u8,
                })
            }
            // Any other dispatch failure (currently just a strict-mode
            // out-of-range memory access) is terminal too: a caller can
            // never keep stepping past an error.
            Err(err) => {
                self.state = State::Faulted;
                Err(err)
            }
        }
    }

    /// Repeatedly steps, capturing a snapshot after each successful step,
    /// until halted, a fault occurs, or `max_cycles` steps have run. The
    /// halting step itself is not appended to the history. Unlike `step`,
    /// `run` never discards progress: a fault partway through still returns
    /// everything stepped so far.
    pub fn run(&mut self, max_cycles: u32) -> RunReport {
        let mut history = Vec::new();
        for _ in 0..max_cycles {
            if let Err(err) = self.step() {
                return RunReport {
                    history,
                    outcome: Err(err),
                };
            }
            if self.state == State::Halted {
                break;
            }
            history.push(self.snapshot());
        }
        RunReport {
            history,
            outcome: Ok(()),
        }
    }

    fn dispatch(&mut self, instr: Instruction) -> Result<(), ExecutorError> {
        match instr {
            Instruction::Nop => {}

            Instruction::Add { rd, rs, rt } => {
                let (result, carry) = self.registers.get(rs).overflowing_add(self.registers.get(rt));
                self.set_flags_arith(result, carry);
                self.registers.set(rd, result);
            }
            Instruction::Addi { rd, imm8 } => {
                let imm = zero_extend_imm8(imm8);
                let (result, carry) = self.registers.get(rd).overflowing_add(imm);
                self.set_flags_arith(result, carry);
                self.registers.set(rd, result);
            }
            Instruction::Sub { rd, rs, rt } => {
                // SUB never computes Carry/Borrow, same as the logical/shift
                // ops below: route it through set_flags_logic so C is left
                // exactly as it was instead of being cleared.
                let result = self.registers.get(rs).wrapping_sub(self.registers.get(rt));
                self.set_flags_logic(result);
                self.registers.set(rd, result);
            }

            Instruction::And { rd, rs, rt } => {
                let result = self.registers.get(rs) & self.registers.get(rt);
                self.set_flags_logic(result);
                self.registers.set(rd, result);
            }
            Instruction::Or { rd, rs, rt } => {
                let result = self.registers.get(rs) | self.registers.get(rt);
                self.set_flags_logic(result);
                self.registers.set(rd, result);
            }
            Instruction::Xor { rd, rs, rt } => {
                let result = self.registers.get(rs) ^ self.registers.get(rt);
                self.set_flags_logic(result);
                self.registers.set(rd, result);
            }
            Instruction::Not { rd, rs } => {
                let result = !self.registers.get(rs);
                self.set_flags_logic(result);
                self.registers.set(rd, result);
            }
            Instruction::Shl { rd, rs, rt } => {
                let shift = self.registers.get(rt) & 0xF;
                let result = self.registers.get(rs) << shift;
                self.set_flags_logic(result);
                self.registers.set(rd, result);
            }
            Instruction::Shr { rd, rs, rt } => {
                let shift = self.registers.get(rt) & 0xF;
                let result = self.registers.get(rs) >> shift;
                self.set_flags_logic(result);
                self.registers.set(rd, result);
            }

            Instruction::Load { rd, rs, offset4 } => {
                let addr = self.registers.get(rs).wrapping_add(offset4 as u16 * 2);
                match self.memory.read_word(addr) {
                    Some(value) => self.registers.set(rd, value),
                    None if self.strict_memory => {
                        return Err(ExecutorError::MemoryOutOfRange { address: addr })
                    }
                    None => {}
                }
            }
            Instruction::Store { rd, rs, offset4 } => {
                let addr = self.registers.get(rs).wrapping_add(offset4 as u16 * 2);
                let value = self.registers.get(rd);
                if !self.memory.write_word(addr, value) && self.strict_memory {
                    return Err(ExecutorError::MemoryOutOfRange { address: addr });
                }
            }
            Instruction::Loadi { rd, imm8 } => {
                self.registers.set(rd, sign_extend_imm8(imm8));
            }

            Instruction::Jmp { addr12 } => {
                self.pc = addr12;
            }
            Instruction::Beq { rd, imm8 } => {
                if self.registers.get(rd) == 0 {
                    self.branch(imm8);
                }
            }
            Instruction::Bne { rd, imm8 } => {
                if self.registers.get(rd) != 0 {
                    self.branch(imm8);
                }
            }

            Instruction::Halt => unreachable!("HALT is intercepted before dispatch"),

            Instruction::Unknown { opcode } => {
                return Err(ExecutorError::UnknownOpcode { pc: self.pc, opcode })
            }
        }

        Ok(())
    }

    fn branch(&mut self, imm8: u8) {
        let offset = sign_extend_imm8(imm8) as i16 as i32 * 2;
        self.pc = (self.pc as i32 + offset) as u16;
    }

    fn set_flags_arith(&mut self, result: u16, carry: bool) {
        self.sr = 0;
        if result == 0 {
            self.sr |= 1 << SR_ZERO_BIT;
        }
        if result & 0x8000 != 0 {
            self.sr |= 1 << SR_NEGATIVE_BIT;
        }
        if carry {
            self.sr |= 1 << SR_CARRY_BIT;
        }
    }

    fn set_flags_logic(&mut self, result: u16) {
        let carry = self.sr & (1 << SR_CARRY_BIT) != 0;
        self.sr = 0;
        if result == 0 {
            self.sr |= 1 << SR_ZERO_BIT;
        }
        if result & 0x8000 != 0 {
            self.sr |= 1 << SR_NEGATIVE_BIT;
        }
        if carry {
            self.sr |= 1 << SR_CARRY_BIT;
        }
    }
}

impl Default for Executor {
    fn default() -> Executor {
        Executor::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::codec::encode;

    fn run_to_completion(words: &[u16]) -> Executor {
        let mut exec = Executor::new();
        exec.load_program(words, 0).unwrap();
        exec.run(1000);
        exec
    }

    #[test]
    fn loadi_then_halt() {
        let exec = run_to_completion(&[0xC12A, 0xFFFF]);
        assert_eq!(exec.register(1), 0x002A);
        assert_eq!(exec.pc(), 0x0004);
        assert_eq!(exec.state(), State::Halted);
        assert_eq!(exec.cycle(), 2);
    }

    #[test]
    fn loadi_sign_extends_negative_immediate() {
        let word = encode(&Instruction::Loadi { rd: 2, imm8: 0xFF });
        assert_eq!(word, 0xC2FF);
        let exec = run_to_completion(&[word, 0xFFFF]);
        assert_eq!(exec.register(2), 0xFFFF);
    }

    #[test]
    fn addi_sets_carry_and_zero() {
        let mut exec = Executor::new();
        exec.load_program(
            &[
                encode(&Instruction::Loadi { rd: 3, imm8: 0xFF }), // R3 = sign_extend(0xFF) = 0xFFFF
                encode(&Instruction::Addi { rd: 3, imm8: 0x01 }),
                0xFFFF,
            ],
            0,
        )
        .unwrap();
        exec.run(1000);

        assert_eq!(exec.register(3), 0x0000);
        let snap = exec.snapshot();
        assert!(snap.zero_flag());
        assert!(!snap.negative_flag());
        assert!(snap.carry_flag());
    }

    #[test]
    fn beq_skips_one_instruction() {
        let mut exec = Executor::new();
        // LOADI R1, 0 ; BEQ R1, +1 ; LOADI R2, 1 ; HALT
        let beq_offset = 1i8 as u8; // skips exactly the LOADI R2 instruction
        exec.load_program(
            &[
                encode(&Instruction::Loadi { rd: 1, imm8: 0 }),
                encode(&Instruction::Beq { rd: 1, imm8: beq_offset }),
                encode(&Instruction::Loadi { rd: 2, imm8: 1 }),
                0xFFFF,
            ],
            0,
        )
        .unwrap();
        exec.run(1000);

        assert_eq!(exec.register(2), 0);
        assert_eq!(exec.state(), State::Halted);
    }

    #[test]
    fn r0_write_is_clobbered() {
        let exec = run_to_completion(&[encode(&Instruction::Loadi { rd: 0, imm8: 0x7F }), 0xFFFF]);
        assert_eq!(exec.register(0), 0);
        assert_eq!(exec.state(), State::Halted);
    }

    #[test]
    fn step_on_halted_executor_is_an_error() {
        let mut exec = run_to_completion(&[0xFFFF]);
        assert_eq!(exec.step(), Err(ExecutorError::HaltedStep));
    }

    #[test]
    fn cycle_counter_increments_once_per_fetch() {
        let exec = run_to_completion(&[
            encode(&Instruction::Nop),
            encode(&Instruction::Nop),
            0xFFFF,
        ]);
        assert_eq!(exec.cycle(), 3);
    }

    #[test]
    fn sub_never_sets_carry_from_its_own_result() {
        let mut exec = Executor::new();
        exec.load_program(
            &[
                encode(&Instruction::Loadi { rd: 1, imm8: 0 }),
                encode(&Instruction::Sub { rd: 2, rs: 1, rt: 1 }),
                0xFFFF,
            ],
            0,
        )
        .unwrap();
        exec.run(1000);
        assert!(!exec.snapshot().carry_flag());
    }

    #[test]
    fn sub_preserves_carry_set_by_a_prior_add() {
        let mut exec = Executor::new();
        exec.load_program(
            &[
                encode(&Instruction::Loadi { rd: 1, imm8: 0xFF }), // R1 = 0xFFFF
                encode(&Instruction::Addi { rd: 1, imm8: 0x01 }),  // R1 = 0, C = 1
                encode(&Instruction::Sub { rd: 2, rs: 1, rt: 1 }), // SUB must not clear C
                0xFFFF,
            ],
            0,
        )
        .unwrap();
        exec.run(1000);
        assert!(exec.snapshot().carry_flag());
    }

    #[test]
    fn out_of_range_load_faults_by_default() {
        let mut exec = Executor::new();
        exec.load_program(
            &[
                encode(&Instruction::Loadi { rd: 1, imm8: 0xFF }), // R1 = 0xFFFF, an out-of-range byte address
                encode(&Instruction::Load {
                    rd: 2,
                    rs: 1,
                    offset4: 0,
                }), // reads MEM[0xFFFF], out of range: faults
                0xFFFF,
            ],
            0,
        )
        .unwrap();
        let report = exec.run(1000);
        assert_eq!(
            report.outcome,
            Err(ExecutorError::MemoryOutOfRange { address: 0xFFFF })
        );
        assert_eq!(exec.state(), State::Faulted);
    }

    #[test]
    fn out_of_range_load_is_silently_suppressed_when_opted_out() {
        let mut exec = Executor::new().with_strict_memory(false);
        exec.load_program(
            &[
                encode(&Instruction::Loadi { rd: 1, imm8: 0xFF }), // R1 = 0xFFFF, an out-of-range byte address
                encode(&Instruction::Loadi { rd: 2, imm8: 0x2A }), // sentinel value to prove R2 is untouched
                encode(&Instruction::Load {
                    rd: 2,
                    rs: 1,
                    offset4: 0,
                }), // reads MEM[0xFFFF], out of range: dropped, not faulted
                0xFFFF,
            ],
            0,
        )
        .unwrap();
        exec.run(1000);
        assert_eq!(exec.register(2), 0x002A);
        assert_eq!(exec.state(), State::Halted);
    }

    #[test]
    fn reset_zeroes_memory_and_registers() {
        let mut exec = run_to_completion(&[encode(&Instruction::Loadi { rd: 1, imm8: 5 }), 0xFFFF]);
        exec.reset();
        assert_eq!(exec.register(1), 0);
        assert_eq!(exec.pc(), 0);
        assert_eq!(exec.state(), State::Running);
        assert_eq!(exec.cycle(), 0);
        assert_eq!(exec.memory.read_word(0), Some(0));
    }
}
