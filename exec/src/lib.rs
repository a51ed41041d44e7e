//! JSON request/response shapes for the `vex` CLI. These are the same
//! envelopes a transport layer would wrap in HTTP; here they are just what
//! the binary prints.

use std::io;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use vm16::{disassemble, DisassembledRecord, ExecutorError, Executor, Snapshot};
use vm16_asm::AssembleError;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    Assemble(#[from] AssembleError),
    #[error(transparent)]
    Executor(#[from] ExecutorError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("malformed machine-code JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Response to an assembly request: the machine code and the label table
/// (mapping label name to byte address).
#[derive(Debug, Serialize)]
pub struct AssemblyResponse {
    #[serde(rename = "machineCode")]
    pub machine_code: Vec<u16>,
    pub labels: std::collections::HashMap<String, u16>,
}

pub fn assemble_source(source: &str) -> Result<AssemblyResponse, CliError> {
    let (machine_code, labels) = vm16_asm::assemble(source)?;
    Ok(AssemblyResponse { machine_code, labels })
}

/// Response to a disassembly request: the array of disassembled records.
pub fn disassemble_words(machine_code: &[u16]) -> Vec<DisassembledRecord> {
    disassemble(machine_code)
}

#[derive(Debug, Deserialize)]
pub struct ExecutionRequest {
    #[serde(rename = "machineCode")]
    pub machine_code: Vec<u16>,
    #[serde(rename = "maxCycles", default = "default_max_cycles")]
    pub max_cycles: u32,
    #[serde(default)]
    pub start: u16,
    /// Opts into the reference's legacy behavior of silently suppressing an
    /// out-of-range LOAD/STORE instead of faulting. Faulting is the default.
    #[serde(rename = "allowOutOfRangeMemory", default)]
    pub allow_out_of_range_memory: bool,
}

fn default_max_cycles() -> u32 {
    1000
}

/// Response to an execution request: the cycle-by-cycle snapshot history,
/// the final snapshot, the final cycle count, and the halted flag.
#[derive(Debug, Serialize)]
pub struct ExecutionResponse {
    pub history: Vec<Snapshot>,
    #[serde(rename = "finalSnapshot")]
    pub final_snapshot: Snapshot,
    #[serde(rename = "finalCycleCount")]
    pub final_cycle_count: u64,
    pub halted: bool,
    pub fault: Option<String>,
}

pub fn execute(request: &ExecutionRequest) -> Result<ExecutionResponse, CliError> {
    let mut executor = Executor::new().with_strict_memory(!request.allow_out_of_range_memory);
    executor.load_program(&request.machine_code, request.start)?;

    let report = executor.run(request.max_cycles);
    let final_snapshot = executor.snapshot();

    Ok(ExecutionResponse {
        history: report.history,
        final_cycle_count: final_snapshot.cycle,
        halted: final_snapshot.state == vm16::State::Halted,
        fault: report.outcome.err().map(|e| e.to_string()),
        final_snapshot,
    })
}

#[cfg(test)]
mod test;
