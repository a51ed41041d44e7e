use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use vm16_exec::{assemble_source, disassemble_words, execute, CliError, ExecutionRequest};

#[derive(Parser)]
#[command(name = "vex", version, about = "Assembler, executor and disassembler for the vm16 ISA")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Assemble a source file into code words, printed as JSON.
    Asm {
        /// Path to a vm16 assembly source file.
        source: PathBuf,
    },
    /// Assemble (or load a raw code-word JSON array) and run to completion.
    Run {
        /// Path to a vm16 assembly source file, or a code-word JSON array
        /// when `--machine-code` is set.
        source: PathBuf,
        /// Treat `source` as a JSON array of code words instead of assembly text.
        #[arg(long)]
        machine_code: bool,
        #[arg(long, default_value_t = 1000)]
        max_cycles: u32,
        #[arg(long, default_value_t = 0)]
        start: u16,
        /// Silently drop out-of-range LOAD/STORE accesses instead of faulting
        /// on them (the reference's legacy behavior; faulting is the default).
        #[arg(long)]
        allow_out_of_range_memory: bool,
    },
    /// Disassemble a code-word JSON array, printed as a listing.
    Disasm {
        /// Path to a JSON array of code words.
        source: PathBuf,
    },
}

fn run() -> Result<(), CliError> {
    match Cli::parse().command {
        Command::Asm { source } => {
            let text = fs::read_to_string(source)?;
            let response = assemble_source(&text)?;
            println!("{}", serde_json::to_string_pretty(&response).expect("json"));
        }

        Command::Run {
            source,
            machine_code,
            max_cycles,
            start,
            allow_out_of_range_memory,
        } => {
            let text = fs::read_to_string(source)?;
            let code = if machine_code {
                serde_json::from_str(&text)?
            } else {
                assemble_source(&text)?.machine_code
            };

            let request = ExecutionRequest {
                machine_code: code,
                max_cycles,
                start,
                allow_out_of_range_memory,
            };
            let response = execute(&request)?;
            println!("{}", serde_json::to_string_pretty(&response).expect("json"));
        }

        Command::Disasm { source } => {
            let text = fs::read_to_string(source)?;
            let words: Vec<u16> = serde_json::from_str(&text)?;
            for record in disassemble_words(&words) {
                println!(
                    "0x{:04X}  {:04X}  {:<6} {}",
                    record.byte_address, record.raw_word, record.mnemonic, record.operands
                );
            }
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
