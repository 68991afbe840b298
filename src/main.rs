//! LS-8 emulator.
//!
//! Loads an LS-8 program and runs it until `HLT`, printing every `PRN` value
//! to stdout.
//!
//! # Usage
//! ```text
//! ls8 <program.ls8> [OPTIONS]
//! ```
//!
//! # Exit status
//! - `0`: the program halted
//! - `1`: bad command line, malformed program, or unreadable file
//! - `2`: program file not found
//! - `3`: execution fault (unknown opcode, out-of-bounds access, ...)

use ls8::config::{Command, Config};
use ls8::virtual_machine::errors::{EXIT_FAILURE, VMError};
use ls8::virtual_machine::program::load_file;
use ls8::virtual_machine::vm::{Cpu, StdoutOutput};
use ls8::{error, info, trace};
use std::env;
use std::process;

fn main() {
    let mut args = env::args();
    let program = args.next().unwrap_or_else(|| "ls8".to_string());

    let config = match Config::from_args(args) {
        Ok(Command::Run(config)) => config,
        Ok(Command::Help) => {
            print_usage(&program);
            process::exit(0);
        }
        Err(e) => {
            error!("{e}\n");
            print_usage(&program);
            process::exit(EXIT_FAILURE);
        }
    };
    config.apply_logging();

    if let Err(e) = run(&config) {
        // Malformed lines were already reported as a diagnostic by the loader.
        if !matches!(e, VMError::MalformedProgramLine { .. }) {
            error!("{e}");
        }
        process::exit(e.exit_code());
    }
}

fn run(config: &Config) -> Result<(), VMError> {
    let program = load_file(&config.program_path)?;
    trace!(
        "loaded {} bytes from {}",
        program.len(),
        config.program_path.display()
    );

    let mut cpu = Cpu::new();
    cpu.load(&program)?;
    cpu.run(&mut StdoutOutput)?;

    trace!("halted at pc {:#04x}", cpu.pc());
    Ok(())
}

const USAGE: &str = "\
LS-8 Emulator

USAGE:
    {program} <program.ls8> [OPTIONS]

ARGS:
    <program.ls8>    Program source, one binary byte per line

OPTIONS:
    -t, --trace         Log the machine state before every instruction
        --no-timestamp  Omit timestamps from log lines
    -h, --help          Print this help message

EXAMPLES:
    {program} print8.ls8
    {program} call.ls8 --trace
";

fn print_usage(program: &str) {
    info!("{}", USAGE.replace("{program}", program));
}
