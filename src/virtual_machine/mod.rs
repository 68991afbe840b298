//! LS-8: an 8-bit register virtual machine.
//!
//! # Architecture
//!
//! - **Memory**: 256 bytes, zero-initialized, program loaded at address 0
//! - **Registers**: `r0`..`r7`, 8 bits each; `r7` is the stack pointer and
//!   starts at `0xF4`
//! - **Instruction format**: one opcode byte followed by up to two operand
//!   bytes
//! - **Execution model**: fetch at `pc`, decode, execute; `HLT` stops the
//!   machine and any error faults it
//!
//! # Modules
//!
//! - [`errors`]: Load and execution error types
//! - [`isa`]: Instruction set definition and opcode mappings
//! - [`program`]: Program source parsing and loading
//! - [`vm`]: CPU, memory, registers and the ALU

pub mod errors;
pub mod isa;
#[cfg(test)]
mod isa_static_check;
pub mod program;
pub mod vm;
