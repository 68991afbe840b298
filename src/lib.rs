//! LS-8 virtual machine library.
//!
//! Provides the program loader, the CPU and its instruction set, and the
//! command-line configuration used by the `ls8` binary.

pub mod config;
pub mod utils;
pub mod virtual_machine;
