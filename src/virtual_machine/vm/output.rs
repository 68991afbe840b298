//! Destination for values printed by `PRN`.

use std::io::{self, Write};

/// Receives every value the program prints.
///
/// Emitting is fire-and-forget: the CPU does not observe the outcome.
pub trait Output {
    fn emit(&mut self, value: u8);
}

/// Writes each value as a decimal line to standard output.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutOutput;

impl Output for StdoutOutput {
    fn emit(&mut self, value: u8) {
        let mut stdout = io::stdout().lock();
        if writeln!(stdout, "{value}").is_err() {
            crate::warn!("failed to write {value} to stdout");
        }
    }
}

/// Collects printed values in order.
impl Output for Vec<u8> {
    fn emit(&mut self, value: u8) {
        self.push(value);
    }
}

impl<O: Output + ?Sized> Output for &mut O {
    fn emit(&mut self, value: u8) {
        (**self).emit(value);
    }
}
