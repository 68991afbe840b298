use ls8_derive::Error;

/// Process exit status for command-line usage errors and malformed programs.
pub const EXIT_FAILURE: i32 = 1;
/// Process exit status when the program file does not exist.
pub const EXIT_NOT_FOUND: i32 = 2;
/// Process exit status when execution stops on a fault.
pub const EXIT_FAULT: i32 = 3;

/// Errors raised while loading or executing an LS-8 program.
///
/// Every variant is fatal: the loader aborts without producing a program and
/// the CPU stops in the [`Faulted`](super::vm::CpuState::Faulted) state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VMError {
    /// A program line is neither blank, a comment, nor an 8-bit binary literal.
    #[error("invalid number '{token}'")]
    MalformedProgramLine {
        line: usize,
        offset: usize,
        token: String,
    },
    /// The program source path does not resolve to a file.
    #[error("file not found: {path}")]
    ProgramNotFound { path: String },
    /// The program source exists but could not be read.
    #[error("io error reading {path}: {source}")]
    IoError { path: String, source: String },
    /// No instruction is assigned to the fetched byte.
    #[error("unknown opcode {opcode:#010b} at pc {pc:#04x}")]
    UnknownOpcode { opcode: u8, pc: usize },
    /// The ALU was asked to perform an instruction it does not implement.
    #[error("unsupported ALU operation {mnemonic}")]
    UnsupportedOperation { mnemonic: &'static str },
    /// Memory access outside the address space.
    #[error("address {address:#x} out of bounds (memory size {size})")]
    AddressOutOfBounds { address: usize, size: usize },
    /// Register index outside the register file.
    #[error("register index {index} out of bounds ({available} registers)")]
    InvalidRegisterIndex { index: u8, available: usize },
    /// A push would move the stack pointer below address 0.
    #[error("stack overflow: cannot push with sp at {sp:#04x}")]
    StackOverflow { sp: u8 },
    /// A pop would move the stack pointer past the last address.
    #[error("stack underflow: cannot pop with sp at {sp:#04x}")]
    StackUnderflow { sp: u8 },
    /// The loaded program does not fit in memory.
    #[error("program of {len} bytes does not fit in {size} bytes of memory")]
    ProgramTooLarge { len: usize, size: usize },
}

impl VMError {
    /// Returns true for every flavour of out-of-range access.
    pub fn is_out_of_bounds(&self) -> bool {
        matches!(
            self,
            VMError::AddressOutOfBounds { .. }
                | VMError::InvalidRegisterIndex { .. }
                | VMError::StackOverflow { .. }
                | VMError::StackUnderflow { .. }
                | VMError::ProgramTooLarge { .. }
        )
    }

    /// Process exit status for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            VMError::ProgramNotFound { .. } => EXIT_NOT_FOUND,
            VMError::MalformedProgramLine { .. } | VMError::IoError { .. } => EXIT_FAILURE,
            _ => EXIT_FAULT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_context() {
        let err = VMError::UnknownOpcode {
            opcode: 0b1111_1111,
            pc: 0x10,
        };
        assert_eq!(err.to_string(), "unknown opcode 0b11111111 at pc 0x10");

        let err = VMError::MalformedProgramLine {
            line: 3,
            offset: 1,
            token: "10x".into(),
        };
        assert_eq!(err.to_string(), "invalid number '10x'");
    }

    #[test]
    fn exit_codes_distinguish_load_failures() {
        let not_found = VMError::ProgramNotFound { path: "a".into() };
        let malformed = VMError::MalformedProgramLine {
            line: 1,
            offset: 1,
            token: "x".into(),
        };
        assert_eq!(not_found.exit_code(), EXIT_NOT_FOUND);
        assert_eq!(malformed.exit_code(), EXIT_FAILURE);
        assert_ne!(not_found.exit_code(), malformed.exit_code());
        assert_eq!(
            VMError::UnknownOpcode { opcode: 0, pc: 0 }.exit_code(),
            EXIT_FAULT
        );
    }

    #[test]
    fn out_of_bounds_kinds() {
        assert!(VMError::StackOverflow { sp: 0 }.is_out_of_bounds());
        assert!(
            VMError::AddressOutOfBounds {
                address: 256,
                size: 256
            }
            .is_out_of_bounds()
        );
        assert!(!VMError::UnsupportedOperation { mnemonic: "HLT" }.is_out_of_bounds());
    }
}
