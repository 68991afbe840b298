use crate::virtual_machine::errors::VMError;

/// Number of registers in the register file.
pub const REGISTER_COUNT: usize = 8;
/// Register reserved as the stack pointer.
pub const SP: u8 = 7;

/// Register file: eight 8-bit registers, `r7` doubling as the stack pointer.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Registers {
    regs: [u8; REGISTER_COUNT],
}

impl Registers {
    /// Creates a register file with every register cleared.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a cleared register file with the stack pointer set to `sp`.
    pub fn with_stack_pointer(sp: u8) -> Self {
        let mut regs = [0; REGISTER_COUNT];
        regs[SP as usize] = sp;
        Self { regs }
    }

    /// Returns the value in register `idx`.
    ///
    /// Returns [`VMError::InvalidRegisterIndex`] if `idx` is out of bounds.
    pub fn get(&self, idx: u8) -> Result<u8, VMError> {
        self.regs
            .get(idx as usize)
            .copied()
            .ok_or(VMError::InvalidRegisterIndex {
                index: idx,
                available: REGISTER_COUNT,
            })
    }

    /// Stores a value into register `idx`.
    ///
    /// Returns [`VMError::InvalidRegisterIndex`] if `idx` is out of bounds.
    pub fn set(&mut self, idx: u8, value: u8) -> Result<(), VMError> {
        let slot = self
            .regs
            .get_mut(idx as usize)
            .ok_or(VMError::InvalidRegisterIndex {
                index: idx,
                available: REGISTER_COUNT,
            })?;
        *slot = value;
        Ok(())
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.regs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_cleared() {
        assert_eq!(Registers::new().as_slice(), &[0; REGISTER_COUNT]);
    }

    #[test]
    fn with_stack_pointer_sets_only_sp() {
        let regs = Registers::with_stack_pointer(0xF4);
        assert_eq!(regs.get(SP).unwrap(), 0xF4);
        assert_eq!(regs.as_slice(), &[0, 0, 0, 0, 0, 0, 0, 0xF4]);
    }

    #[test]
    fn write_then_read_every_register() {
        let mut regs = Registers::new();
        for idx in 0..REGISTER_COUNT as u8 {
            for value in [0u8, 1, 0x7F, 0x80, 0xFF] {
                regs.set(idx, value).unwrap();
                assert_eq!(regs.get(idx).unwrap(), value);
            }
        }
    }

    #[test]
    fn writes_are_independent() {
        let mut regs = Registers::new();
        regs.set(2, 9).unwrap();
        assert_eq!(regs.as_slice(), &[0, 0, 9, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn out_of_range_index() {
        let mut regs = Registers::new();
        assert_eq!(
            regs.get(8),
            Err(VMError::InvalidRegisterIndex {
                index: 8,
                available: REGISTER_COUNT
            })
        );
        assert!(regs.set(255, 1).is_err());
        assert_eq!(regs, Registers::new());
    }
}
