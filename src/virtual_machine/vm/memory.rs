use crate::virtual_machine::errors::VMError;

/// Size of the address space in bytes.
pub const MEMORY_SIZE: usize = 256;

/// Flat, byte-addressable RAM. Every cell starts at zero.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Memory {
    cells: [u8; MEMORY_SIZE],
}

impl Default for Memory {
    fn default() -> Self {
        Self {
            cells: [0; MEMORY_SIZE],
        }
    }
}

impl Memory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the byte at `address`.
    ///
    /// Returns [`VMError::AddressOutOfBounds`] if `address` is past the end of memory.
    pub fn read(&self, address: usize) -> Result<u8, VMError> {
        self.cells
            .get(address)
            .copied()
            .ok_or(VMError::AddressOutOfBounds {
                address,
                size: MEMORY_SIZE,
            })
    }

    /// Stores `value` at `address`.
    ///
    /// Returns [`VMError::AddressOutOfBounds`] if `address` is past the end of memory.
    pub fn write(&mut self, address: usize, value: u8) -> Result<(), VMError> {
        let cell = self
            .cells
            .get_mut(address)
            .ok_or(VMError::AddressOutOfBounds {
                address,
                size: MEMORY_SIZE,
            })?;
        *cell = value;
        Ok(())
    }

    /// Copies `bytes` into memory starting at address 0.
    ///
    /// Returns [`VMError::ProgramTooLarge`] without touching memory if the
    /// bytes do not fit.
    pub fn load(&mut self, bytes: &[u8]) -> Result<(), VMError> {
        if bytes.len() > MEMORY_SIZE {
            return Err(VMError::ProgramTooLarge {
                len: bytes.len(),
                size: MEMORY_SIZE,
            });
        }
        self.cells[..bytes.len()].copy_from_slice(bytes);
        Ok(())
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.cells
    }
}
