use super::Cpu;
use crate::virtual_machine::errors::VMError;
use crate::virtual_machine::isa::Instruction;

impl Cpu {
    /// Arithmetic logic unit: `reg_a = reg_a <op> reg_b`.
    ///
    /// Arithmetic is 8-bit and wraps on overflow. Only `ADD` and `MUL` are
    /// implemented; any other instruction fails with
    /// [`VMError::UnsupportedOperation`] before a register is read.
    pub fn alu(&mut self, op: Instruction, reg_a: u8, reg_b: u8) -> Result<(), VMError> {
        let unsupported = VMError::UnsupportedOperation {
            mnemonic: op.mnemonic(),
        };
        if !op.uses_alu() {
            return Err(unsupported);
        }

        let apply: fn(u8, u8) -> u8 = match op {
            Instruction::Add => u8::wrapping_add,
            Instruction::Mul => u8::wrapping_mul,
            _ => return Err(unsupported),
        };

        let a = self.registers.get(reg_a)?;
        let b = self.registers.get(reg_b)?;
        self.registers.set(reg_a, apply(a, b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cpu_with(a: u8, b: u8) -> Cpu {
        let mut cpu = Cpu::new();
        cpu.write_register(0, a).unwrap();
        cpu.write_register(1, b).unwrap();
        cpu
    }

    #[test]
    fn add() {
        let mut cpu = cpu_with(2, 3);
        cpu.alu(Instruction::Add, 0, 1).unwrap();
        assert_eq!(cpu.read_register(0).unwrap(), 5);
        assert_eq!(cpu.read_register(1).unwrap(), 3);
    }

    #[test]
    fn mul() {
        let mut cpu = cpu_with(4, 5);
        cpu.alu(Instruction::Mul, 0, 1).unwrap();
        assert_eq!(cpu.read_register(0).unwrap(), 20);
    }

    #[test]
    fn add_wraps() {
        let mut cpu = cpu_with(250, 10);
        cpu.alu(Instruction::Add, 0, 1).unwrap();
        assert_eq!(cpu.read_register(0).unwrap(), 4);
    }

    #[test]
    fn mul_wraps() {
        let mut cpu = cpu_with(16, 17);
        cpu.alu(Instruction::Mul, 0, 1).unwrap();
        assert_eq!(cpu.read_register(0).unwrap(), (16u16 * 17 % 256) as u8);
    }

    #[test]
    fn same_register_operands() {
        let mut cpu = cpu_with(7, 0);
        cpu.alu(Instruction::Mul, 0, 0).unwrap();
        assert_eq!(cpu.read_register(0).unwrap(), 49);
    }

    #[test]
    fn unsupported_operation() {
        let mut cpu = cpu_with(1, 1);
        assert_eq!(
            cpu.alu(Instruction::Ldi, 0, 1),
            Err(VMError::UnsupportedOperation { mnemonic: "LDI" })
        );
        assert_eq!(cpu.read_register(0).unwrap(), 1);
    }

    #[test]
    fn non_alu_opcodes_are_unsupported() {
        for op in Instruction::ALL.iter().filter(|op| !op.uses_alu()) {
            let mut cpu = cpu_with(1, 1);
            assert_eq!(
                cpu.alu(*op, 0, 1),
                Err(VMError::UnsupportedOperation {
                    mnemonic: op.mnemonic()
                })
            );
        }
    }

    #[test]
    fn invalid_register() {
        let mut cpu = cpu_with(1, 1);
        assert!(matches!(
            cpu.alu(Instruction::Add, 0, 9),
            Err(VMError::InvalidRegisterIndex { index: 9, .. })
        ));
    }
}
