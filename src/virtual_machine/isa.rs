//! Instruction Set Architecture (ISA) definitions.
//!
//! The [`for_each_instruction!`](crate::for_each_instruction) macro holds the
//! canonical instruction table and hands it to a callback macro, so the
//! [`Instruction`] enum and the ISA fingerprint test are generated from one
//! list.
//!
//! # Opcode layout
//!
//! Every instruction is one opcode byte followed by zero, one or two operand
//! bytes. The opcode byte is laid out as `AABCDDDD`:
//!
//! - `AA`: number of operands
//! - `B`: 1 if the instruction is executed by the ALU
//! - `C`: 1 if the instruction sets the PC itself
//! - `DDDD`: instruction identifier

use crate::virtual_machine::errors::VMError;

/// Kind of an operand byte following the opcode.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum OperandKind {
    /// Register index in `0..8`.
    Reg,
    /// Immediate 8-bit value.
    Imm,
}

/// Invokes a callback macro with the complete instruction definition list.
#[macro_export]
macro_rules! for_each_instruction {
    ($callback:ident) => {
        $callback! {
            /// HLT ; halt the CPU
            Hlt = 0b0000_0001, "HLT" => [],
            /// LDI reg, imm ; reg = imm
            Ldi = 0b1000_0010, "LDI" => [reg: Reg, value: Imm],
            /// PRN reg ; print reg as a decimal integer
            Prn = 0b0100_0111, "PRN" => [reg: Reg],
            /// ADD ra, rb ; ra = ra + rb
            Add = 0b1010_0000, "ADD" => [reg_a: Reg, reg_b: Reg],
            /// MUL ra, rb ; ra = ra * rb
            Mul = 0b1010_0010, "MUL" => [reg_a: Reg, reg_b: Reg],
            /// PUSH reg ; sp -= 1 ; mem[sp] = reg
            Push = 0b0100_0101, "PUSH" => [reg: Reg],
            /// POP reg ; reg = mem[sp] ; sp += 1
            Pop = 0b0100_0110, "POP" => [reg: Reg],
            /// CALL reg ; push pc + 2 ; pc = reg
            Call = 0b0101_0000, "CALL" => [reg: Reg],
            /// RET ; pc = pop
            Ret = 0b0001_0001, "RET" => [],
        }
    };
}

#[macro_export]
macro_rules! define_instructions {
    (
        $(
            $(#[$doc:meta])*
            $name:ident = $opcode:expr, $mnemonic:literal => [
                $( $field:ident : $kind:ident ),* $(,)?
            ]
        ),* $(,)?
    ) => {
        /// LS-8 instruction, discriminant is the opcode byte.
        #[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
        #[repr(u8)]
        pub enum Instruction {
            $(
                $(#[$doc])*
                $name = $opcode,
            )*
        }

        impl TryFrom<u8> for Instruction {
            type Error = VMError;

            /// Decodes an opcode byte. The reported `pc` is 0; the CPU
            /// replaces it with the fetch address.
            fn try_from(value: u8) -> Result<Self, Self::Error> {
                match value {
                    $( $opcode => Ok(Instruction::$name), )*
                    _ => Err(VMError::UnknownOpcode {
                        opcode: value,
                        pc: 0,
                    }),
                }
            }
        }

        impl Instruction {
            /// Every instruction in table order.
            pub const ALL: &'static [Instruction] = &[ $( Instruction::$name, )* ];

            /// Returns the assembly mnemonic for this instruction.
            pub const fn mnemonic(&self) -> &'static str {
                match self {
                    $( Instruction::$name => $mnemonic, )*
                }
            }

            /// Returns the kinds of the operand bytes that follow the opcode.
            pub const fn operands(&self) -> &'static [OperandKind] {
                match self {
                    $( Instruction::$name => &[ $( OperandKind::$kind, )* ], )*
                }
            }
        }
    };
}

for_each_instruction!(define_instructions);

impl Instruction {
    /// Returns the opcode byte.
    pub const fn opcode(&self) -> u8 {
        *self as u8
    }

    /// Instruction size in bytes, opcode included.
    pub const fn width(&self) -> usize {
        1 + self.operands().len()
    }

    /// True if the instruction is executed by the ALU (bit `B`).
    pub const fn uses_alu(&self) -> bool {
        self.opcode() & 0b0010_0000 != 0
    }

    /// True if the instruction sets the PC itself (bit `C`).
    pub const fn sets_pc(&self) -> bool {
        self.opcode() & 0b0001_0000 != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instruction_try_from_unknown() {
        assert!(matches!(
            Instruction::try_from(0xFF),
            Err(VMError::UnknownOpcode { opcode: 0xFF, .. })
        ));
        assert!(Instruction::try_from(0).is_err());
    }

    #[test]
    fn opcodes_decode_to_themselves() {
        for instr in Instruction::ALL {
            assert_eq!(Instruction::try_from(instr.opcode()), Ok(*instr));
        }
    }

    #[test]
    fn operand_count_matches_high_bits() {
        for instr in Instruction::ALL {
            assert_eq!(
                (instr.opcode() >> 6) as usize,
                instr.operands().len(),
                "{}",
                instr.mnemonic()
            );
        }
    }

    #[test]
    fn widths() {
        assert_eq!(Instruction::Hlt.width(), 1);
        assert_eq!(Instruction::Ret.width(), 1);
        assert_eq!(Instruction::Prn.width(), 2);
        assert_eq!(Instruction::Call.width(), 2);
        assert_eq!(Instruction::Ldi.width(), 3);
        assert_eq!(Instruction::Mul.width(), 3);
    }

    #[test]
    fn flag_bits() {
        assert!(Instruction::Add.uses_alu());
        assert!(Instruction::Mul.uses_alu());
        assert!(!Instruction::Ldi.uses_alu());
        assert!(Instruction::Call.sets_pc());
        assert!(Instruction::Ret.sets_pc());
        assert!(!Instruction::Push.sets_pc());
    }
}
