//! LS-8 CPU: the fetch-decode-execute engine.
//!
//! The CPU owns 256 bytes of memory, eight 8-bit registers (`r7` is the stack
//! pointer) and the program counter. [`Cpu::run`] fetches the byte at `pc`,
//! decodes it into an [`Instruction`] and executes it until `HLT`. Every
//! failure is fatal: the run stops, the CPU is left [`CpuState::Faulted`] and
//! the error is returned to the caller.

mod alu;
mod memory;
mod output;
mod registers;

pub use memory::{MEMORY_SIZE, Memory};
pub use output::{Output, StdoutOutput};
pub use registers::{REGISTER_COUNT, Registers, SP};

use crate::trace;
use crate::utils::log::{self, Level};
use crate::virtual_machine::errors::VMError;
use crate::virtual_machine::isa::Instruction;
use crate::virtual_machine::program::Program;

/// Initial stack pointer. The stack grows down from here; addresses
/// `0xF4..=0xFF` stay free for the machine.
pub const STACK_TOP: u8 = 0xF4;

/// Execution state of the CPU.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CpuState {
    /// Not executing: freshly built, reset, or stopped by `HLT`.
    Halted,
    /// Fetching and executing instructions.
    Running,
    /// Stopped by an error.
    Faulted,
}

/// Where execution continues once a handler returns.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Flow {
    /// Fall through to the next instruction (`pc += width`).
    Next,
    /// Continue at the given address.
    Jump(usize),
    /// Stop the run loop.
    Halt,
}

macro_rules! exec_cpu {
    // Entry point
    (
        cpu = $cpu:ident,
        out = $out:ident,
        instr = $instr:ident,
        { $( $variant:ident => $handler:ident $args:tt ),* $(,)? }
    ) => {{
        match $instr {
            $(
                Instruction::$variant => exec_cpu!(@call $cpu, $out, $handler, $args),
            )*
        }
    }};

    // Handler that prints (semicolon separator)
    (@call $cpu:ident, $out:ident, $handler:ident, (out; $( $field:ident ),* $(,)? )) => {{
        #[allow(unused_mut, unused_variables)]
        let mut operands = $cpu.operands();
        $( let $field = operands.read()?; )*
        $cpu.$handler($out, $( $field ),*)
    }};

    // Handler without output
    (@call $cpu:ident, $out:ident, $handler:ident, ( $( $field:ident ),* $(,)? )) => {{
        #[allow(unused_mut, unused_variables)]
        let mut operands = $cpu.operands();
        $( let $field = operands.read()?; )*
        $cpu.$handler($( $field ),*)
    }};
}

/// Sequential reader over the operand bytes that follow the opcode at `pc`.
struct Operands<'a> {
    memory: &'a Memory,
    next: usize,
}

impl Operands<'_> {
    fn read(&mut self) -> Result<u8, VMError> {
        let byte = self.memory.read(self.next)?;
        self.next += 1;
        Ok(byte)
    }
}

/// LS-8 virtual CPU.
///
/// Each instance is self-contained; independent CPUs can run on separate
/// threads.
#[derive(Clone, Debug)]
pub struct Cpu {
    /// Address of the next instruction.
    pc: usize,
    state: CpuState,
    registers: Registers,
    memory: Memory,
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}

impl Cpu {
    /// Creates a halted CPU with zeroed memory and `sp` at [`STACK_TOP`].
    pub fn new() -> Self {
        Self {
            pc: 0,
            state: CpuState::Halted,
            registers: Registers::with_stack_pointer(STACK_TOP),
            memory: Memory::new(),
        }
    }

    /// Restores the freshly constructed state, clearing any fault.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Copies the program into memory starting at address 0.
    pub fn load(&mut self, program: &Program) -> Result<(), VMError> {
        self.memory.load(program.bytes())
    }

    pub fn pc(&self) -> usize {
        self.pc
    }

    pub fn state(&self) -> CpuState {
        self.state
    }

    pub fn registers(&self) -> &Registers {
        &self.registers
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn read_byte(&self, address: usize) -> Result<u8, VMError> {
        self.memory.read(address)
    }

    pub fn write_byte(&mut self, address: usize, value: u8) -> Result<(), VMError> {
        self.memory.write(address, value)
    }

    pub fn read_register(&self, index: u8) -> Result<u8, VMError> {
        self.registers.get(index)
    }

    pub fn write_register(&mut self, index: u8, value: u8) -> Result<(), VMError> {
        self.registers.set(index, value)
    }

    /// Executes instructions until `HLT` or the first error.
    pub fn run<O: Output>(&mut self, out: &mut O) -> Result<(), VMError> {
        self.state = CpuState::Running;
        while self.state == CpuState::Running {
            self.step(out)?;
        }
        Ok(())
    }

    /// Executes exactly one instruction and returns the resulting state.
    ///
    /// A halted CPU starts running. On error the CPU is left
    /// [`CpuState::Faulted`]; call [`Cpu::reset`] before reusing it.
    pub fn step<O: Output>(&mut self, out: &mut O) -> Result<CpuState, VMError> {
        self.state = CpuState::Running;
        if log::enabled(Level::Trace) {
            trace!("{}", self.trace());
        }

        match self.fetch_and_execute(out) {
            Ok(()) => Ok(self.state),
            Err(err) => {
                self.state = CpuState::Faulted;
                Err(err)
            }
        }
    }

    fn fetch_and_execute<O: Output>(&mut self, out: &mut O) -> Result<(), VMError> {
        let instr = self.fetch()?;
        match self.exec(instr, out)? {
            Flow::Next => {
                debug_assert!(!instr.sets_pc(), "{} must set pc", instr.mnemonic());
                self.pc += instr.width();
            }
            Flow::Jump(target) => {
                debug_assert!(instr.sets_pc(), "{} cannot jump", instr.mnemonic());
                self.pc = target;
            }
            Flow::Halt => self.state = CpuState::Halted,
        }
        Ok(())
    }

    /// Decodes the opcode at `pc`.
    fn fetch(&self) -> Result<Instruction, VMError> {
        let opcode = self.memory.read(self.pc)?;
        Instruction::try_from(opcode).map_err(|_| VMError::UnknownOpcode {
            opcode,
            pc: self.pc,
        })
    }

    fn operands(&self) -> Operands<'_> {
        Operands {
            memory: &self.memory,
            next: self.pc + 1,
        }
    }

    /// Executes a single decoded instruction.
    fn exec<O: Output>(&mut self, instruction: Instruction, out: &mut O) -> Result<Flow, VMError> {
        exec_cpu! {
            cpu = self,
            out = out,
            instr = instruction,
            {
                Hlt => op_hlt(),
                Ldi => op_ldi(reg, value),
                Prn => op_prn(out; reg),
                Add => op_add(reg_a, reg_b),
                Mul => op_mul(reg_a, reg_b),
                Push => op_push(reg),
                Pop => op_pop(reg),
                Call => op_call(reg),
                Ret => op_ret(),
            }
        }
    }

    /// Pushes `value`: `sp -= 1`, then `mem[sp] = value`.
    ///
    /// Fails with [`VMError::StackOverflow`] when `sp` is already 0.
    pub fn push_value(&mut self, value: u8) -> Result<(), VMError> {
        let sp = self.registers.get(SP)?;
        let top = sp.checked_sub(1).ok_or(VMError::StackOverflow { sp })?;
        self.memory.write(top as usize, value)?;
        self.registers.set(SP, top)
    }

    /// Pops a value: reads `mem[sp]`, then `sp += 1`.
    ///
    /// Fails with [`VMError::StackUnderflow`] when `sp` is already at the
    /// last address.
    pub fn pop_value(&mut self) -> Result<u8, VMError> {
        let sp = self.registers.get(SP)?;
        let value = self.memory.read(sp as usize)?;
        let next = sp.checked_add(1).ok_or(VMError::StackUnderflow { sp })?;
        self.registers.set(SP, next)?;
        Ok(value)
    }

    fn op_hlt(&mut self) -> Result<Flow, VMError> {
        Ok(Flow::Halt)
    }

    fn op_ldi(&mut self, reg: u8, value: u8) -> Result<Flow, VMError> {
        self.registers.set(reg, value)?;
        Ok(Flow::Next)
    }

    fn op_prn<O: Output>(&mut self, out: &mut O, reg: u8) -> Result<Flow, VMError> {
        out.emit(self.registers.get(reg)?);
        Ok(Flow::Next)
    }

    fn op_add(&mut self, reg_a: u8, reg_b: u8) -> Result<Flow, VMError> {
        self.alu(Instruction::Add, reg_a, reg_b)?;
        Ok(Flow::Next)
    }

    fn op_mul(&mut self, reg_a: u8, reg_b: u8) -> Result<Flow, VMError> {
        self.alu(Instruction::Mul, reg_a, reg_b)?;
        Ok(Flow::Next)
    }

    /// `sp -= 1`, then `mem[sp] = reg`. With `reg` = `r7` the decremented
    /// stack pointer is what gets stored.
    fn op_push(&mut self, reg: u8) -> Result<Flow, VMError> {
        // Validate the source before touching the stack.
        self.registers.get(reg)?;
        let sp = self.registers.get(SP)?;
        let top = sp.checked_sub(1).ok_or(VMError::StackOverflow { sp })?;
        self.registers.set(SP, top)?;
        let value = self.registers.get(reg)?;
        self.memory.write(top as usize, value)?;
        Ok(Flow::Next)
    }

    /// `reg = mem[sp]`, then `sp += 1`. With `reg` = `r7` the increment
    /// applies to the popped value.
    fn op_pop(&mut self, reg: u8) -> Result<Flow, VMError> {
        self.registers.get(reg)?;
        let sp = self.registers.get(SP)?;
        let value = self.memory.read(sp as usize)?;
        let sp_after_load = if reg == SP { value } else { sp };
        let next = sp_after_load
            .checked_add(1)
            .ok_or(VMError::StackUnderflow { sp: sp_after_load })?;
        self.registers.set(reg, value)?;
        self.registers.set(SP, next)?;
        Ok(Flow::Next)
    }

    fn op_call(&mut self, reg: u8) -> Result<Flow, VMError> {
        let target = self.registers.get(reg)?;
        let return_addr = self.pc + Instruction::Call.width();
        let return_addr = u8::try_from(return_addr).map_err(|_| VMError::AddressOutOfBounds {
            address: return_addr,
            size: MEMORY_SIZE,
        })?;
        self.push_value(return_addr)?;
        Ok(Flow::Jump(target as usize))
    }

    fn op_ret(&mut self) -> Result<Flow, VMError> {
        let return_addr = self.pop_value()?;
        Ok(Flow::Jump(return_addr as usize))
    }

    /// Renders `pc`, the three bytes at `pc` and all registers in hex.
    ///
    /// ```text
    /// TRACE: 00 | 82 00 08 | 00 00 00 00 00 00 00 F4
    /// ```
    ///
    /// Bytes past the end of memory are shown as `--`.
    pub fn trace(&self) -> String {
        let bytes: Vec<String> = (0..3)
            .map(|offset| match self.memory.read(self.pc + offset) {
                Ok(byte) => format!("{byte:02X}"),
                Err(_) => "--".to_string(),
            })
            .collect();
        let registers: Vec<String> = self
            .registers
            .as_slice()
            .iter()
            .map(|value| format!("{value:02X}"))
            .collect();

        format!(
            "TRACE: {:02X} | {} | {}",
            self.pc,
            bytes.join(" "),
            registers.join(" ")
        )
    }
}
