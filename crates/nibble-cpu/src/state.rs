use std::fmt;
use std::num::Wrapping;

pub const REG_COUNT: usize = 4;

/// General purpose registers.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Reg {
    R0 = 0,
    R1 = 1,
    R2 = 2,
    R3 = 3,
}

impl Reg {
    pub const ALL: [Reg; REG_COUNT] = [Reg::R0, Reg::R1, Reg::R2, Reg::R3];

    pub fn index(self) -> usize {
        self as usize
    }
}

impl TryFrom<u8> for Reg {
    type Error = u8;

    fn try_from(index: u8) -> Result<Self, u8> {
        Reg::ALL.get(index as usize).copied().ok_or(index)
    }
}

impl fmt::Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R{}", *self as u8)
    }
}

/// 8-bit stack pointer.
///
/// The stack lives in memory addresses `0x00..=0xFF` and grows downwards. The
/// pointer wraps modulo 256 on both push and pop, so overflowing the stack
/// silently reuses the same 256-byte window rather than spilling into the
/// rest of memory.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct StackPointer(Wrapping<u8>);

impl StackPointer {
    pub const RESET: StackPointer = StackPointer(Wrapping(0xFF));

    pub const fn new(value: u8) -> Self {
        Self(Wrapping(value))
    }

    pub fn get(self) -> u8 {
        self.0 .0
    }

    /// Memory address the pointer currently designates.
    pub fn addr(self) -> u64 {
        u64::from(self.get())
    }

    /// Post-push adjustment.
    pub fn decrement(&mut self) {
        self.0 -= Wrapping(1);
    }

    /// Pre-pop adjustment.
    pub fn increment(&mut self) {
        self.0 += Wrapping(1);
    }
}

impl Default for StackPointer {
    fn default() -> Self {
        Self::RESET
    }
}

impl fmt::Debug for StackPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StackPointer(0x{:02x})", self.get())
    }
}

/// Architectural CPU state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CpuState {
    regs: [u8; REG_COUNT],
    /// Address of the next instruction byte.
    pub pc: u16,
    pub sp: StackPointer,
    /// Zero flag: set when the register last written by LOAD/ADD/SUB/IN/DISK_READ is 0.
    pub zf: bool,
    pub running: bool,
}

impl Default for CpuState {
    fn default() -> Self {
        Self {
            regs: [0; REG_COUNT],
            pc: 0,
            sp: StackPointer::RESET,
            zf: false,
            running: false,
        }
    }
}

impl CpuState {
    pub fn reg(&self, reg: Reg) -> u8 {
        self.regs[reg.index()]
    }

    pub fn set_reg(&mut self, reg: Reg, value: u8) {
        self.regs[reg.index()] = value;
    }

    /// Writes `value` to `reg` and updates the zero flag from it.
    pub fn set_reg_flags(&mut self, reg: Reg, value: u8) {
        self.set_reg(reg, value);
        self.zf = value == 0;
    }

    pub fn regs(&self) -> [u8; REG_COUNT] {
        self.regs
    }
}
