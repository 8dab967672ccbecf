//! Instruction encoding.
//!
//! Every instruction starts with one byte: the high nibble selects the
//! [`Opcode`], the low nibble is the operand (a register index, or ignored).
//! Opcodes that need more data fetch it from the bytes that follow, so
//! instructions are 1, 2 or 3 bytes long. 16-bit addresses are little-endian.
//!
//! | Opcode | Mnemonic   | Extra bytes |
//! |--------|------------|-------------|
//! | 0x0    | NOP        | 0 |
//! | 0x1    | LOAD       | 1 (imm8) |
//! | 0x2    | STORE      | 1 (addr8) |
//! | 0x3    | ADD        | 1 (register m) |
//! | 0x4    | SUB        | 1 (register m) |
//! | 0x5    | JMP        | 2 (addr16) |
//! | 0x6    | JZ         | 2 (addr16) |
//! | 0x7    | CALL       | 2 (addr16) |
//! | 0x8    | RET        | 0 |
//! | 0x9    | IN         | 0 |
//! | 0xA    | OUT        | 0 |
//! | 0xB    | DISK_READ  | 2 (addr16) |
//! | 0xC    | DISK_WRITE | 2 (addr16) |
//! | 0xF    | HALT       | 0 |
//!
//! 0xD and 0xE are unassigned.

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    Nop = 0x0,
    Load = 0x1,
    Store = 0x2,
    Add = 0x3,
    Sub = 0x4,
    Jmp = 0x5,
    Jz = 0x6,
    Call = 0x7,
    Ret = 0x8,
    In = 0x9,
    Out = 0xA,
    DiskRead = 0xB,
    DiskWrite = 0xC,
    Halt = 0xF,
}

impl Opcode {
    /// Maps an opcode nibble to its instruction. Only the low 4 bits of `nibble`
    /// are considered.
    pub fn decode(nibble: u8) -> Option<Opcode> {
        Some(match nibble & 0x0F {
            0x0 => Opcode::Nop,
            0x1 => Opcode::Load,
            0x2 => Opcode::Store,
            0x3 => Opcode::Add,
            0x4 => Opcode::Sub,
            0x5 => Opcode::Jmp,
            0x6 => Opcode::Jz,
            0x7 => Opcode::Call,
            0x8 => Opcode::Ret,
            0x9 => Opcode::In,
            0xA => Opcode::Out,
            0xB => Opcode::DiskRead,
            0xC => Opcode::DiskWrite,
            0xF => Opcode::Halt,
            _ => return None,
        })
    }

    /// Number of bytes fetched after the instruction byte.
    pub fn extra_bytes(self) -> u8 {
        match self {
            Opcode::Load | Opcode::Store | Opcode::Add | Opcode::Sub => 1,
            Opcode::Jmp | Opcode::Jz | Opcode::Call | Opcode::DiskRead | Opcode::DiskWrite => 2,
            Opcode::Nop | Opcode::Ret | Opcode::In | Opcode::Out | Opcode::Halt => 0,
        }
    }

    /// Whether the operand nibble names a register.
    pub fn uses_register_operand(self) -> bool {
        matches!(
            self,
            Opcode::Load
                | Opcode::Store
                | Opcode::Add
                | Opcode::Sub
                | Opcode::In
                | Opcode::Out
                | Opcode::DiskRead
                | Opcode::DiskWrite
        )
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            Opcode::Nop => "NOP",
            Opcode::Load => "LOAD",
            Opcode::Store => "STORE",
            Opcode::Add => "ADD",
            Opcode::Sub => "SUB",
            Opcode::Jmp => "JMP",
            Opcode::Jz => "JZ",
            Opcode::Call => "CALL",
            Opcode::Ret => "RET",
            Opcode::In => "IN",
            Opcode::Out => "OUT",
            Opcode::DiskRead => "DISK_READ",
            Opcode::DiskWrite => "DISK_WRITE",
            Opcode::Halt => "HALT",
        }
    }
}

/// Splits an instruction byte into `(opcode nibble, operand nibble)`.
#[inline]
pub fn split(word: u8) -> (u8, u8) {
    (word >> 4, word & 0x0F)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_assigned_nibble_round_trips() {
        for nibble in 0u8..16 {
            match Opcode::decode(nibble) {
                Some(op) => assert_eq!(op as u8, nibble),
                None => assert!(nibble == 0xD || nibble == 0xE, "nibble {nibble:#x}"),
            }
        }
    }

    #[test]
    fn instruction_lengths() {
        assert_eq!(1 + Opcode::Nop.extra_bytes(), 1);
        assert_eq!(1 + Opcode::Load.extra_bytes(), 2);
        assert_eq!(1 + Opcode::Call.extra_bytes(), 3);
        assert_eq!(1 + Opcode::Ret.extra_bytes(), 1);
    }

    #[test]
    fn split_word() {
        assert_eq!(split(0x1F), (0x1, 0xF));
        assert_eq!(split(0xC2), (0xC, 0x2));
    }
}
