#![forbid(unsafe_code)]

//! CPU engine for the nibble machine.
//!
//! The machine is an 8-bit accumulator-style CPU with four registers, a 16-bit
//! program counter, an 8-bit stack pointer and a single zero flag. Instructions
//! are one byte (`opcode << 4 | operand`) optionally followed by one or two
//! operand bytes; see [`isa::Opcode`] for the table.
//!
//! [`Cpu`] borrows its collaborators for the duration of a run:
//! - [`nibble_mem::Memory`] for instruction fetch, `STORE` and the stack
//! - any [`nibble_storage::ByteStorage`] for `DISK_READ`/`DISK_WRITE`
//! - any [`io::Console`] for `IN`/`OUT`

mod error;
mod exec;

pub mod io;
pub mod isa;
pub mod state;

pub use error::CpuError;
pub use exec::{Cpu, HaltReason, RunExit, Step};
pub use io::{Console, ConsoleError, ScriptedConsole};
pub use isa::Opcode;
pub use state::{CpuState, Reg, StackPointer, REG_COUNT};
