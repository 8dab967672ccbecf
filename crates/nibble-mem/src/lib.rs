//! Primary memory for the nibble machine.
//!
//! [`Memory`] is a flat, zero-initialised byte array of fixed capacity. Every
//! access is bounds-checked; nothing wraps into adjacent storage. The CPU only
//! ever reaches the first 64 KiB (its program counter is 16 bits wide), but the
//! host may allocate more.

#![forbid(unsafe_code)]

mod memory;

pub use memory::{Memory, MemoryError, MemoryResult, MIN_MEMORY_SIZE};
