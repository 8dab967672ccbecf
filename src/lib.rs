#![forbid(unsafe_code)]

//! Facade over the nibble machine crates.
//!
//! - [`mem`]: primary memory
//! - [`storage`]: persistent disk
//! - [`cpu`]: fetch-decode-execute engine
//! - [`machine`]: host harness tying the three together

pub use nibble_cpu as cpu;
pub use nibble_machine as machine;
pub use nibble_mem as mem;
pub use nibble_storage as storage;
