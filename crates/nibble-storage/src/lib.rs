//! Persistent byte storage ("disk") for the nibble machine.
//!
//! The CPU consumes storage through the [`ByteStorage`] trait: a fixed-capacity,
//! byte-addressed region with bounds-checked single-byte access. This crate
//! provides:
//!
//! - [`FileDisk`]: file-backed store, zero-filled on creation and synchronously
//!   flushed on every write
//! - [`MemDisk`]: volatile in-memory store with the same addressing rules

#![forbid(unsafe_code)]

mod disk;
mod error;
mod file;

pub use disk::{ByteStorage, MemDisk};
pub use error::{DiskError, Result};
pub use file::FileDisk;

/// Reference capacity of the persistent store (100 MiB).
pub const DEFAULT_DISK_CAPACITY: u64 = 100 * 1024 * 1024;

/// Backing file used when the host does not name one.
pub const DEFAULT_DISK_PATH: &str = "virtual_disk.bin";
