use nibble_mem::MemoryError;
use nibble_storage::DiskError;
use thiserror::Error;

use crate::io::ConsoleError;

/// Failures that abort [`crate::Cpu::execute`].
///
/// Unrecognized opcodes and bad register indices are not errors; they halt the
/// CPU cleanly and are reported through [`crate::HaltReason`].
#[derive(Debug, Error)]
pub enum CpuError {
    #[error("memory fault: {0}")]
    Memory(#[from] MemoryError),

    #[error("disk fault: {0}")]
    Disk(#[from] DiskError),

    #[error("console failure: {0}")]
    Console(#[from] ConsoleError),
}
