use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DiskError>;

#[derive(Debug, Error)]
pub enum DiskError {
    #[error("disk access out of bounds: addr=0x{addr:x} capacity=0x{capacity:x}")]
    OutOfBounds { addr: u64, capacity: u64 },

    /// The backing store could not be created or opened.
    ///
    /// Hosts treat this as fatal: nothing meaningful can run without the disk.
    #[error("disk backing file {} is unavailable: {source}", path.display())]
    Unavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),

    #[error("disk io error: {0}")]
    Io(#[from] std::io::Error),
}
