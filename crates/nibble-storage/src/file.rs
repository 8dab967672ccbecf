use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::disk::{check_addr, ByteStorage};
use crate::{DiskError, Result};

/// Disk backed by a host file.
///
/// Every [`ByteStorage::write_u8`] is followed by `sync_data`, so a write is
/// durable before the call returns. There is no write-back cache.
#[derive(Debug)]
pub struct FileDisk {
    file: File,
    path: PathBuf,
    capacity: u64,
}

impl FileDisk {
    /// Opens `path`, creating it zero-filled to `capacity` bytes if it does not
    /// exist yet.
    ///
    /// Existing contents are reused verbatim. A file shorter than `capacity` is
    /// extended with zeroes; a longer one is left alone and only the first
    /// `capacity` bytes are addressable.
    pub fn open_or_create(path: impl AsRef<Path>, capacity: u64) -> Result<Self> {
        let path = path.as_ref();
        if capacity == 0 {
            return Err(DiskError::InvalidConfig("disk capacity must be non-zero"));
        }
        let unavailable = |source| DiskError::Unavailable {
            path: path.to_path_buf(),
            source,
        };

        let (file, created) = match OpenOptions::new().read(true).write(true).open(path) {
            Ok(file) => (file, false),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                let file = OpenOptions::new()
                    .read(true)
                    .write(true)
                    .create_new(true)
                    .open(path)
                    .map_err(unavailable)?;
                (file, true)
            }
            Err(e) => return Err(unavailable(e)),
        };

        let len = file.metadata().map_err(unavailable)?.len();
        if len < capacity {
            // Extending via `set_len` reads back as zeroes on every supported host.
            file.set_len(capacity).map_err(unavailable)?;
            file.sync_all().map_err(unavailable)?;
        }

        if created {
            tracing::debug!(path = %path.display(), capacity, "created zero-filled disk");
        } else {
            tracing::debug!(path = %path.display(), capacity, existing_len = len, "reopened disk");
        }

        Ok(Self {
            file,
            path: path.to_path_buf(),
            capacity,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ByteStorage for FileDisk {
    fn capacity(&self) -> u64 {
        self.capacity
    }

    fn read_u8(&mut self, addr: u64) -> Result<u8> {
        check_addr(addr, self.capacity)?;
        let mut buf = [0u8; 1];
        self.file.seek(SeekFrom::Start(addr))?;
        self.file.read_exact(&mut buf)?;
        Ok(buf[0])
    }

    fn write_u8(&mut self, addr: u64, value: u8) -> Result<()> {
        check_addr(addr, self.capacity)?;
        self.file.seek(SeekFrom::Start(addr))?;
        self.file.write_all(&[value])?;
        self.file.sync_data()?;
        tracing::trace!(addr, value, "disk write");
        Ok(())
    }
}
