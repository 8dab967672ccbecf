use thiserror::Error;

/// Smallest supported memory: the full range of a 16-bit program counter.
pub const MIN_MEMORY_SIZE: u64 = 0x1_0000;

/// Errors returned by [`Memory`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MemoryError {
    /// The requested address range is outside the memory size.
    #[error("memory access out of range: addr=0x{addr:x} len={len} size=0x{size:x}")]
    OutOfRange { addr: u64, len: usize, size: u64 },

    #[error("memory size 0x{size:x} is below the minimum of 0x{min:x}")]
    TooSmall { size: u64, min: u64 },

    /// The requested size cannot be represented by the current platform's `usize`.
    #[error("memory size {size} does not fit in usize")]
    SizeTooLarge { size: u64 },
}

pub type MemoryResult<T> = Result<T, MemoryError>;

#[derive(Clone)]
pub struct Memory {
    bytes: Vec<u8>,
}

impl std::fmt::Debug for Memory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Dumping megabytes of zeroes is never useful.
        f.debug_struct("Memory")
            .field("size", &self.bytes.len())
            .finish()
    }
}

impl Memory {
    /// Allocates `size` zeroed bytes.
    pub fn new(size: u64) -> MemoryResult<Self> {
        if size < MIN_MEMORY_SIZE {
            return Err(MemoryError::TooSmall {
                size,
                min: MIN_MEMORY_SIZE,
            });
        }
        let len = usize::try_from(size).map_err(|_| MemoryError::SizeTooLarge { size })?;
        Ok(Self {
            bytes: vec![0; len],
        })
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn read_u8(&self, addr: u64) -> MemoryResult<u8> {
        let start = self.check_range(addr, 1)?;
        Ok(self.bytes[start])
    }

    pub fn write_u8(&mut self, addr: u64, value: u8) -> MemoryResult<()> {
        let start = self.check_range(addr, 1)?;
        self.bytes[start] = value;
        Ok(())
    }

    /// Copies `data` into memory starting at `addr`.
    ///
    /// The whole range is validated first; a failing call writes nothing.
    pub fn load(&mut self, addr: u64, data: &[u8]) -> MemoryResult<()> {
        let start = self.check_range(addr, data.len())?;
        self.bytes[start..start + data.len()].copy_from_slice(data);
        Ok(())
    }

    pub fn read_bytes(&self, addr: u64, dst: &mut [u8]) -> MemoryResult<()> {
        let start = self.check_range(addr, dst.len())?;
        dst.copy_from_slice(&self.bytes[start..start + dst.len()]);
        Ok(())
    }

    fn check_range(&self, addr: u64, len: usize) -> MemoryResult<usize> {
        let size = self.size();
        let err = MemoryError::OutOfRange { addr, len, size };
        let end = addr.checked_add(len as u64).ok_or(err.clone())?;
        if addr >= size || end > size {
            return Err(err);
        }
        // `addr < size`, and `size` came from a `usize`.
        Ok(addr as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_sizes_below_pc_range() {
        assert_eq!(
            Memory::new(0x8000).unwrap_err(),
            MemoryError::TooSmall {
                size: 0x8000,
                min: MIN_MEMORY_SIZE
            }
        );
        assert!(Memory::new(MIN_MEMORY_SIZE).is_ok());
    }

    #[test]
    fn starts_zeroed() {
        let mem = Memory::new(MIN_MEMORY_SIZE).unwrap();
        let mut buf = [0xAAu8; 64];
        mem.read_bytes(0xFFC0, &mut buf).unwrap();
        assert!(buf.iter().all(|b| *b == 0));
    }

    #[test]
    fn load_near_end_is_all_or_nothing() {
        let mut mem = Memory::new(MIN_MEMORY_SIZE).unwrap();
        let err = mem.load(0xFFFE, &[1, 2, 3]).unwrap_err();
        assert!(matches!(err, MemoryError::OutOfRange { addr: 0xFFFE, len: 3, .. }));
        assert_eq!(mem.read_u8(0xFFFE).unwrap(), 0);
        assert_eq!(mem.read_u8(0xFFFF).unwrap(), 0);
    }

    #[test]
    fn overflowing_range_is_reported_not_wrapped() {
        let mem = Memory::new(MIN_MEMORY_SIZE).unwrap();
        let mut buf = [0u8; 2];
        assert!(matches!(
            mem.read_bytes(u64::MAX, &mut buf),
            Err(MemoryError::OutOfRange { .. })
        ));
    }
}
