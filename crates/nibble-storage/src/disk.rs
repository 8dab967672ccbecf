use crate::{DiskError, Result};

/// Fixed-capacity, byte-addressed storage.
///
/// Addresses are 0-based; any `addr >= capacity()` fails with
/// [`DiskError::OutOfBounds`] and leaves the store untouched.
pub trait ByteStorage {
    fn capacity(&self) -> u64;

    fn read_u8(&mut self, addr: u64) -> Result<u8>;

    /// Stores one byte. When this returns `Ok`, a subsequent `read_u8` of the
    /// same address observes `value`, even from a fresh handle.
    fn write_u8(&mut self, addr: u64, value: u8) -> Result<()>;
}

impl<T: ByteStorage + ?Sized> ByteStorage for &mut T {
    #[inline]
    fn capacity(&self) -> u64 {
        <T as ByteStorage>::capacity(&**self)
    }

    #[inline]
    fn read_u8(&mut self, addr: u64) -> Result<u8> {
        <T as ByteStorage>::read_u8(&mut **self, addr)
    }

    #[inline]
    fn write_u8(&mut self, addr: u64, value: u8) -> Result<()> {
        <T as ByteStorage>::write_u8(&mut **self, addr, value)
    }
}

impl<T: ByteStorage + ?Sized> ByteStorage for Box<T> {
    #[inline]
    fn capacity(&self) -> u64 {
        <T as ByteStorage>::capacity(&**self)
    }

    #[inline]
    fn read_u8(&mut self, addr: u64) -> Result<u8> {
        <T as ByteStorage>::read_u8(&mut **self, addr)
    }

    #[inline]
    fn write_u8(&mut self, addr: u64, value: u8) -> Result<()> {
        <T as ByteStorage>::write_u8(&mut **self, addr, value)
    }
}

pub(crate) fn check_addr(addr: u64, capacity: u64) -> Result<()> {
    if addr >= capacity {
        return Err(DiskError::OutOfBounds { addr, capacity });
    }
    Ok(())
}

/// Volatile in-memory disk.
#[derive(Debug, Clone)]
pub struct MemDisk {
    data: Vec<u8>,
}

impl MemDisk {
    pub fn new(capacity: u64) -> Result<Self> {
        let len = usize::try_from(capacity)
            .map_err(|_| DiskError::InvalidConfig("capacity does not fit in usize"))?;
        Ok(Self { data: vec![0; len] })
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }
}

impl ByteStorage for MemDisk {
    fn capacity(&self) -> u64 {
        self.data.len() as u64
    }

    fn read_u8(&mut self, addr: u64) -> Result<u8> {
        check_addr(addr, self.capacity())?;
        Ok(self.data[addr as usize])
    }

    fn write_u8(&mut self, addr: u64, value: u8) -> Result<()> {
        check_addr(addr, self.capacity())?;
        self.data[addr as usize] = value;
        Ok(())
    }
}
