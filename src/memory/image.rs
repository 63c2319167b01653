// Mon Aug 3 2026 - Alex

use crate::memory::{Address, Layer, MemoryError, MemoryRange};
use memmap2::Mmap;
use std::fs::File;
use std::path::Path;

/// Memory-mapped raw image file exposed as a scan layer.
///
/// The image occupies `[base, base + file_len)` in the address space;
/// `base` defaults to zero.
pub struct ImageLayer {
    mmap: Mmap,
    base: Address,
}

impl ImageLayer {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, MemoryError> {
        let file = File::open(path)?;
        let mmap = unsafe { Mmap::map(&file) }?;
        Ok(Self {
            mmap,
            base: Address::zero(),
        })
    }

    pub fn with_base(mut self, base: Address) -> Self {
        self.base = base;
        self
    }

    pub fn base(&self) -> Address {
        self.base
    }

    pub fn len(&self) -> usize {
        self.mmap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mmap.len() == 0
    }

    pub fn as_slice(&self) -> &[u8] {
        self.mmap.as_ref()
    }

    fn local_offset(&self, offset: u64) -> Result<usize, MemoryError> {
        offset
            .checked_sub(self.base.as_u64())
            .map(|o| o as usize)
            .ok_or(MemoryError::BelowBase(offset, self.base.as_u64()))
    }
}

impl Layer for ImageLayer {
    fn range(&self) -> MemoryRange {
        MemoryRange::new(self.base, self.mmap.len() as u64)
    }

    fn read_bytes(&self, offset: u64, len: usize) -> Result<Vec<u8>, MemoryError> {
        let local = self.local_offset(offset)?;
        let end = local
            .checked_add(len)
            .filter(|&e| e <= self.mmap.len())
            .ok_or(MemoryError::OutOfBounds(offset, len))?;
        Ok(self.mmap[local..end].to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn image_with(content: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_open_and_read() {
        let file = image_with(b"hello memory");
        let layer = ImageLayer::open(file.path()).unwrap();
        assert_eq!(layer.range().size(), 12);
        assert_eq!(layer.read_bytes(6, 6).unwrap(), b"memory");
    }

    #[test]
    fn test_base_translation() {
        let file = image_with(b"abcdef");
        let layer = ImageLayer::open(file.path())
            .unwrap()
            .with_base(Address::new(0x1000));
        assert_eq!(layer.range().start(), Address::new(0x1000));
        assert_eq!(layer.read_bytes(0x1002, 2).unwrap(), b"cd");
        assert!(layer.read_bytes(0x500, 1).is_err());
    }

    #[test]
    fn test_out_of_bounds_read() {
        let file = image_with(b"abc");
        let layer = ImageLayer::open(file.path()).unwrap();
        assert!(matches!(
            layer.read_bytes(2, 10),
            Err(MemoryError::OutOfBounds(2, 10))
        ));
    }
}
