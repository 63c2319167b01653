// Mon Aug 3 2026 - Alex

use crate::memory::{MemoryError, MemoryRange};

/// Bytes handed to a scanner per traversal step.
pub const CHUNK_SIZE: usize = 0x0100_0000;

/// Extra bytes read past the chunk boundary so matches straddling it are
/// still visible to the scanner.
pub const DEFAULT_OVERLAP: usize = 0x1000;

/// A byte-addressable scan target.
///
/// A layer spans a single contiguous address window; reads use absolute
/// addresses within that window.
pub trait Layer: Send + Sync {
    /// The addressable window of this layer.
    fn range(&self) -> MemoryRange;

    /// Read `len` bytes starting at the absolute address `offset`.
    fn read_bytes(&self, offset: u64, len: usize) -> Result<Vec<u8>, MemoryError>;
}

/// Anything the traversal can position within the address space.
pub trait MatchOffset {
    fn absolute_offset(&self) -> u64;
}

/// Per-chunk scanning callback driven by the traversal.
///
/// Implementations receive each chunk together with its base offset and
/// report matches carrying absolute offsets.
pub trait ChunkScanner {
    type Match: MatchOffset;

    fn overlap(&self) -> usize {
        DEFAULT_OVERLAP
    }

    fn scan_chunk(&self, data: &[u8], base: u64) -> Vec<Self::Match>;
}
