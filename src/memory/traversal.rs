// Tue Aug 4 2026 - Alex

use crate::memory::layer::{ChunkScanner, Layer, MatchOffset, CHUNK_SIZE};
use crate::memory::{Address, MemoryRange};
use std::collections::VecDeque;

/// Pull-based traversal of a layer in bounded chunks.
///
/// Chunks are read with an overlap past the step boundary so that a match
/// straddling two chunks (up to `scanner.overlap()` bytes long) is seen by
/// the scanner once the next chunk starts. Matches starting at or beyond
/// the boundary are deferred to the chunk that re-covers them, so nothing
/// is reported twice. Unreadable chunks are logged and skipped.
pub struct ChunkedScan<'l, S: ChunkScanner> {
    layer: &'l dyn Layer,
    scanner: S,
    sections: Vec<MemoryRange>,
    section_idx: usize,
    cursor: u64,
    chunk_size: usize,
    pending: VecDeque<S::Match>,
}

impl<'l, S: ChunkScanner> ChunkedScan<'l, S> {
    /// Traverse `sections` of `layer` (the whole layer when `None`),
    /// driving `scanner` over each chunk.
    pub fn new(layer: &'l dyn Layer, scanner: S, sections: Option<Vec<MemoryRange>>) -> Self {
        let window = layer.range();
        let sections: Vec<MemoryRange> = match sections {
            Some(list) => list.iter().filter_map(|s| s.intersect(&window)).collect(),
            None => vec![window],
        };
        let cursor = sections.first().map(|s| s.start().as_u64()).unwrap_or(0);
        Self {
            layer,
            scanner,
            sections,
            section_idx: 0,
            cursor,
            chunk_size: CHUNK_SIZE,
            pending: VecDeque::new(),
        }
    }

    pub fn with_chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = size.max(1);
        self
    }

    /// Read and scan chunks until at least one match is queued or the
    /// traversal is exhausted.
    fn fill_pending(&mut self) -> bool {
        while self.pending.is_empty() {
            let section = match self.sections.get(self.section_idx) {
                Some(s) => *s,
                None => return false,
            };
            let end = section.end().as_u64();

            if self.cursor >= end {
                self.section_idx += 1;
                self.cursor = self
                    .sections
                    .get(self.section_idx)
                    .map(|s| s.start().as_u64())
                    .unwrap_or(0);
                continue;
            }

            let base = self.cursor;
            let remaining = (end - base) as usize;
            let read_len = remaining.min(self.chunk_size + self.scanner.overlap());
            self.cursor = base.saturating_add(self.chunk_size as u64);
            let has_next = self.cursor < end;
            let boundary = base + self.chunk_size as u64;

            match self.layer.read_bytes(base, read_len) {
                Ok(data) => {
                    for m in self.scanner.scan_chunk(&data, base) {
                        // Matches starting in the overlap belong to the next chunk.
                        if !has_next || m.absolute_offset() < boundary {
                            self.pending.push_back(m);
                        }
                    }
                }
                Err(e) => {
                    log::warn!("skipping unreadable chunk at {}: {}", Address::new(base), e);
                }
            }
        }
        true
    }
}

impl<'l, S: ChunkScanner> Iterator for ChunkedScan<'l, S> {
    type Item = S::Match;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(m) = self.pending.pop_front() {
            return Some(m);
        }
        if self.fill_pending() {
            self.pending.pop_front()
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::buffer::BufferLayer;
    use crate::memory::MemoryError;

    #[derive(Debug, PartialEq, Eq)]
    struct Hit(u64);

    impl MatchOffset for Hit {
        fn absolute_offset(&self) -> u64 {
            self.0
        }
    }

    /// Reports every occurrence of a fixed literal within the chunk.
    struct LiteralScanner {
        needle: Vec<u8>,
        overlap: usize,
    }

    impl ChunkScanner for LiteralScanner {
        type Match = Hit;

        fn overlap(&self) -> usize {
            self.overlap
        }

        fn scan_chunk(&self, data: &[u8], base: u64) -> Vec<Hit> {
            let mut hits = Vec::new();
            if data.len() < self.needle.len() {
                return hits;
            }
            for i in 0..=(data.len() - self.needle.len()) {
                if &data[i..i + self.needle.len()] == self.needle.as_slice() {
                    hits.push(Hit(base + i as u64));
                }
            }
            hits
        }
    }

    #[test]
    fn test_match_straddling_chunk_boundary_reported_once() {
        // "XY" straddles the boundary between chunk [0,4) and chunk [4,10).
        let layer = BufferLayer::new(b"aaaXYbbXYc".to_vec());
        let scanner = LiteralScanner { needle: b"XY".to_vec(), overlap: 2 };
        let hits: Vec<u64> = ChunkedScan::new(&layer, scanner, None)
            .with_chunk_size(4)
            .map(|h| h.0)
            .collect();
        assert_eq!(hits, vec![3, 7]);
    }

    #[test]
    fn test_sections_restrict_traversal() {
        let layer = BufferLayer::new(b"XYaaaaXYaa".to_vec());
        let scanner = LiteralScanner { needle: b"XY".to_vec(), overlap: 2 };
        let sections = vec![MemoryRange::new(Address::new(4), 6)];
        let hits: Vec<u64> = ChunkedScan::new(&layer, scanner, Some(sections))
            .with_chunk_size(4)
            .map(|h| h.0)
            .collect();
        assert_eq!(hits, vec![6]);
    }

    #[test]
    fn test_sections_clipped_to_layer() {
        let layer = BufferLayer::new(b"aaXY".to_vec());
        let scanner = LiteralScanner { needle: b"XY".to_vec(), overlap: 2 };
        let sections = vec![MemoryRange::new(Address::new(0), 0x1000)];
        let hits: Vec<u64> = ChunkedScan::new(&layer, scanner, Some(sections))
            .map(|h| h.0)
            .collect();
        assert_eq!(hits, vec![2]);
    }

    struct FailingLayer {
        inner: BufferLayer,
        bad: MemoryRange,
    }

    impl Layer for FailingLayer {
        fn range(&self) -> MemoryRange {
            self.inner.range()
        }

        fn read_bytes(&self, offset: u64, len: usize) -> Result<Vec<u8>, MemoryError> {
            if self.bad.contains(Address::new(offset)) {
                return Err(MemoryError::OutOfBounds(offset, len));
            }
            self.inner.read_bytes(offset, len)
        }
    }

    #[test]
    fn test_unreadable_chunk_skipped() {
        let inner = BufferLayer::new(b"XYaaXYaaXYaa".to_vec());
        let layer = FailingLayer {
            inner,
            bad: MemoryRange::new(Address::new(4), 4),
        };
        let scanner = LiteralScanner { needle: b"XY".to_vec(), overlap: 2 };
        let hits: Vec<u64> = ChunkedScan::new(&layer, scanner, None)
            .with_chunk_size(4)
            .map(|h| h.0)
            .collect();
        // The chunk at [4,8) fails to read; its match is lost, the rest survive.
        assert_eq!(hits, vec![0, 8]);
    }
}
