// Mon Aug 3 2026 - Alex

pub mod address;
pub mod buffer;
pub mod error;
pub mod image;
pub mod layer;
pub mod range;
pub mod traversal;

pub use address::Address;
pub use buffer::BufferLayer;
pub use error::MemoryError;
pub use image::ImageLayer;
pub use layer::{ChunkScanner, Layer, MatchOffset, CHUNK_SIZE, DEFAULT_OVERLAP};
pub use range::MemoryRange;
pub use traversal::ChunkedScan;
