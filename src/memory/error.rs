// Mon Aug 3 2026 - Alex

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MemoryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Out of bounds: read of {1} bytes at 0x{0:x}")]
    OutOfBounds(u64, usize),
    #[error("Address 0x{0:x} below layer base 0x{1:x}")]
    BelowBase(u64, u64),
    #[error("Invalid memory range")]
    InvalidRange,
}
