// Wed Aug 5 2026 - Alex

pub mod projector;
pub mod table;

pub use projector::{format_hex, format_hex_short, project, Row, FLAT_DEPTH};
pub use table::{escape_value, TableWriter};
