// Wed Aug 5 2026 - Alex

use crate::scan::MatchRecord;

/// Tree depth of every row; the output grid is flat.
pub const FLAT_DEPTH: usize = 0;

/// A rendered output row: depth marker plus the three display columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub depth: usize,
    pub offset: String,
    pub rule: String,
    pub value: Vec<u8>,
}

/// Map one match record into the rendering schema.
pub fn project(record: &MatchRecord) -> Row {
    Row {
        depth: FLAT_DEPTH,
        offset: format_hex_short(record.offset().as_u64()),
        rule: record.rule().to_string(),
        value: record.value().to_vec(),
    }
}

pub fn format_hex(value: u64) -> String {
    format!("0x{:016x}", value)
}

pub fn format_hex_short(value: u64) -> String {
    format!("0x{:x}", value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::Address;

    #[test]
    fn test_project_flat_row() {
        let record = MatchRecord::new(Address::new(0x1a0), "$a".to_string(), b"ABC".to_vec());
        let row = project(&record);
        assert_eq!(row.depth, 0);
        assert_eq!(row.offset, "0x1a0");
        assert_eq!(row.rule, "$a");
        assert_eq!(row.value, b"ABC");
    }

    #[test]
    fn test_hex_formats() {
        assert_eq!(format_hex_short(0xdead), "0xdead");
        assert_eq!(format_hex(0xdead), "0x000000000000dead");
    }
}
