// Wed Aug 5 2026 - Alex

use crate::output::projector::Row;
use std::io::{self, Write};

/// Incremental writer for the Offset / Rule / Value table.
///
/// The header is written with the first row, so an empty scan produces no
/// output beyond what the caller prints itself.
pub struct TableWriter<W: Write> {
    out: W,
    wrote_header: bool,
    rows: usize,
}

impl<W: Write> TableWriter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            wrote_header: false,
            rows: 0,
        }
    }

    pub fn write_row(&mut self, row: &Row) -> io::Result<()> {
        if !self.wrote_header {
            writeln!(self.out, "{:<18} {:<16} Value", "Offset", "Rule")?;
            self.wrote_header = true;
        }
        let indent = "  ".repeat(row.depth);
        writeln!(
            self.out,
            "{}{:<18} {:<16} {}",
            indent,
            row.offset,
            row.rule,
            escape_value(&row.value)
        )?;
        self.rows += 1;
        Ok(())
    }

    pub fn rows_written(&self) -> usize {
        self.rows
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

/// Printable bytes pass through; everything else renders as `\xNN`.
pub fn escape_value(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    for &b in bytes {
        match b {
            b'\\' => out.push_str("\\\\"),
            0x20..=0x7e => out.push(b as char),
            _ => out.push_str(&format!("\\x{:02x}", b)),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::projector::Row;

    fn row(offset: &str, rule: &str, value: &[u8]) -> Row {
        Row {
            depth: 0,
            offset: offset.to_string(),
            rule: rule.to_string(),
            value: value.to_vec(),
        }
    }

    #[test]
    fn test_header_written_once() {
        let mut writer = TableWriter::new(Vec::new());
        writer.write_row(&row("0x64", "$a", b"ABC")).unwrap();
        writer.write_row(&row("0x70", "$a", b"ABC")).unwrap();
        let text = String::from_utf8(writer.out).unwrap();
        assert_eq!(text.matches("Offset").count(), 1);
        assert_eq!(writer.rows, 2);
    }

    #[test]
    fn test_value_escaping() {
        assert_eq!(escape_value(b"ABC"), "ABC");
        assert_eq!(escape_value(b"A\x00B"), "A\\x00B");
        assert_eq!(escape_value(b"a\\b"), "a\\\\b");
    }
}
