// Tue Aug 4 2026 - Alex

use crate::diag::{DiagnosticSink, LogSink};
use crate::memory::{ChunkedScan, Layer, MemoryRange};
use crate::rules::{RuleSet, DEFAULT_MAX_SIZE};
use crate::scan::adapter::RuleScanner;
use crate::scan::MatchRecord;
use log::Level;
use std::sync::Arc;

/// One scan invocation: a rule set plus optional section restriction and
/// the advisory byte budget.
///
/// A missing rule set is the designed no-op path; running it yields an
/// empty stream rather than an error.
pub struct ScanRequest {
    rules: Option<Arc<dyn RuleSet>>,
    sections: Option<Vec<MemoryRange>>,
    max_size: u64,
}

impl ScanRequest {
    pub fn new(rules: Option<Arc<dyn RuleSet>>) -> Self {
        Self {
            rules,
            sections: None,
            max_size: DEFAULT_MAX_SIZE,
        }
    }

    pub fn with_sections(mut self, sections: Vec<MemoryRange>) -> Self {
        self.sections = Some(sections);
        self
    }

    pub fn with_max_size(mut self, max_size: u64) -> Self {
        self.max_size = max_size;
        self
    }

    /// Drive the layer traversal with a scanner bound to the rule set,
    /// yielding matches lazily in traversal order.
    pub fn run<'l>(&self, layer: &'l dyn Layer, sink: &dyn DiagnosticSink) -> MatchStream<'l> {
        let rules = match &self.rules {
            Some(rules) => Arc::clone(rules),
            None => return MatchStream::empty(),
        };
        let sections = self.bounded_sections(layer, sink);
        let traversal = ChunkedScan::new(layer, RuleScanner::new(rules), Some(sections));
        MatchStream {
            inner: Some(traversal),
        }
    }

    /// Sections clipped to the layer window, with the cumulative length
    /// capped at `max_size`.
    fn bounded_sections(&self, layer: &dyn Layer, sink: &dyn DiagnosticSink) -> Vec<MemoryRange> {
        let window = layer.range();
        let requested = self
            .sections
            .clone()
            .unwrap_or_else(|| vec![window]);

        let mut budget = self.max_size;
        let mut clamped = false;
        let mut out = Vec::with_capacity(requested.len());
        for section in requested {
            let section = match section.intersect(&window) {
                Some(s) => s,
                None => continue,
            };
            if budget == 0 {
                clamped = true;
                break;
            }
            if section.size() > budget {
                out.push(section.truncated(budget));
                budget = 0;
                clamped = true;
            } else {
                budget -= section.size();
                out.push(section);
            }
        }
        if clamped {
            sink.report(
                Level::Warn,
                &format!("scan truncated at max_size of {} bytes", self.max_size),
            );
        }
        out
    }
}

/// Lazy stream of [`MatchRecord`]s produced by a scan request.
pub struct MatchStream<'l> {
    inner: Option<ChunkedScan<'l, RuleScanner>>,
}

impl<'l> MatchStream<'l> {
    pub fn empty() -> Self {
        Self { inner: None }
    }
}

impl<'l> Iterator for MatchStream<'l> {
    type Item = MatchRecord;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.as_mut()?.next()
    }
}

/// One-shot entry point: scan `layer` with `rules`, optionally restricted
/// to `sections`.
pub fn scan<'l>(
    layer: &'l dyn Layer,
    rules: Option<Arc<dyn RuleSet>>,
    sections: Option<Vec<MemoryRange>>,
) -> MatchStream<'l> {
    let mut request = ScanRequest::new(rules);
    if let Some(sections) = sections {
        request = request.with_sections(sections);
    }
    request.run(layer, &LogSink)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diag::CollectSink;
    use crate::memory::{Address, BufferLayer};
    use crate::rules::{NativeEngine, RuleEngine};

    fn abc_rules() -> Arc<dyn RuleSet> {
        NativeEngine::new()
            .compile(r#"rule r1 {strings: $a = "ABC" condition: $a}"#)
            .unwrap()
    }

    fn layer_with_abc_at_100() -> BufferLayer {
        let mut data = vec![0u8; 0x100];
        data[100..103].copy_from_slice(b"ABC");
        BufferLayer::new(data)
    }

    #[test]
    fn test_missing_rules_yields_empty_stream() {
        let layer = layer_with_abc_at_100();
        let records: Vec<_> = scan(&layer, None, None).collect();
        assert!(records.is_empty());
    }

    #[test]
    fn test_single_match_at_absolute_offset() {
        let layer = layer_with_abc_at_100();
        let records: Vec<_> = scan(&layer, Some(abc_rules()), None).collect();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].offset(), Address::new(100));
        assert_eq!(records[0].rule(), "$a");
        assert_eq!(records[0].value(), b"ABC");
    }

    #[test]
    fn test_layer_base_carries_into_offsets() {
        let mut data = vec![0u8; 0x40];
        data[8..11].copy_from_slice(b"ABC");
        let layer = BufferLayer::new(data).with_base(Address::new(0x8000_0000));
        let records: Vec<_> = scan(&layer, Some(abc_rules()), None).collect();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].offset(), Address::new(0x8000_0008));
    }

    #[test]
    fn test_sections_exclude_match() {
        let layer = layer_with_abc_at_100();
        let sections = vec![MemoryRange::new(Address::new(0), 50)];
        let records: Vec<_> = scan(&layer, Some(abc_rules()), Some(sections)).collect();
        assert!(records.is_empty());
    }

    #[test]
    fn test_sections_include_match() {
        let layer = layer_with_abc_at_100();
        let sections = vec![
            MemoryRange::new(Address::new(0), 50),
            MemoryRange::new(Address::new(96), 16),
        ];
        let records: Vec<_> = scan(&layer, Some(abc_rules()), Some(sections)).collect();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].offset(), Address::new(100));
    }

    #[test]
    fn test_scan_is_idempotent() {
        let layer = layer_with_abc_at_100();
        let rules = abc_rules();
        let first: Vec<_> = scan(&layer, Some(Arc::clone(&rules)), None).collect();
        let second: Vec<_> = scan(&layer, Some(rules), None).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_max_size_truncates_and_warns() {
        let layer = layer_with_abc_at_100();
        let sink = CollectSink::new();
        let records: Vec<_> = ScanRequest::new(Some(abc_rules()))
            .with_max_size(50)
            .run(&layer, &sink)
            .collect();
        assert!(records.is_empty());
        let messages = sink.messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].0, Level::Warn);
        assert!(messages[0].1.contains("max_size"));
    }

    #[test]
    fn test_max_size_budget_spans_sections() {
        let mut data = vec![0u8; 0x100];
        data[0..3].copy_from_slice(b"ABC");
        data[0x80..0x83].copy_from_slice(b"ABC");
        let layer = BufferLayer::new(data);
        let sink = CollectSink::new();
        let sections = vec![
            MemoryRange::new(Address::new(0), 0x40),
            MemoryRange::new(Address::new(0x80), 0x40),
        ];
        let records: Vec<_> = ScanRequest::new(Some(abc_rules()))
            .with_sections(sections)
            .with_max_size(0x40)
            .run(&layer, &sink)
            .collect();
        // Budget is exhausted by the first section; the second never runs.
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].offset(), Address::new(0));
    }
}
