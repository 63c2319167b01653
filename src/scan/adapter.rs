// Tue Aug 4 2026 - Alex

use crate::memory::{Address, ChunkScanner};
use crate::rules::RuleSet;
use crate::scan::MatchRecord;
use std::sync::Arc;

/// Position-aware scanning callback over a compiled rule set.
///
/// Translates every chunk-local offset the engine reports into an absolute
/// offset by adding the chunk's base. Holds no state beyond the rule set,
/// so one scanner serves any number of chunks.
pub struct RuleScanner {
    rules: Arc<dyn RuleSet>,
}

impl RuleScanner {
    pub fn new(rules: Arc<dyn RuleSet>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &Arc<dyn RuleSet> {
        &self.rules
    }

    /// Lazy stream of matches within one chunk, absolute offsets included.
    pub fn matches_in<'a>(
        &'a self,
        data: &[u8],
        base: u64,
    ) -> impl Iterator<Item = MatchRecord> + 'a {
        self.rules
            .matches(data)
            .into_iter()
            .map(move |m| MatchRecord::new(Address::new(base + m.offset as u64), m.name, m.value))
    }
}

impl ChunkScanner for RuleScanner {
    type Match = MatchRecord;

    fn scan_chunk(&self, data: &[u8], base: u64) -> Vec<MatchRecord> {
        self.matches_in(data, base).collect()
    }
}
