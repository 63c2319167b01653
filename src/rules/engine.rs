// Tue Aug 4 2026 - Alex

use crate::rules::RuleError;
use std::sync::Arc;

/// One engine-native match: a chunk-local offset, the name of the string
/// that hit, and the matched bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringMatch {
    pub offset: usize,
    pub name: String,
    pub value: Vec<u8>,
}

impl StringMatch {
    pub fn new(offset: usize, name: &str, value: &[u8]) -> Self {
        Self {
            offset,
            name: name.to_string(),
            value: value.to_vec(),
        }
    }
}

/// A compiled, immutable set of named patterns.
///
/// Stateless after compilation; safe to share across scans.
pub trait RuleSet: Send + Sync {
    /// All matches within `data`, in the engine's native order.
    fn matches(&self, data: &[u8]) -> Vec<StringMatch>;
}

/// Capability of turning rule source text into a compiled rule set.
pub trait RuleEngine {
    fn compile(&self, source: &str) -> Result<Arc<dyn RuleSet>, RuleError>;
}

/// Deterministic rule set replaying a fixed script of matches.
///
/// Matches whose span falls outside the presented data are withheld, so a
/// script can be replayed against chunks of varying length.
pub struct ScriptedRules {
    script: Vec<StringMatch>,
}

impl ScriptedRules {
    pub fn new(script: Vec<StringMatch>) -> Self {
        Self { script }
    }
}

impl RuleSet for ScriptedRules {
    fn matches(&self, data: &[u8]) -> Vec<StringMatch> {
        self.script
            .iter()
            .filter(|m| m.offset + m.value.len() <= data.len())
            .cloned()
            .collect()
    }
}
