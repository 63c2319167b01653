// Wed Aug 5 2026 - Alex

use crate::diag::DiagnosticSink;
use crate::rules::engine::{RuleEngine, RuleSet};
use crate::rules::resource::ResourceAccessor;
use crate::rules::{CompileOptions, RuleError};
use log::Level;
use std::sync::Arc;

/// Builds a rule set from the configured rule source.
///
/// Inline rules win over a rule file when both are given. With neither, a
/// diagnostic is reported and `Ok(None)` is returned so the scan completes
/// with zero matches instead of failing.
pub struct RuleCompiler<'e> {
    engine: &'e dyn RuleEngine,
}

impl<'e> RuleCompiler<'e> {
    pub fn new(engine: &'e dyn RuleEngine) -> Self {
        Self { engine }
    }

    pub fn compile(
        &self,
        options: &CompileOptions,
        sink: &dyn DiagnosticSink,
    ) -> Result<Option<Arc<dyn RuleSet>>, RuleError> {
        if let Some(rule) = &options.yara_rules {
            let source = Self::inline_source(rule, options.insensitive, options.wide);
            log::debug!("compiling inline rule source: {}", source);
            return Ok(Some(self.engine.compile(&source)?));
        }
        if let Some(uri) = &options.yara_file {
            let source = ResourceAccessor::new().read_to_string(uri)?;
            log::debug!("compiling rule file {}", uri);
            return Ok(Some(self.engine.compile(&source)?));
        }
        sink.report(Level::Error, &RuleError::NoRulesSpecified.to_string());
        Ok(None)
    }

    /// Embed a single inline pattern into rule source text.
    ///
    /// Text not already delimited as a hex (`{`) or regex (`/`) pattern is
    /// quoted as a literal string; the modifier flags append engine
    /// modifiers.
    pub fn inline_source(rule: &str, insensitive: bool, wide: bool) -> String {
        let mut rule = if rule.starts_with('{') || rule.starts_with('/') {
            rule.to_string()
        } else {
            format!("\"{}\"", rule)
        };
        if insensitive {
            rule.push_str(" nocase");
        }
        if wide {
            rule.push_str(" wide ascii");
        }
        format!("rule r1 {{strings: $a = {} condition: $a}}", rule)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diag::CollectSink;
    use crate::rules::engine::{ScriptedRules, StringMatch};
    use std::cell::RefCell;

    /// Engine double recording every source it is asked to compile.
    struct RecordingEngine {
        sources: RefCell<Vec<String>>,
    }

    impl RecordingEngine {
        fn new() -> Self {
            Self {
                sources: RefCell::new(Vec::new()),
            }
        }
    }

    impl RuleEngine for RecordingEngine {
        fn compile(&self, source: &str) -> Result<Arc<dyn RuleSet>, RuleError> {
            self.sources.borrow_mut().push(source.to_string());
            Ok(Arc::new(ScriptedRules::new(vec![StringMatch::new(
                0, "$a", b"x",
            )])))
        }
    }

    #[test]
    fn test_literal_is_quoted() {
        let source = RuleCompiler::inline_source("MZ", false, false);
        assert_eq!(source, r#"rule r1 {strings: $a = "MZ" condition: $a}"#);
    }

    #[test]
    fn test_delimited_patterns_pass_through() {
        let hex = RuleCompiler::inline_source("{ 4D 5A }", false, false);
        assert!(hex.contains(r#"$a = { 4D 5A }"#));
        let re = RuleCompiler::inline_source("/MZ.+PE/", false, false);
        assert!(re.contains("$a = /MZ.+PE/"));
    }

    #[test]
    fn test_insensitive_adds_nocase_once() {
        let source = RuleCompiler::inline_source("evil", true, false);
        assert_eq!(source.matches("nocase").count(), 1);
    }

    #[test]
    fn test_wide_adds_wide_and_ascii() {
        let source = RuleCompiler::inline_source("evil", false, true);
        assert!(source.contains("wide"));
        assert!(source.contains("ascii"));
    }

    #[test]
    fn test_inline_wins_over_file() {
        let engine = RecordingEngine::new();
        let options = CompileOptions::new()
            .with_inline("ABC")
            .with_file("/never/read.yar");
        let sink = CollectSink::new();
        let rules = RuleCompiler::new(&engine).compile(&options, &sink).unwrap();
        assert!(rules.is_some());
        let sources = engine.sources.borrow();
        assert_eq!(sources.len(), 1);
        assert!(sources[0].contains("\"ABC\""));
    }

    #[test]
    fn test_no_rules_is_a_diagnostic_not_an_error() {
        let engine = RecordingEngine::new();
        let sink = CollectSink::new();
        let rules = RuleCompiler::new(&engine)
            .compile(&CompileOptions::new(), &sink)
            .unwrap();
        assert!(rules.is_none());
        assert!(engine.sources.borrow().is_empty());
        let messages = sink.messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].0, Level::Error);
        assert!(messages[0].1.contains("No yara rules"));
    }

    #[test]
    fn test_end_to_end_with_native_engine() {
        use crate::rules::NativeEngine;

        let engine = NativeEngine::new();
        let options = CompileOptions::new().with_inline("ABC").insensitive(true);
        let sink = CollectSink::new();
        let rules = RuleCompiler::new(&engine)
            .compile(&options, &sink)
            .unwrap()
            .unwrap();
        let matches = rules.matches(b"..abc..");
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].offset, 2);
    }
}
