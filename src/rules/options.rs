// Tue Aug 4 2026 - Alex

/// Advisory upper bound on bytes scanned (1 GiB).
pub const DEFAULT_MAX_SIZE: u64 = 0x4000_0000;

/// Rule-source configuration consumed once by the compiler.
///
/// Exactly one of `yara_rules` / `yara_file` is meaningful; when both are
/// set the inline rules win and the file is never consulted.
#[derive(Debug, Clone)]
pub struct CompileOptions {
    pub yara_rules: Option<String>,
    pub yara_file: Option<String>,
    pub insensitive: bool,
    pub wide: bool,
    pub max_size: u64,
}

impl CompileOptions {
    pub fn new() -> Self {
        Self {
            yara_rules: None,
            yara_file: None,
            insensitive: false,
            wide: false,
            max_size: DEFAULT_MAX_SIZE,
        }
    }

    pub fn with_inline(mut self, rule: &str) -> Self {
        self.yara_rules = Some(rule.to_string());
        self
    }

    pub fn with_file(mut self, uri: &str) -> Self {
        self.yara_file = Some(uri.to_string());
        self
    }

    pub fn insensitive(mut self, insensitive: bool) -> Self {
        self.insensitive = insensitive;
        self
    }

    pub fn wide(mut self, wide: bool) -> Self {
        self.wide = wide;
        self
    }

    pub fn max_size(mut self, max_size: u64) -> Self {
        self.max_size = max_size;
        self
    }
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self::new()
    }
}
