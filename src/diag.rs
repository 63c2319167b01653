// Mon Aug 3 2026 - Alex

use log::Level;
use std::sync::Mutex;

/// Invocation-scoped diagnostic channel.
///
/// Components report user-facing diagnostics here instead of talking to a
/// process-global logger, so callers decide where messages land.
pub trait DiagnosticSink {
    fn report(&self, level: Level, message: &str);
}

/// Forwards diagnostics to the `log` facade.
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn report(&self, level: Level, message: &str) {
        log::log!(level, "{}", message);
    }
}

/// Buffers diagnostics for later inspection.
#[derive(Default)]
pub struct CollectSink {
    messages: Mutex<Vec<(Level, String)>>,
}

impl CollectSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<(Level, String)> {
        self.messages.lock().map(|m| m.clone()).unwrap_or_default()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.messages().iter().any(|(_, m)| m.contains(needle))
    }
}

impl DiagnosticSink for CollectSink {
    fn report(&self, level: Level, message: &str) {
        if let Ok(mut messages) = self.messages.lock() {
            messages.push((level, message.to_string()));
        }
    }
}
