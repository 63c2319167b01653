// Mon Aug 3 2026 - Alex

pub mod config;
pub mod diag;
pub mod logging;
pub mod memory;
pub mod output;
pub mod rules;
pub mod scan;

pub use config::ScanConfig;
pub use diag::{CollectSink, DiagnosticSink, LogSink};
pub use memory::{Address, BufferLayer, ImageLayer, Layer, MemoryRange};
pub use output::TableWriter;
pub use rules::{CompileOptions, NativeEngine, RuleCompiler, RuleEngine, RuleError, RuleSet};
pub use scan::{scan, MatchRecord, MatchStream, ScanRequest};
