// Tue Aug 4 2026 - Alex

pub mod compiler;
pub mod engine;
pub mod error;
pub mod native;
pub mod options;
pub mod pattern;
pub mod resource;

pub use compiler::RuleCompiler;
pub use engine::{RuleEngine, RuleSet, ScriptedRules, StringMatch};
pub use error::RuleError;
pub use native::NativeEngine;
pub use options::{CompileOptions, DEFAULT_MAX_SIZE};
pub use pattern::Pattern;
pub use resource::ResourceAccessor;
