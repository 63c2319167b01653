// Tue Aug 4 2026 - Alex

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RuleError {
    #[error("Rule compile error: {0}")]
    Compile(String),
    #[error("No yara rules, nor yara rules file were specified")]
    NoRulesSpecified,
    #[error("Rule resource unavailable: {0}")]
    Resource(String),
    #[error("Unsupported rule source scheme: {0}")]
    UnsupportedScheme(String),
    #[error("Invalid regex in rule: {0}")]
    Regex(#[from] regex::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
