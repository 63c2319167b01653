// Mon Aug 3 2026 - Alex

use crate::memory::{Address, MemoryRange};
use crate::rules::{CompileOptions, DEFAULT_MAX_SIZE};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Full configuration surface of one scan invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Memory image to scan.
    pub image: PathBuf,
    /// Base address the image is mapped at.
    pub base: u64,
    pub insensitive: bool,
    pub wide: bool,
    pub yara_rules: Option<String>,
    pub yara_file: Option<String>,
    pub max_size: u64,
    pub sections: Vec<SectionSpec>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SectionSpec {
    pub start: u64,
    pub length: u64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            image: PathBuf::new(),
            base: 0,
            insensitive: false,
            wide: false,
            yara_rules: None,
            yara_file: None,
            max_size: DEFAULT_MAX_SIZE,
            sections: Vec::new(),
        }
    }
}

impl ScanConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let contents = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let contents = serde_json::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        Self::load(path).unwrap_or_default()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.image.as_os_str().is_empty() {
            return Err(ConfigError::Validation("an image path is required".to_string()));
        }
        if self.max_size == 0 {
            return Err(ConfigError::Validation("max_size must be > 0".to_string()));
        }
        if self.sections.iter().any(|s| s.length == 0) {
            return Err(ConfigError::Validation("sections must have nonzero length".to_string()));
        }
        Ok(())
    }

    pub fn compile_options(&self) -> CompileOptions {
        let mut options = CompileOptions::new()
            .insensitive(self.insensitive)
            .wide(self.wide)
            .max_size(self.max_size);
        if let Some(rule) = &self.yara_rules {
            options = options.with_inline(rule);
        }
        if let Some(uri) = &self.yara_file {
            options = options.with_file(uri);
        }
        options
    }

    pub fn section_ranges(&self) -> Option<Vec<MemoryRange>> {
        if self.sections.is_empty() {
            return None;
        }
        Some(
            self.sections
                .iter()
                .map(|s| MemoryRange::new(Address::new(s.start), s.length))
                .collect(),
        )
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {0:?}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Validation error: {0}")]
    Validation(String),
}
