// Wed Aug 5 2026 - Alex

use crate::rules::RuleError;
use flate2::read::GzDecoder;
use percent_encoding::percent_decode_str;
use std::fs;
use std::io::Read;
use std::path::PathBuf;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Resolves a rule-file URI into its bytes.
///
/// Accepts plain local paths and `file://` URIs; gzip-compressed files are
/// detected by magic and decompressed transparently. Other schemes are
/// rejected.
pub struct ResourceAccessor;

impl ResourceAccessor {
    pub fn new() -> Self {
        Self
    }

    pub fn open(&self, uri: &str) -> Result<Vec<u8>, RuleError> {
        let path = self.resolve(uri)?;
        let raw = fs::read(&path)
            .map_err(|e| RuleError::Resource(format!("{}: {}", path.display(), e)))?;

        if raw.starts_with(&GZIP_MAGIC) {
            let mut decoded = Vec::new();
            GzDecoder::new(raw.as_slice())
                .read_to_end(&mut decoded)
                .map_err(|e| RuleError::Resource(format!("{}: {}", path.display(), e)))?;
            return Ok(decoded);
        }
        Ok(raw)
    }

    pub fn read_to_string(&self, uri: &str) -> Result<String, RuleError> {
        let bytes = self.open(uri)?;
        String::from_utf8(bytes)
            .map_err(|_| RuleError::Compile(format!("rule file {} is not valid UTF-8", uri)))
    }

    fn resolve(&self, uri: &str) -> Result<PathBuf, RuleError> {
        if let Some(rest) = uri.strip_prefix("file://") {
            let decoded = percent_decode_str(rest)
                .decode_utf8()
                .map_err(|e| RuleError::Resource(format!("{}: {}", uri, e)))?;
            return Ok(PathBuf::from(decoded.as_ref()));
        }
        if let Some(scheme) = uri.split("://").next().filter(|_| uri.contains("://")) {
            return Err(RuleError::UnsupportedScheme(scheme.to_string()));
        }
        Ok(PathBuf::from(uri))
    }
}

impl Default for ResourceAccessor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    #[test]
    fn test_plain_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"rule r { condition: any of them }").unwrap();
        file.flush().unwrap();
        let body = ResourceAccessor::new()
            .read_to_string(file.path().to_str().unwrap())
            .unwrap();
        assert!(body.starts_with("rule r"));
    }

    #[test]
    fn test_file_uri() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"contents").unwrap();
        file.flush().unwrap();
        let uri = format!("file://{}", file.path().display());
        assert_eq!(ResourceAccessor::new().open(&uri).unwrap(), b"contents");
    }

    #[test]
    fn test_gzip_detected_by_magic() {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(b"compressed rules").unwrap();
        let compressed = encoder.finish().unwrap();

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&compressed).unwrap();
        file.flush().unwrap();

        let body = ResourceAccessor::new()
            .open(file.path().to_str().unwrap())
            .unwrap();
        assert_eq!(body, b"compressed rules");
    }

    #[test]
    fn test_unknown_scheme_rejected() {
        let err = ResourceAccessor::new().open("ftp://host/rules.yar").unwrap_err();
        assert!(matches!(err, RuleError::UnsupportedScheme(s) if s == "ftp"));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            ResourceAccessor::new().open("/nonexistent/rules.yar"),
            Err(RuleError::Resource(_))
        ));
    }
}
