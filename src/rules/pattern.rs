// Tue Aug 4 2026 - Alex

use std::fmt;

/// A byte pattern with a wildcard mask, matched positionally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    bytes: Vec<u8>,
    mask: Vec<bool>,
}

impl Pattern {
    pub fn new(bytes: Vec<u8>, mask: Vec<bool>) -> Self {
        assert_eq!(bytes.len(), mask.len(), "Pattern bytes and mask must have same length");
        Self { bytes, mask }
    }

    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mask = vec![true; bytes.len()];
        Self {
            bytes: bytes.to_vec(),
            mask,
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn mask(&self) -> &[bool] {
        &self.mask
    }

    pub fn matches(&self, data: &[u8]) -> bool {
        if data.len() < self.bytes.len() {
            return false;
        }

        self.bytes
            .iter()
            .zip(self.mask.iter())
            .zip(data.iter())
            .all(|((pattern_byte, &significant), &data_byte)| {
                !significant || *pattern_byte == data_byte
            })
    }

    pub fn find_all_in(&self, data: &[u8]) -> Vec<usize> {
        let mut results = Vec::new();

        if self.bytes.is_empty() || data.len() < self.bytes.len() {
            return results;
        }

        let first_significant = self.mask.iter().position(|&m| m).unwrap_or(0);
        let first_byte = self.bytes[first_significant];
        let first_fixed = self.mask[first_significant];

        for i in 0..=(data.len() - self.bytes.len()) {
            if (!first_fixed || data[i + first_significant] == first_byte) && self.matches(&data[i..]) {
                results.push(i);
            }
        }

        results
    }

    pub fn to_hex_string(&self) -> String {
        self.bytes
            .iter()
            .zip(self.mask.iter())
            .map(|(b, &m)| {
                if m {
                    format!("{:02X}", b)
                } else {
                    "??".to_string()
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_all_with_wildcard() {
        let pattern = Pattern::new(vec![0x41, 0x00, 0x43], vec![true, false, true]);
        let data = b"xAyCzABCqA Cx";
        assert_eq!(pattern.find_all_in(data), vec![1, 5, 9]);
    }

    #[test]
    fn test_all_wildcards_match_everywhere() {
        let pattern = Pattern::new(vec![0, 0], vec![false, false]);
        assert_eq!(pattern.find_all_in(b"abc"), vec![0, 1]);
    }

    #[test]
    fn test_shorter_data_never_matches() {
        let pattern = Pattern::from_bytes(b"ABCD");
        assert!(pattern.find_all_in(b"ABC").is_empty());
        assert!(!pattern.matches(b"ABC"));
    }
}
