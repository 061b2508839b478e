//! Checksum utilities for schema fingerprints

use apache_avro::Schema;
use sha2::{Digest, Sha256};
use serde::{Deserialize, Serialize};
use std::fmt;

/// SHA256 checksum of a schema definition
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Checksum(String);

impl Checksum {
    /// Compute checksum from raw bytes
    pub fn from_bytes(data: &[u8]) -> Self {
        let hash = Sha256::digest(data);
        Self(format!("{:x}", hash))
    }

    /// Compute checksum from a JSON value
    pub fn from_json(value: &serde_json::Value) -> Self {
        let serialized = value.to_string();
        Self::from_bytes(serialized.as_bytes())
    }

    /// Compute checksum of a parsed schema's full JSON form
    ///
    /// Unlike the Parsing Canonical Form this keeps defaults, docs and
    /// aliases, so schemas differing only in those get distinct checksums.
    pub fn from_schema(schema: &Schema) -> serde_json::Result<Self> {
        let definition = serde_json::to_value(schema)?;
        Ok(Self::from_json(&definition))
    }

    /// Get the hex string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for Checksum {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum_consistency() {
        let schema = Schema::parse_str(r#"{"type": "fixed", "name": "md5", "size": 16}"#).unwrap();
        let checksum1 = Checksum::from_schema(&schema).unwrap();
        let checksum2 = Checksum::from_schema(&schema.clone()).unwrap();
        assert_eq!(checksum1, checksum2);
        assert_eq!(checksum1.as_str().len(), 64);
    }

    #[test]
    fn test_checksum_different_content() {
        let first = Schema::parse_str(r#""string""#).unwrap();
        let second = Schema::parse_str(r#""long""#).unwrap();
        assert_ne!(
            Checksum::from_schema(&first).unwrap(),
            Checksum::from_schema(&second).unwrap()
        );
    }

    #[test]
    fn test_checksum_keeps_defaults() {
        let without_default = Schema::parse_str(
            r#"{"type": "record", "name": "r", "fields": [{"name": "a", "type": "long"}]}"#,
        )
        .unwrap();
        let with_default = Schema::parse_str(
            r#"{"type": "record", "name": "r", "fields": [{"name": "a", "type": "long", "default": 1}]}"#,
        )
        .unwrap();
        assert_ne!(
            Checksum::from_schema(&without_default).unwrap(),
            Checksum::from_schema(&with_default).unwrap()
        );
    }
}
