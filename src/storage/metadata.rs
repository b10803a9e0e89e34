//! File record metadata.
//!
//! This module provides the record stored in the ledger for every file
//! that was signed and handed to the content store.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Metadata for an ingested file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileRecord {
    /// The file name the content was ingested under.
    pub name: String,

    /// Content length in bytes.
    pub size: u64,

    /// Content identifier returned by the content store.
    pub cid: String,

    /// Base64 signature over the content digest.
    pub signature: String,
}

impl FileRecord {
    /// Create a new file record.
    pub fn new(name: String, size: u64, cid: String, signature: String) -> Self {
        Self {
            name,
            size,
            cid,
            signature,
        }
    }
}

impl fmt::Display for FileRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Name: {}, Size: {}B, Signature: {}",
            self.name, self.size, self.signature
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_record_creation() {
        let record = FileRecord::new(
            "a.txt".to_string(),
            10,
            "QmTest".to_string(),
            "c2ln".to_string(),
        );

        assert_eq!(record.name, "a.txt");
        assert_eq!(record.size, 10);
        assert_eq!(record.cid, "QmTest");
        assert_eq!(record.signature, "c2ln");
    }

    #[test]
    fn test_file_record_field_names() {
        let record = FileRecord::new("a.txt".to_string(), 3, "cid".to_string(), "sig".to_string());

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"name": "a.txt", "size": 3, "cid": "cid", "signature": "sig"})
        );
    }

    #[test]
    fn test_file_record_display() {
        let record = FileRecord::new("a.txt".to_string(), 3, "cid".to_string(), "sig".to_string());
        assert_eq!(record.to_string(), "Name: a.txt, Size: 3B, Signature: sig");
    }
}
