//! Document and collection domain models.
//!
//! A processed MSDS is represented as an ordered list of [`DocumentChunk`]s that
//! are stored as records of a per-user collection in the vector store.

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

use crate::ModelError;

/// A contiguous span of extracted document text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentChunk {
    /// Zero-based position of the chunk within its document.
    pub index: usize,
    pub text: String,
}

impl DocumentChunk {
    pub fn new(index: usize, text: impl Into<String>) -> Self {
        Self {
            index,
            text: text.into(),
        }
    }

    /// Record identifier used in the vector store (`index + 1`).
    ///
    /// Identifiers are only unique within one collection.
    pub fn record_id(&self) -> String {
        (self.index + 1).to_string()
    }

    /// Length in Unicode scalar values.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Validated collection name.
///
/// Collections are keyed by the session UUID of their owner; the name doubles as
/// a file name on disk so only `[A-Za-z0-9_-]` is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CollectionName(String);

const MAX_COLLECTION_NAME_LEN: usize = 64;

fn collection_name_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("valid collection name regex"))
}

impl CollectionName {
    pub fn parse(name: impl AsRef<str>) -> Result<Self, ModelError> {
        let name = name.as_ref();
        if name.is_empty()
            || name.len() > MAX_COLLECTION_NAME_LEN
            || !collection_name_regex().is_match(name)
        {
            return Err(ModelError::InvalidCollectionName(name.to_string()));
        }
        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CollectionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for CollectionName {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<CollectionName> for String {
    fn from(name: CollectionName) -> Self {
        name.0
    }
}

impl From<uuid::Uuid> for CollectionName {
    fn from(id: uuid::Uuid) -> Self {
        // Hyphenated UUIDs always satisfy the name rules.
        Self(id.to_string())
    }
}

/// Summary of a stored collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionInfo {
    pub name: CollectionName,
    pub record_count: usize,
    pub created_at: DateTime<Utc>,
    pub last_accessed: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_id_is_one_based() {
        assert_eq!(DocumentChunk::new(0, "a").record_id(), "1");
        assert_eq!(DocumentChunk::new(41, "a").record_id(), "42");
    }

    #[test]
    fn test_char_len_counts_scalars() {
        let chunk = DocumentChunk::new(0, "keselamatan ✓");
        assert_eq!(chunk.char_len(), 13);
    }

    #[test]
    fn test_collection_name_accepts_uuid() {
        let id = uuid::Uuid::new_v4();
        let name = CollectionName::parse(id.to_string()).unwrap();
        assert_eq!(name, CollectionName::from(id));
    }

    #[test]
    fn test_collection_name_rejects_path_like_names() {
        assert!(CollectionName::parse("../etc").is_err());
        assert!(CollectionName::parse("a/b").is_err());
        assert!(CollectionName::parse("").is_err());
        assert!(CollectionName::parse("x".repeat(65)).is_err());
    }

    #[test]
    fn test_collection_name_deserialization_validates() {
        let ok: Result<CollectionName, _> = serde_json::from_str("\"user-1\"");
        assert!(ok.is_ok());
        let bad: Result<CollectionName, _> = serde_json::from_str("\"a b\"");
        assert!(bad.is_err());
    }
}
