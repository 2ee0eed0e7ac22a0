use serde::{Deserialize, Serialize};

use crate::text::{content_hash, to_ascii};

/// A page-bounded text segment ready for embedding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentChunk {
    /// Text submitted to the embedding model.
    pub content: String,
    /// 1-based page the chunk was cut from.
    pub page_number: usize,
    /// Byte-truncated preview of the source page, stored with the vector.
    pub text: String,
}

/// Metadata stored next to each vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordMetadata {
    pub text: String,
    pub page_number: usize,
}

/// One vector ready for upsert. `id` is the content hash of the chunk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingRecord {
    pub id: String,
    pub values: Vec<f32>,
    pub metadata: RecordMetadata,
}

impl EmbeddingRecord {
    pub fn from_chunk(chunk: &DocumentChunk, values: Vec<f32>) -> Self {
        Self {
            id: content_hash(&chunk.content),
            values,
            metadata: RecordMetadata {
                text: chunk.text.clone(),
                page_number: chunk.page_number,
            },
        }
    }
}

/// Vector-index partition holding the vectors of one source file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Namespace(String);

impl Namespace {
    /// Derive the namespace for a storage key.
    ///
    /// Non-ASCII characters are removed. Keys with nothing left after that
    /// map to `file-<sha256>` instead of the index's default namespace.
    pub fn for_file_key(file_key: &str) -> Self {
        let ascii = to_ascii(file_key);
        if ascii.is_empty() {
            Namespace(format!("file-{}", content_hash(file_key)))
        } else {
            Namespace(ascii)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Namespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
