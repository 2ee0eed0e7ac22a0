pub mod openai;
pub mod traits;

use tracing::warn;

use docvec_core::{DocumentChunk, EmbeddingRecord};

pub use openai::OpenAiEmbedder;
pub use traits::{Embedder, EmbeddingError};

/// Embed one chunk and package it as an upsert-ready record.
///
/// The record id is the content hash of `chunk.content`, so identical text
/// always maps to the same vector id.
pub async fn embed_chunk(
    embedder: &dyn Embedder,
    chunk: &DocumentChunk,
) -> Result<EmbeddingRecord, EmbeddingError> {
    match embedder.embed(&chunk.content).await {
        Ok(values) => Ok(EmbeddingRecord::from_chunk(chunk, values)),
        Err(e) => {
            warn!(page = chunk.page_number, error = %e, "Failed to embed chunk");
            Err(e)
        }
    }
}
