use thiserror::Error;

use docvec_core::CoreError;
use docvec_ingest::{ChunkError, EmbeddingError, ExtractionError};
use docvec_storage::StorageError;
use docvec_vector::VectorError;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] StorageError),

    #[error("load failed: {0}")]
    Load(#[from] ExtractionError),

    #[error("chunking task failed: {0}")]
    Chunk(#[from] tokio::task::JoinError),

    #[error("embedding failed: {0}")]
    Embed(#[from] EmbeddingError),

    #[error("upsert failed: {0}")]
    Upsert(#[from] VectorError),

    #[error("configuration error: {0}")]
    Config(#[from] CoreError),

    #[error("storage setup failed: {0}")]
    StorageSetup(#[source] StorageError),

    #[error("chunker setup failed: {0}")]
    ChunkerSetup(#[from] ChunkError),

    #[error("embedder setup failed: {0}")]
    EmbedderSetup(#[source] EmbeddingError),

    #[error("vector store setup failed: {0}")]
    StoreSetup(#[source] VectorError),
}
