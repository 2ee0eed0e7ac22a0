//! Document loading, page chunking and embedding.

pub mod document;
pub mod embedding;

pub use document::chunker::{ChunkError, PageChunker, RecursiveSplitter};
pub use document::{DocumentLoader, ExtractionError, PageContent, PdfLoader};
pub use embedding::{embed_chunk, Embedder, EmbeddingError, OpenAiEmbedder};
