//! Chunking errors and defaults.

use thiserror::Error;

/// Separators tried in order: paragraphs, lines, words, characters.
pub const DEFAULT_SEPARATORS: &[&str] = &["\n\n", "\n", " ", ""];

#[derive(Debug, Error)]
pub enum ChunkError {
    #[error("invalid chunking config: {0}")]
    InvalidConfig(String),
}
