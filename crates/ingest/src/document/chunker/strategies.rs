//! Page chunking: newline stripping, splitting, preview attachment.

use rayon::prelude::*;

use docvec_core::config::ChunkingConfig;
use docvec_core::text::{strip_newlines, truncate_str_by_bytes};
use docvec_core::DocumentChunk;

use super::helpers::RecursiveSplitter;
use super::types::ChunkError;
use crate::document::PageContent;

/// Turns pages into chunks ready for embedding.
#[derive(Debug, Clone)]
pub struct PageChunker {
    splitter: RecursiveSplitter,
    preview_bytes: usize,
}

impl PageChunker {
    pub fn new(splitter: RecursiveSplitter, preview_bytes: usize) -> Self {
        Self {
            splitter,
            preview_bytes,
        }
    }

    pub fn from_config(config: &ChunkingConfig) -> Result<Self, ChunkError> {
        let splitter = RecursiveSplitter::new(config.chunk_size, config.chunk_overlap)?;
        Ok(Self::new(splitter, config.preview_bytes))
    }

    /// Chunk one page. Every chunk shares the page's truncated preview.
    pub fn chunk_page(&self, page: &PageContent) -> Vec<DocumentChunk> {
        let content = strip_newlines(&page.text);
        let preview = truncate_str_by_bytes(&content, self.preview_bytes);

        self.splitter
            .split_text(&content)
            .into_iter()
            .map(|chunk| DocumentChunk {
                content: chunk,
                page_number: page.page_number,
                text: preview.to_string(),
            })
            .collect()
    }

    /// Chunk all pages in parallel. The outer vector keeps page order.
    pub fn chunk_pages(&self, pages: &[PageContent]) -> Vec<Vec<DocumentChunk>> {
        pages.par_iter().map(|page| self.chunk_page(page)).collect()
    }
}
