pub mod chunker;
mod pdf;

use std::path::Path;

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Unsupported file type: {0}")]
    UnsupportedType(String),
    #[error("PDF extraction failed: {0}")]
    PdfError(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A page of extracted text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageContent {
    /// 1-based physical page number.
    pub page_number: usize,
    /// The extracted text content.
    pub text: String,
}

/// Parses a local file into its ordered pages.
#[async_trait]
pub trait DocumentLoader: Send + Sync {
    async fn load(&self, path: &Path) -> Result<Vec<PageContent>, ExtractionError>;
}

/// Loader for PDF files backed by `pdf-extract`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfLoader;

#[async_trait]
impl DocumentLoader for PdfLoader {
    async fn load(&self, path: &Path) -> Result<Vec<PageContent>, ExtractionError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();
        if ext != "pdf" {
            return Err(ExtractionError::UnsupportedType(ext));
        }

        let bytes = tokio::fs::read(path).await?;
        // pdf-extract is CPU-bound and may panic on malformed input.
        let pages = tokio::task::spawn_blocking(move || pdf::extract_pdf(&bytes))
            .await
            .map_err(|e| ExtractionError::PdfError(format!("extraction task failed: {e}")))??;

        info!(
            path = %path.display(),
            pages = pages.len(),
            chars = pages.iter().map(|p| p.text.len()).sum::<usize>(),
            "Loaded PDF"
        );
        Ok(pages)
    }
}
