use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use futures::future::try_join_all;
use tracing::{debug, error, info, instrument, warn};

use docvec_core::config::load_dotenv;
use docvec_core::{Config, DocumentChunk, Namespace};
use docvec_ingest::{embed_chunk, DocumentLoader, Embedder, OpenAiEmbedder, PageChunker, PdfLoader};
use docvec_storage::{DocumentFetcher, ObjectFetcher, StorageBackend};
use docvec_vector::{PineconeStore, VectorStore};

use crate::error::PipelineError;

/// Result of one successful ingestion run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestOutcome {
    pub namespace: Namespace,
    /// Pages returned by the loader.
    pub pages: usize,
    /// Chunks across all pages; one embedding record each.
    pub chunks: usize,
    /// Count reported by the vector store.
    pub vectors_upserted: usize,
    /// Chunks cut from the first loaded page.
    pub first_page_chunks: Vec<DocumentChunk>,
}

/// Fetch → load → chunk → embed → upsert for one stored file.
pub struct IngestPipeline {
    fetcher: Arc<dyn DocumentFetcher>,
    loader: Arc<dyn DocumentLoader>,
    chunker: PageChunker,
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
}

impl IngestPipeline {
    pub fn new(
        fetcher: Arc<dyn DocumentFetcher>,
        loader: Arc<dyn DocumentLoader>,
        chunker: PageChunker,
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn VectorStore>,
    ) -> Self {
        Self {
            fetcher,
            loader,
            chunker,
            embedder,
            store,
        }
    }

    /// Load `.env`, read the environment and wire the production components.
    pub fn from_env() -> Result<Self, PipelineError> {
        load_dotenv();
        let config = Config::from_env();
        config.log_summary();
        Self::from_config(&config)
    }

    /// Production wiring: S3 fetcher, PDF loader, OpenAI embedder, Pinecone store.
    pub fn from_config(config: &Config) -> Result<Self, PipelineError> {
        config.validate()?;

        let backend =
            StorageBackend::from_config(&config.aws).map_err(PipelineError::StorageSetup)?;
        let fetcher = ObjectFetcher::new(backend, config.storage.scratch_dir.clone());
        let chunker = PageChunker::from_config(&config.chunking)?;
        let embedder =
            OpenAiEmbedder::from_config(&config.embedding).map_err(PipelineError::EmbedderSetup)?;
        let store =
            PineconeStore::from_config(&config.pinecone).map_err(PipelineError::StoreSetup)?;

        Ok(Self::new(
            Arc::new(fetcher),
            Arc::new(PdfLoader),
            chunker,
            Arc::new(embedder),
            Arc::new(store),
        ))
    }

    /// Ingest `file_key`, returning the first page's chunks, or `None` if any
    /// stage failed. The failure is logged.
    pub async fn load_into_index(&self, file_key: &str) -> Option<Vec<DocumentChunk>> {
        match self.run(file_key).await {
            Ok(outcome) => Some(outcome.first_page_chunks),
            Err(e) => {
                error!(file_key, error = %e, "Ingestion failed");
                None
            }
        }
    }

    #[instrument(skip_all, fields(file_key = %file_key))]
    pub async fn run(&self, file_key: &str) -> Result<IngestOutcome, PipelineError> {
        let started = Instant::now();
        let namespace = Namespace::for_file_key(file_key);

        let stage = Instant::now();
        let path = self.fetcher.fetch(file_key).await?;
        debug!(elapsed_ms = stage.elapsed().as_millis() as u64, "fetch done");

        let stage = Instant::now();
        let loaded = self.loader.load(&path).await;
        remove_scratch(&path).await;
        let pages = loaded?;
        let page_count = pages.len();
        debug!(
            pages = page_count,
            elapsed_ms = stage.elapsed().as_millis() as u64,
            "load done"
        );

        let stage = Instant::now();
        let chunker = self.chunker.clone();
        let per_page = tokio::task::spawn_blocking(move || chunker.chunk_pages(&pages)).await?;
        let first_page_chunks = per_page.first().cloned().unwrap_or_default();
        let chunks: Vec<DocumentChunk> = per_page.into_iter().flatten().collect();
        debug!(
            chunks = chunks.len(),
            elapsed_ms = stage.elapsed().as_millis() as u64,
            "chunk done"
        );

        if chunks.is_empty() {
            warn!(pages = page_count, "Document produced no chunks, nothing to index");
            return Ok(IngestOutcome {
                namespace,
                pages: page_count,
                chunks: 0,
                vectors_upserted: 0,
                first_page_chunks,
            });
        }

        let stage = Instant::now();
        let embedder = self.embedder.as_ref();
        let records = try_join_all(chunks.iter().map(|chunk| embed_chunk(embedder, chunk))).await?;
        debug!(
            records = records.len(),
            elapsed_ms = stage.elapsed().as_millis() as u64,
            "embed done"
        );

        let stage = Instant::now();
        let vectors_upserted = self.store.upsert(&namespace, &records).await?;
        debug!(elapsed_ms = stage.elapsed().as_millis() as u64, "upsert done");

        info!(
            namespace = %namespace,
            pages = page_count,
            chunks = chunks.len(),
            vectors_upserted,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Ingestion complete"
        );

        Ok(IngestOutcome {
            namespace,
            pages: page_count,
            chunks: chunks.len(),
            vectors_upserted,
            first_page_chunks,
        })
    }
}

async fn remove_scratch(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        warn!(path = %path.display(), error = %e, "Failed to remove scratch file");
    }
}
