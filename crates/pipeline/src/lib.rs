//! End-to-end ingestion of one stored PDF into a vector-index namespace.
//!
//! Stages run in order: fetch the object into a scratch file, load its
//! pages, chunk every page in parallel, embed every chunk concurrently,
//! then upsert all records into the namespace derived from the file key.

pub mod error;
pub mod pipeline;

pub use error::PipelineError;
pub use pipeline::{IngestOutcome, IngestPipeline};
