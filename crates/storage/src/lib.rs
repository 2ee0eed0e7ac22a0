//! Object-storage access: download a stored document into a local scratch file.

pub mod backend;
pub mod error;
pub mod fetch;

pub use backend::{LocalBackend, S3Backend, StorageBackend};
pub use error::StorageError;
pub use fetch::{DocumentFetcher, ObjectFetcher};
