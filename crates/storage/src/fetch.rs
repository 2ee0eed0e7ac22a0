use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::backend::StorageBackend;
use crate::error::StorageError;

/// Materializes a stored document as a local file.
#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    /// Download the object stored under `key` and return the local path.
    async fn fetch(&self, key: &str) -> Result<PathBuf, StorageError>;
}

/// Fetcher that reads from an object store into a scratch directory.
pub struct ObjectFetcher {
    backend: StorageBackend,
    scratch_dir: PathBuf,
}

impl ObjectFetcher {
    pub fn new(backend: StorageBackend, scratch_dir: impl Into<PathBuf>) -> Self {
        Self {
            backend,
            scratch_dir: scratch_dir.into(),
        }
    }

    /// Full object location: backend prefix + key.
    fn location(&self, key: &str) -> object_store::path::Path {
        let key = key.trim_start_matches('/');
        let prefix = self.backend.prefix();
        if prefix.is_empty() {
            object_store::path::Path::from(key)
        } else {
            object_store::path::Path::from(format!("{}/{}", prefix, key))
        }
    }
}

/// `pdf-<unix millis>-<8 hex>.pdf`; the uuid suffix keeps same-millisecond runs apart.
fn scratch_file_name() -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("pdf-{}-{}.pdf", millis, &suffix[..8])
}

/// Write `data` to `path`, removing whatever was written if the write fails.
async fn write_scratch(path: &Path, data: &[u8]) -> Result<(), StorageError> {
    if let Err(e) = tokio::fs::write(path, data).await {
        match tokio::fs::remove_file(path).await {
            Ok(()) => {}
            Err(cleanup) if cleanup.kind() == std::io::ErrorKind::NotFound => {}
            Err(cleanup) => {
                warn!(
                    path = %path.display(),
                    error = %cleanup,
                    "Failed to remove partial scratch file"
                );
            }
        }
        return Err(e.into());
    }
    Ok(())
}

#[async_trait]
impl DocumentFetcher for ObjectFetcher {
    async fn fetch(&self, key: &str) -> Result<PathBuf, StorageError> {
        let location = self.location(key);
        debug!(key, location = %location, "Fetching object");

        let result = self
            .backend
            .store()
            .get(&location)
            .await
            .map_err(|e| match e {
                object_store::Error::NotFound { .. } => StorageError::NotFound(key.to_string()),
                other => StorageError::ObjectStore(other),
            })?;
        let data = result.bytes().await?;

        tokio::fs::create_dir_all(&self.scratch_dir).await?;
        let path = self.scratch_dir.join(scratch_file_name());
        write_scratch(&path, &data).await?;

        info!(
            key,
            path = %path.display(),
            bytes = data.len(),
            "Downloaded object into scratch directory"
        );
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use object_store::memory::InMemory;
    use object_store::{ObjectStore, PutPayload};

    async fn memory_fetcher(scratch: &Path, objects: &[(&str, &[u8])]) -> ObjectFetcher {
        let store = Arc::new(InMemory::new());
        for (key, data) in objects {
            store
                .put(
                    &object_store::path::Path::from(*key),
                    PutPayload::from(data.to_vec()),
                )
                .await
                .unwrap();
        }
        ObjectFetcher::new(StorageBackend::from_store(store), scratch)
    }

    #[test]
    fn scratch_names_are_unique_pdfs() {
        let a = scratch_file_name();
        let b = scratch_file_name();
        assert_ne!(a, b);
        assert!(a.starts_with("pdf-"));
        assert!(a.ends_with(".pdf"));
    }

    #[tokio::test]
    async fn fetch_writes_object_bytes() {
        let tmp = tempfile::tempdir().unwrap();
        let fetcher = memory_fetcher(tmp.path(), &[("uploads/a.pdf", b"%PDF-1.4 body")]).await;

        let path = fetcher.fetch("uploads/a.pdf").await.unwrap();
        assert!(path.starts_with(tmp.path()));
        assert_eq!(std::fs::read(&path).unwrap(), b"%PDF-1.4 body");
    }

    #[tokio::test]
    async fn fetch_creates_missing_scratch_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let scratch = tmp.path().join("nested").join("scratch");
        let fetcher = memory_fetcher(&scratch, &[("a.pdf", b"data")]).await;

        let path = fetcher.fetch("/a.pdf").await.unwrap();
        assert!(scratch.is_dir());
        assert_eq!(path.parent(), Some(scratch.as_path()));
    }

    #[tokio::test]
    async fn repeated_fetches_use_distinct_files() {
        let tmp = tempfile::tempdir().unwrap();
        let fetcher = memory_fetcher(tmp.path(), &[("a.pdf", b"data")]).await;

        let first = fetcher.fetch("a.pdf").await.unwrap();
        let second = fetcher.fetch("a.pdf").await.unwrap();
        assert_ne!(first, second);
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn failed_write_leaves_no_scratch_file() {
        let tmp = tempfile::tempdir().unwrap();
        // Every write to /dev/full fails with ENOSPC after the file is opened.
        let path = tmp.path().join(scratch_file_name());
        std::os::unix::fs::symlink("/dev/full", &path).unwrap();

        let err = write_scratch(&path, b"%PDF-1.4 body").await.unwrap_err();
        assert!(matches!(err, StorageError::Io(_)));
        assert!(std::fs::symlink_metadata(&path).is_err());
        assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn missing_object_is_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let fetcher = memory_fetcher(tmp.path(), &[]).await;

        let err = fetcher.fetch("nope.pdf").await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound(ref k) if k == "nope.pdf"));
        // Nothing written on failure.
        assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 0);
    }
}
