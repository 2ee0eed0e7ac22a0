use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::info;

use docvec_core::config::PineconeConfig;
use docvec_core::{EmbeddingRecord, Namespace};

use crate::error::VectorError;
use crate::pinecone::{IndexClient, PineconeClient};

/// Destination for embedded chunks.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Write `records` into `namespace`, returning how many were stored.
    async fn upsert(
        &self,
        namespace: &Namespace,
        records: &[EmbeddingRecord],
    ) -> Result<usize, VectorError>;
}

/// Pinecone-backed store. The index host is resolved once, on first upsert.
pub struct PineconeStore {
    client: PineconeClient,
    index_name: String,
    index_host: Option<String>,
    batch_size: usize,
    index: OnceCell<IndexClient>,
}

impl PineconeStore {
    pub fn new(
        client: PineconeClient,
        index_name: impl Into<String>,
        index_host: Option<String>,
        batch_size: usize,
    ) -> Self {
        Self {
            client,
            index_name: index_name.into(),
            index_host: index_host.filter(|h| !h.trim().is_empty()),
            batch_size: batch_size.max(1),
            index: OnceCell::new(),
        }
    }

    pub fn from_config(config: &PineconeConfig) -> Result<Self, VectorError> {
        let client = PineconeClient::from_config(config)?;
        if config.index_host.is_none() && config.environment.is_none() {
            return Err(VectorError::NotConfigured(
                "set PINECONE_INDEX_HOST or PINECONE_ENVIRONMENT".into(),
            ));
        }
        Ok(Self::new(
            client,
            config.index.clone(),
            config.index_host.clone(),
            config.upsert_batch_size,
        ))
    }

    pub fn index_name(&self) -> &str {
        &self.index_name
    }

    async fn index(&self) -> Result<&IndexClient, VectorError> {
        self.index
            .get_or_try_init(|| async {
                let index = match &self.index_host {
                    Some(host) => self.client.index_at(host)?,
                    None => self.client.index(&self.index_name).await?,
                };
                Ok::<_, VectorError>(index.with_batch_size(self.batch_size))
            })
            .await
    }
}

#[async_trait]
impl VectorStore for PineconeStore {
    async fn upsert(
        &self,
        namespace: &Namespace,
        records: &[EmbeddingRecord],
    ) -> Result<usize, VectorError> {
        if records.is_empty() {
            return Ok(0);
        }
        let upserted = self.index().await?.namespace(namespace).upsert(records).await?;

        info!(
            index = %self.index_name,
            namespace = %namespace,
            records = records.len(),
            upserted,
            "Upserted vectors"
        );
        Ok(upserted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> PineconeConfig {
        PineconeConfig {
            api_key: Some("pc-key".into()),
            environment: None,
            index: "viet-chatpdf".into(),
            index_host: Some("viet-chatpdf-abc.svc.gcp-starter.pinecone.io".into()),
            upsert_batch_size: 0,
        }
    }

    #[test]
    fn from_config_requires_api_key() {
        let mut cfg = config();
        cfg.api_key = None;
        assert!(matches!(
            PineconeStore::from_config(&cfg),
            Err(VectorError::NotConfigured(_))
        ));
    }

    #[test]
    fn from_config_requires_host_or_environment() {
        let mut cfg = config();
        cfg.index_host = None;
        assert!(matches!(
            PineconeStore::from_config(&cfg),
            Err(VectorError::NotConfigured(_))
        ));

        cfg.environment = Some("gcp-starter".into());
        assert!(PineconeStore::from_config(&cfg).is_ok());
    }

    #[test]
    fn batch_size_is_at_least_one() {
        let store = PineconeStore::from_config(&config()).unwrap();
        assert_eq!(store.batch_size, 1);
        assert_eq!(store.index_name(), "viet-chatpdf");
    }

    #[tokio::test]
    async fn empty_upsert_makes_no_request() {
        // Unroutable host: any request would fail.
        let client = PineconeClient::new("key", None);
        let store = PineconeStore::new(client, "idx", Some("http://127.0.0.1:1".into()), 10);
        let n = store
            .upsert(&Namespace::for_file_key("a.pdf"), &[])
            .await
            .unwrap();
        assert_eq!(n, 0);
    }
}
