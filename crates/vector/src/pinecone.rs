//! Minimal Pinecone REST client: project lookup, host resolution, upsert.

use std::ops::Range;
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;

use docvec_core::config::PineconeConfig;
use docvec_core::{EmbeddingRecord, Namespace};

use crate::error::VectorError;

const API_KEY_HEADER: &str = "Api-Key";
pub const DEFAULT_BATCH_SIZE: usize = 100;
/// Pinecone rejects upsert bodies larger than 2 MB.
pub const MAX_REQUEST_BYTES: usize = 2 * 1024 * 1024;
/// Room for the request envelope around the vectors array.
const ENVELOPE_BYTES: usize = 256;

/// Control-plane client for a Pinecone project.
#[derive(Clone)]
pub struct PineconeClient {
    http: Client,
    api_key: String,
    environment: Option<String>,
    controller_url: Option<String>,
}

#[derive(Deserialize)]
struct WhoAmI {
    project_name: String,
}

impl PineconeClient {
    pub fn new(api_key: impl Into<String>, environment: Option<String>) -> Self {
        Self {
            http: Client::builder()
                .timeout(Duration::from_secs(60))
                .build()
                .unwrap_or_else(|_| Client::new()),
            api_key: api_key.into(),
            environment,
            controller_url: None,
        }
    }

    pub fn from_config(config: &PineconeConfig) -> Result<Self, VectorError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| VectorError::NotConfigured("PINECONE_API_KEY is not set".into()))?;
        Ok(Self::new(api_key, config.environment.clone()))
    }

    /// Use a fixed controller instead of `https://controller.<env>.pinecone.io`.
    pub fn with_controller_url(mut self, url: impl Into<String>) -> Self {
        self.controller_url = Some(url.into().trim_end_matches('/').to_string());
        self
    }

    fn environment(&self) -> Result<&str, VectorError> {
        self.environment
            .as_deref()
            .filter(|e| !e.is_empty())
            .ok_or_else(|| {
                VectorError::NotConfigured(
                    "PINECONE_ENVIRONMENT is required when no index host is set".into(),
                )
            })
    }

    fn controller_url(&self) -> Result<String, VectorError> {
        match &self.controller_url {
            Some(url) => Ok(url.clone()),
            None => Ok(format!("https://controller.{}.pinecone.io", self.environment()?)),
        }
    }

    /// Project name that owns the API key.
    pub async fn whoami(&self) -> Result<String, VectorError> {
        let url = format!("{}/actions/whoami", self.controller_url()?);
        debug!("Pinecone whoami: {}", url);

        let response = self
            .http
            .get(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(VectorError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let who: WhoAmI = response
            .json()
            .await
            .map_err(|e| VectorError::Parse(e.to_string()))?;
        Ok(who.project_name)
    }

    /// Data-plane host of `index`: `https://<index>-<project>.svc.<env>.pinecone.io`.
    pub async fn resolve_host(&self, index: &str) -> Result<Url, VectorError> {
        let environment = self.environment()?.to_string();
        let project = self.whoami().await?;
        let host = format!("https://{index}-{project}.svc.{environment}.pinecone.io");
        info!(index, host = %host, "Resolved Pinecone index host");
        parse_host(&host)
    }

    /// Handle on an index whose host is already known.
    pub fn index_at(&self, host: &str) -> Result<IndexClient, VectorError> {
        Ok(IndexClient {
            http: self.http.clone(),
            api_key: self.api_key.clone(),
            host: parse_host(host)?,
            batch_size: DEFAULT_BATCH_SIZE,
            max_request_bytes: MAX_REQUEST_BYTES,
        })
    }

    /// Handle on `index`, resolving its host through the controller.
    pub async fn index(&self, index: &str) -> Result<IndexClient, VectorError> {
        let host = self.resolve_host(index).await?;
        Ok(IndexClient {
            http: self.http.clone(),
            api_key: self.api_key.clone(),
            host,
            batch_size: DEFAULT_BATCH_SIZE,
            max_request_bytes: MAX_REQUEST_BYTES,
        })
    }
}

/// Accepts `https://host`, `http://host:port` or a bare `host`.
pub(crate) fn parse_host(host: &str) -> Result<Url, VectorError> {
    let host = host.trim();
    let candidate = if host.contains("://") {
        host.to_string()
    } else {
        format!("https://{host}")
    };
    let url = Url::parse(&candidate).map_err(|e| VectorError::InvalidHost(format!("{host}: {e}")))?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(VectorError::InvalidHost(host.to_string()));
    }
    Ok(url)
}

/// Data-plane client for one index.
#[derive(Clone)]
pub struct IndexClient {
    http: Client,
    api_key: String,
    host: Url,
    batch_size: usize,
    max_request_bytes: usize,
}

#[derive(Serialize)]
struct UpsertRequest<'a> {
    vectors: &'a [EmbeddingRecord],
    namespace: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpsertResponse {
    #[serde(default)]
    upserted_count: usize,
}

impl IndexClient {
    pub fn host(&self) -> &Url {
        &self.host
    }

    /// Maximum vectors per upsert request (at least 1).
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Maximum serialized size of one upsert request body.
    pub fn with_max_request_bytes(mut self, max_request_bytes: usize) -> Self {
        self.max_request_bytes = max_request_bytes;
        self
    }

    pub fn namespace<'a>(&'a self, namespace: &'a Namespace) -> NamespaceClient<'a> {
        NamespaceClient {
            index: self,
            namespace,
        }
    }

    /// One `POST /vectors/upsert` call. Returns Pinecone's upserted count.
    async fn upsert_request(
        &self,
        namespace: &Namespace,
        records: &[EmbeddingRecord],
    ) -> Result<usize, VectorError> {
        let url = format!("{}/vectors/upsert", self.host.as_str().trim_end_matches('/'));
        let request = UpsertRequest {
            vectors: records,
            namespace: namespace.as_str(),
        };

        let response = self
            .http
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(VectorError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let resp: UpsertResponse = response
            .json()
            .await
            .map_err(|e| VectorError::Parse(e.to_string()))?;
        debug!(
            namespace = %namespace,
            sent = records.len(),
            upserted = resp.upserted_count,
            "Upserted batch"
        );
        Ok(resp.upserted_count)
    }
}

/// One namespace of an index.
pub struct NamespaceClient<'a> {
    index: &'a IndexClient,
    namespace: &'a Namespace,
}

impl NamespaceClient<'_> {
    /// Upsert `records` in sequential batches bounded by both the batch size
    /// and the request size limit. The first failing batch stops the rest;
    /// batches already sent stay written.
    pub async fn upsert(&self, records: &[EmbeddingRecord]) -> Result<usize, VectorError> {
        let sizes = records
            .iter()
            .map(|r| serde_json::to_vec(r).map(|encoded| encoded.len()))
            .collect::<Result<Vec<_>, _>>()?;
        let budget = self
            .index
            .max_request_bytes
            .saturating_sub(ENVELOPE_BYTES + self.namespace.as_str().len());
        let batches = plan_batches(&sizes, self.index.batch_size, budget);
        if batches.len() > 1 {
            debug!(
                namespace = %self.namespace,
                records = records.len(),
                batches = batches.len(),
                "Splitting upsert"
            );
        }

        let mut upserted = 0;
        for range in batches {
            upserted += self
                .index
                .upsert_request(self.namespace, &records[range])
                .await?;
        }
        Ok(upserted)
    }
}

/// Consecutive ranges of at most `max_count` items whose summed encoded size
/// (plus one separator byte each) stays within `max_bytes`. An item that is
/// too large on its own still gets a batch of its own.
fn plan_batches(sizes: &[usize], max_count: usize, max_bytes: usize) -> Vec<Range<usize>> {
    let max_count = max_count.max(1);
    let mut batches = Vec::new();
    let mut start = 0;
    let mut bytes = 0;
    for (i, size) in sizes.iter().enumerate() {
        let item = size + 1;
        let count = i - start;
        if count > 0 && (count >= max_count || bytes + item > max_bytes) {
            batches.push(start..i);
            start = i;
            bytes = 0;
        }
        bytes += item;
    }
    if start < sizes.len() {
        batches.push(start..sizes.len());
    }
    batches
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_host_gets_https() {
        let url = parse_host("docs-abc123.svc.gcp-starter.pinecone.io").unwrap();
        assert_eq!(url.scheme(), "https");
        assert_eq!(url.host_str(), Some("docs-abc123.svc.gcp-starter.pinecone.io"));
    }

    #[test]
    fn explicit_scheme_and_port_kept() {
        let url = parse_host("http://127.0.0.1:5081").unwrap();
        assert_eq!(url.scheme(), "http");
        assert_eq!(url.port(), Some(5081));
    }

    #[test]
    fn unusable_hosts_rejected() {
        assert!(matches!(parse_host(""), Err(VectorError::InvalidHost(_))));
        assert!(matches!(
            parse_host("ftp://files.example.com"),
            Err(VectorError::InvalidHost(_))
        ));
    }

    #[test]
    fn controller_needs_environment() {
        let client = PineconeClient::new("key", None);
        assert!(matches!(
            client.controller_url(),
            Err(VectorError::NotConfigured(_))
        ));

        let client = PineconeClient::new("key", Some("us-west1-gcp".into()));
        assert_eq!(
            client.controller_url().unwrap(),
            "https://controller.us-west1-gcp.pinecone.io"
        );
    }

    #[test]
    fn batches_split_on_count() {
        assert_eq!(plan_batches(&[10; 5], 2, 1_000), vec![0..2, 2..4, 4..5]);
        assert!(plan_batches(&[], 2, 1_000).is_empty());
    }

    #[test]
    fn batches_split_on_encoded_size() {
        // 100 + 1 separator per item; three fit in 303 bytes, four do not.
        assert_eq!(plan_batches(&[100; 7], 100, 303), vec![0..3, 3..6, 6..7]);
    }

    #[test]
    fn oversized_item_sent_alone() {
        assert_eq!(
            plan_batches(&[10, 5_000, 10, 10], 100, 100),
            vec![0..1, 1..2, 2..4]
        );
    }

    #[test]
    fn large_previews_stay_under_request_limit() {
        // 100 records carrying 36000-byte previews would be ~3.6 MB in one body.
        let sizes = vec![36_200; 100];
        let budget = MAX_REQUEST_BYTES - ENVELOPE_BYTES;
        let batches = plan_batches(&sizes, DEFAULT_BATCH_SIZE, budget);
        assert!(batches.len() > 1);
        assert_eq!(batches.iter().map(|r| r.len()).sum::<usize>(), 100);
        for range in batches {
            let body: usize = sizes[range].iter().map(|s| s + 1).sum();
            assert!(body + ENVELOPE_BYTES <= MAX_REQUEST_BYTES);
        }
    }

    #[test]
    fn controller_override_wins() {
        let client = PineconeClient::new("key", None).with_controller_url("http://127.0.0.1:9/");
        assert_eq!(client.controller_url().unwrap(), "http://127.0.0.1:9");
    }
}
