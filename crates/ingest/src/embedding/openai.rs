use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use docvec_core::config::EmbeddingConfig;

use super::traits::{Embedder, EmbeddingError};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_MODEL: &str = "text-embedding-ada-002";

/// OpenAI-compatible embedding backend.
pub struct OpenAiEmbedder {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    dimensions: usize,
}

impl OpenAiEmbedder {
    pub fn new(
        api_key: String,
        model: String,
        base_url: Option<String>,
        dimensions: usize,
        timeout: Duration,
    ) -> Self {
        let base_url = base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_else(|_| Client::new()),
            api_key,
            model,
            base_url: base_url.trim_end_matches('/').to_string(),
            dimensions,
        }
    }

    pub fn from_config(config: &EmbeddingConfig) -> Result<Self, EmbeddingError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| EmbeddingError::NotConfigured("OPENAI_API_KEY is not set".into()))?;
        Ok(Self::new(
            api_key,
            config.model.clone(),
            Some(config.base_url.clone()),
            config.dimensions,
            Duration::from_secs(config.timeout_secs),
        ))
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: String,
}

#[derive(Deserialize)]
struct EmbedResponse {
    #[serde(default)]
    data: Vec<EmbedItem>,
}

#[derive(Deserialize)]
struct EmbedItem {
    embedding: Vec<f32>,
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let request = EmbedRequest {
            model: &self.model,
            input: text.replace('\n', " "),
        };

        let response = self
            .client
            .post(format!("{}/v1/embeddings", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::Api(format!("{status}: {body}")));
        }

        let resp: EmbedResponse = response.json().await?;
        let embedding = resp
            .data
            .into_iter()
            .next()
            .map(|item| item.embedding)
            .ok_or(EmbeddingError::MissingEmbedding)?;

        if embedding.len() != self.dimensions {
            return Err(EmbeddingError::DimensionMismatch {
                expected: self.dimensions,
                actual: embedding.len(),
            });
        }

        debug!(model = %self.model, chars = text.len(), "Embedded text");
        Ok(embedding)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(api_key: Option<&str>) -> EmbeddingConfig {
        EmbeddingConfig {
            api_key: api_key.map(String::from),
            base_url: "http://localhost:9999/".into(),
            model: DEFAULT_MODEL.into(),
            dimensions: 1536,
            timeout_secs: 5,
        }
    }

    #[test]
    fn from_config_requires_api_key() {
        assert!(matches!(
            OpenAiEmbedder::from_config(&config(None)),
            Err(EmbeddingError::NotConfigured(_))
        ));
        assert!(matches!(
            OpenAiEmbedder::from_config(&config(Some(""))),
            Err(EmbeddingError::NotConfigured(_))
        ));
    }

    #[test]
    fn from_config_trims_trailing_slash() {
        let embedder = OpenAiEmbedder::from_config(&config(Some("sk-test"))).unwrap();
        assert_eq!(embedder.base_url, "http://localhost:9999");
        assert_eq!(embedder.model(), DEFAULT_MODEL);
        assert_eq!(embedder.dimensions(), 1536);
    }
}
