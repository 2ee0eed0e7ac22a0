use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_or(profile: &str, key: &str, default: &str) -> String {
    profiled_env_opt(profile, key).unwrap_or_else(|| default.to_string())
}

fn profiled_env_usize(profile: &str, key: &str, default: usize) -> usize {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn profiled_env_u64(profile: &str, key: &str, default: u64) -> u64 {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub aws: AwsConfig,
    pub storage: StorageConfig,
    pub embedding: EmbeddingConfig,
    pub pinecone: PineconeConfig,
    pub chunking: ChunkingConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `DOCVEC_PROFILE`. When set (e.g. `PROD`), every
    /// key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = env_or("DOCVEC_PROFILE", "").to_uppercase();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Self {
        let p = profile.to_uppercase();
        let p = p.as_str();
        Self {
            profile: p.to_string(),
            aws: AwsConfig::from_env_profiled(p),
            storage: StorageConfig::from_env_profiled(p),
            embedding: EmbeddingConfig::from_env_profiled(p),
            pinecone: PineconeConfig::from_env_profiled(p),
            chunking: ChunkingConfig::from_env_profiled(p),
        }
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Check that every secret the production pipeline needs is present.
    /// All missing keys are reported together.
    pub fn validate(&self) -> Result<(), CoreError> {
        let mut missing = Vec::new();
        if self.aws.s3_bucket.is_none() {
            missing.push("S3_BUCKET".to_string());
        }
        if self.aws.access_key_id.is_none() {
            missing.push("AWS_ACCESS_KEY_ID".to_string());
        }
        if self.aws.secret_access_key.is_none() {
            missing.push("AWS_SECRET_ACCESS_KEY".to_string());
        }
        if self.embedding.api_key.is_none() {
            missing.push("OPENAI_API_KEY".to_string());
        }
        if self.pinecone.api_key.is_none() {
            missing.push("PINECONE_API_KEY".to_string());
        }
        if self.pinecone.environment.is_none() && self.pinecone.index_host.is_none() {
            missing.push("PINECONE_ENVIRONMENT or PINECONE_INDEX_HOST".to_string());
        }
        if !missing.is_empty() {
            return Err(CoreError::MissingConfig(missing));
        }

        if self.embedding.dimensions == 0 {
            return Err(CoreError::InvalidConfig {
                key: "EMBEDDING_DIMENSIONS".into(),
                value: "0".into(),
            });
        }
        if self.pinecone.upsert_batch_size == 0 {
            return Err(CoreError::InvalidConfig {
                key: "PINECONE_UPSERT_BATCH_SIZE".into(),
                value: "0".into(),
            });
        }
        Ok(())
    }

    /// Print a redacted summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!(
            "  aws:         region={}, bucket={}",
            self.aws.region,
            self.aws.s3_bucket.as_deref().unwrap_or("(none)")
        );
        tracing::info!("  storage:     scratch_dir={}", self.storage.scratch_dir.display());
        tracing::info!(
            "  embedding:   model={}, dimensions={}",
            self.embedding.model, self.embedding.dimensions
        );
        tracing::info!(
            "  pinecone:    index={}, environment={}",
            self.pinecone.index,
            self.pinecone.environment.as_deref().unwrap_or("(none)")
        );
        tracing::info!(
            "  chunking:    size={}, overlap={}",
            self.chunking.chunk_size, self.chunking.chunk_overlap
        );
    }

    /// Return a redacted view safe for API responses (no secrets).
    pub fn redacted_summary(&self) -> serde_json::Value {
        serde_json::json!({
            "profile": self.profile_label(),
            "aws": {
                "region": self.aws.region,
                "s3_bucket": self.aws.s3_bucket,
                "configured": self.aws.is_configured(),
            },
            "storage": { "scratch_dir": self.storage.scratch_dir },
            "embedding": {
                "model": self.embedding.model,
                "dimensions": self.embedding.dimensions,
                "configured": self.embedding.api_key.is_some(),
            },
            "pinecone": {
                "index": self.pinecone.index,
                "environment": self.pinecone.environment,
                "index_host": self.pinecone.index_host,
                "configured": self.pinecone.api_key.is_some(),
            },
            "chunking": {
                "chunk_size": self.chunking.chunk_size,
                "chunk_overlap": self.chunking.chunk_overlap,
                "preview_bytes": self.chunking.preview_bytes,
            },
        })
    }
}

// ── AWS / S3 ──────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AwsConfig {
    pub region: String,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub session_token: Option<String>,
    pub s3_bucket: Option<String>,
    pub s3_prefix: Option<String>,
    pub endpoint_url: Option<String>,
}

impl AwsConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            region: profiled_env_or(p, "AWS_REGION", "ap-southeast-2"),
            access_key_id: profiled_env_opt(p, "AWS_ACCESS_KEY_ID"),
            secret_access_key: profiled_env_opt(p, "AWS_SECRET_ACCESS_KEY"),
            session_token: profiled_env_opt(p, "AWS_SESSION_TOKEN"),
            s3_bucket: profiled_env_opt(p, "S3_BUCKET"),
            s3_prefix: profiled_env_opt(p, "S3_PREFIX"),
            endpoint_url: profiled_env_opt(p, "AWS_ENDPOINT_URL"),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.access_key_id.is_some() && self.s3_bucket.is_some()
    }
}

// ── Local scratch storage ─────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory receiving downloaded documents (created on demand).
    pub scratch_dir: PathBuf,
}

impl StorageConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            scratch_dir: PathBuf::from(profiled_env_or(p, "SCRATCH_DIR", "/tmp")),
        }
    }
}

// ── Embedding (OpenAI-compatible) ─────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub dimensions: usize,
    pub timeout_secs: u64,
}

impl EmbeddingConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            api_key: profiled_env_opt(p, "OPENAI_API_KEY"),
            base_url: profiled_env_or(p, "OPENAI_BASE_URL", "https://api.openai.com"),
            model: profiled_env_or(p, "EMBEDDING_MODEL", "text-embedding-ada-002"),
            dimensions: profiled_env_usize(p, "EMBEDDING_DIMENSIONS", 1536),
            timeout_secs: profiled_env_u64(p, "EMBEDDING_TIMEOUT_SECS", 120),
        }
    }
}

// ── Pinecone ──────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PineconeConfig {
    pub api_key: Option<String>,
    /// Legacy pod environment (e.g. `gcp-starter`), used to resolve the index host.
    pub environment: Option<String>,
    pub index: String,
    /// Data-plane host; skips environment-based resolution when set.
    pub index_host: Option<String>,
    pub upsert_batch_size: usize,
}

impl PineconeConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            api_key: profiled_env_opt(p, "PINECONE_API_KEY"),
            environment: profiled_env_opt(p, "PINECONE_ENVIRONMENT"),
            index: profiled_env_or(p, "PINECONE_INDEX", "viet-chatpdf"),
            index_host: profiled_env_opt(p, "PINECONE_INDEX_HOST"),
            upsert_batch_size: profiled_env_usize(p, "PINECONE_UPSERT_BATCH_SIZE", 100),
        }
    }
}

// ── Chunking ──────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Maximum characters per chunk.
    pub chunk_size: usize,
    /// Characters shared between consecutive chunks.
    pub chunk_overlap: usize,
    /// Byte budget of the page preview stored with every vector.
    pub preview_bytes: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
            preview_bytes: 36_000,
        }
    }
}

impl ChunkingConfig {
    fn from_env_profiled(p: &str) -> Self {
        let defaults = Self::default();
        Self {
            chunk_size: profiled_env_usize(p, "CHUNK_SIZE", defaults.chunk_size),
            chunk_overlap: profiled_env_usize(p, "CHUNK_OVERLAP", defaults.chunk_overlap),
            preview_bytes: profiled_env_usize(p, "CHUNK_PREVIEW_BYTES", defaults.preview_bytes),
        }
    }
}
