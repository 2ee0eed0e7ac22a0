use thiserror::Error;

#[derive(Error, Debug)]
pub enum VectorError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {status}: {body}")]
    Api { status: u16, body: String },

    #[error("failed to encode request: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("failed to parse response: {0}")]
    Parse(String),

    #[error("invalid index host: {0}")]
    InvalidHost(String),

    #[error("not configured: {0}")]
    NotConfigured(String),
}
