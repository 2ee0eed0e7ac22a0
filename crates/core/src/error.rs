use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("missing configuration: {}", .0.join(", "))]
    MissingConfig(Vec<String>),

    #[error("invalid configuration value: {key} = {value}")]
    InvalidConfig { key: String, value: String },
}
