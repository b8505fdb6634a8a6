use thiserror::Error;

/// Errors returned by adapter operations.
#[derive(Debug, Error)]
pub enum SbpError {
    #[error("unsupported currency: {0}")]
    UnsupportedCurrency(String),

    #[error("processor error: {0}")]
    Http(String),

    #[error("platform error: {0}")]
    Platform(String),

    #[error("secret store error: {0}")]
    SecretStore(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}
