use thiserror::Error;

use crate::config::ProviderName;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    #[error("{} API key is not configured", .0.label())]
    MissingCredential(ProviderName),

    #[error("{} API error ({status}): {body}", provider.label())]
    Provider {
        provider: ProviderName,
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Configuration file is corrupt: {0}")]
    ConfigCorrupt(String),

    #[error("Failed to persist configuration: {0}")]
    Persistence(#[source] std::io::Error),

    #[error("Failed to parse provider response: {0}")]
    Parse(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
