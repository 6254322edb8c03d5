//! Error types for option loading and the remote API.

use std::path::PathBuf;
use thiserror::Error;

/// Failure while building the effective option set
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("config file {path} must contain a JSON object")]
    NotAnObject { path: PathBuf },

    #[error("invalid option value: {0}")]
    InvalidOption(#[source] serde_json::Error),
}

/// Failure of a single call against the VersionEye API
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Transport(Box<dyn std::error::Error + Send + Sync>),

    #[error("VersionEye API says \"{0}\"")]
    Api(String),

    #[error("Failed to parse VersionEye API return object: \"{0}\"")]
    Parse(#[source] serde_json::Error),
}

impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> Self {
        ServiceError::Transport(Box::new(err))
    }
}
