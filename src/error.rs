//! Error types.
//!
//! Runtime sampling, mapping and lifecycle operations never fail; they degrade
//! to "no update". Only page configuration can be rejected.

use std::path::PathBuf;

use thiserror::Error;

pub type RevealResult<T> = Result<T, RevealError>;

#[derive(Debug, Error)]
pub enum RevealError {
    #[error("IO error when reading `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("page config parsing error")]
    Toml(#[from] toml::de::Error),

    #[error("page config validation error: {0}")]
    Validation(String),

    #[error("unknown element `{0}`")]
    UnknownElement(String),
}

impl RevealError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}
