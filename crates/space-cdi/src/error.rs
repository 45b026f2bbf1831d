use std::{io, path::PathBuf};

use space_core::error::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CdiError {
    #[error("invalid directory {path}: {reason}")]
    InvalidRoot { path: PathBuf, reason: &'static str },

    #[error("invalid key {key:?}: {reason}")]
    InvalidKey { key: String, reason: &'static str },

    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("encoding error: {0}")]
    Encode(#[from] serde_json::Error),
}

impl CdiError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> CdiError {
        let path = path.into();
        move |source| CdiError::Io { path, source }
    }
}

impl From<CdiError> for StoreError {
    fn from(e: CdiError) -> Self {
        match e {
            CdiError::InvalidKey { key, reason } => StoreError::InvalidKey { key, reason },
            CdiError::Io { source, .. } => StoreError::Io(source),
            CdiError::Encode(e) => StoreError::Encode(e.to_string()),
            other @ CdiError::InvalidRoot { .. } => StoreError::Backend(other.to_string()),
        }
    }
}
