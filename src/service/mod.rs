pub mod catalog;
pub mod ingest;

use thiserror::Error;

/// Request-level failures of the catalog API. `Storage` wraps disk errors
/// that must surface to the caller; swallowed best-effort deletions never
/// produce this variant.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Video not found")]
    NotFound,
    #[error("{0}")]
    ValidationFailed(String),
    #[error("{0}")]
    InvalidFileType(String),
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl CatalogError {
    pub fn validation(message: impl Into<String>) -> Self {
        CatalogError::ValidationFailed(message.into())
    }
}
