//! Error types for the filesystem backend.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for filesystem operations.
pub type Result<T> = std::result::Result<T, FsError>;

/// Errors that can occur in filesystem operations.
#[derive(Debug, Error)]
pub enum FsError {
    /// Catalog not found at the specified path.
    #[error("catalog not found at '{0}'")]
    CatalogNotFound(PathBuf),

    /// Catalog already exists.
    #[error("catalog already exists at '{0}'")]
    CatalogExists(PathBuf),

    /// Product not found.
    #[error("product not found: {0}")]
    ProductNotFound(String),

    /// Product already exists.
    #[error("product already exists: {0}")]
    ProductExists(String),

    /// Category id that cannot be used as a directory name.
    #[error("invalid category id: '{0}'")]
    InvalidCategory(String),

    /// Invalid slug.
    #[error("invalid slug: {0}")]
    InvalidSlug(String),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Atomic file replacement failed.
    #[error("persist error: {0}")]
    Persist(#[from] tempfile::PersistError),

    /// Directory walk error.
    #[error("walk error: {0}")]
    Walk(#[from] walkdir::Error),

    /// YAML parsing error.
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON parsing error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Core library error.
    #[error("core error: {0}")]
    Core(#[from] catalog_core::CoreError),
}

impl From<FsError> for catalog_core::CoreError {
    fn from(err: FsError) -> Self {
        match err {
            FsError::Core(core) => core,
            FsError::InvalidCategory(id) => Self::Validation(format!(
                "groupId may only contain ASCII letters, digits, '-' and '_': '{id}'"
            )),
            other => Self::storage(other),
        }
    }
}
