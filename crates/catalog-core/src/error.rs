//! Error types for catalog-core.

use thiserror::Error;

/// Result type alias for catalog-core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors that can occur in catalog-core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A required request field is missing or malformed.
    #[error("validation error: {0}")]
    Validation(String),

    /// Product is not part of the category it was addressed through.
    #[error("product not found: {product_id} in category {category_id}")]
    ItemNotFound {
        category_id: String,
        product_id: String,
    },

    /// The backing store rejected a read or a batch commit.
    #[error("storage error: {0}")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// JSON serialization/deserialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Wrap a backend error as a storage failure.
    pub fn storage(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Storage(err.into())
    }

    /// Whether the error was caused by caller input rather than the store.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
