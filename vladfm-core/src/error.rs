//! Core error types for vladFM.

use thiserror::Error;

/// Core error type for vladFM operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Vote value outside of `-1`, `0`, `1`.
    #[error("Invalid vote value: {0} (expected -1, 0 or 1)")]
    InvalidVoteValue(i64),

    /// Feed page numbers start at 1.
    #[error("Invalid page: {0} (pages start at 1)")]
    InvalidPage(u32),

    /// Unknown feed sort mode.
    #[error("Invalid sort: {0} (expected new, top or discussed)")]
    InvalidSort(String),

    /// User input rejected before reaching the server.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Invalid data from API response.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
