use thiserror::Error;

/// Errors from media storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// No object with the requested content hash exists.
    #[error("media object not found: {0}")]
    NotFound(String),
    #[error("storage IO error: {0}")]
    Io(#[from] std::io::Error),
    /// The provided content hash is not a valid SHA-256 hex string.
    #[error("invalid content hash: {0}")]
    InvalidHash(String),
    /// The object exceeds the configured size limit.
    #[error("object exceeds size limit ({actual} > {limit} bytes)")]
    SizeLimitExceeded { actual: u64, limit: u64 },
    /// The storage backend rejected the operation.
    #[error("storage backend error: {0}")]
    Backend(String),
}
