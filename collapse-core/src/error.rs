//! Error types surfaced by the collapse controller.
use thiserror::Error;

/// Failures reported by a [`Controller`](crate::Controller) or its builder.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CollapseError {
    #[error("section index {index} out of range (container has {len} sections)")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("header #{position} has no content element following it")]
    MalformedSection { position: usize },
    #[error("persisted state for `{container}` unavailable: {reason}")]
    StorageUnavailable { container: String, reason: String },
    #[error("unknown collapse action `{0}`")]
    UnknownAction(String),
}

/// Failures raised by a [`CollapseStorage`](crate::CollapseStorage) backend.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
    #[error("stored state is not valid JSON: {0}")]
    Corrupt(#[from] serde_json::Error),
}
