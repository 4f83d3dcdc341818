use crate::domain::errors::StorageError;
use std::io;
use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum StoreError {
    #[error("Object store error: {0}")]
    ObjectStore(#[from] object_store::Error),

    #[error("Invalid storage path: {0}")]
    InvalidPath(#[from] object_store::path::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Corrupt container record at {path}: {reason}")]
    CorruptRecord { path: String, reason: String },
}

/// Convert object_store errors to domain storage errors
///
/// Call sites that know which entity they were touching map `NotFound`
/// themselves; anything reaching this conversion is a backend failure.
impl From<object_store::Error> for StorageError {
    fn from(err: object_store::Error) -> Self {
        match err {
            object_store::Error::NotSupported { .. }
            | object_store::Error::NotImplemented => StorageError::UnsupportedOperation {
                operation: "object_store".to_string(),
                reason: err.to_string(),
            },
            _ => StorageError::InfrastructureError {
                message: format!("Object store operation failed: {}", err),
                source: Some(err.to_string()),
            },
        }
    }
}

/// Convert infrastructure StoreError to domain StorageError
impl From<StoreError> for StorageError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::ObjectStore(object_err) => object_err.into(),
            StoreError::InvalidPath(path_err) => StorageError::InternalError {
                message: format!("Invalid storage path: {}", path_err),
            },
            StoreError::Io(io_err) => StorageError::InfrastructureError {
                message: format!("IO operation failed: {}", io_err),
                source: Some(io_err.to_string()),
            },
            StoreError::Serialization(serde_err) => StorageError::InfrastructureError {
                message: format!("Serialization failed: {}", serde_err),
                source: Some(serde_err.to_string()),
            },
            StoreError::CorruptRecord { path, reason } => StorageError::InternalError {
                message: format!("Corrupt container record at {}: {}", path, reason),
            },
        }
    }
}
