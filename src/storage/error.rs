//! Storage error types
//!
//! Errors raised while reading or writing the local key/value store.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur in the local store
#[derive(Error, Debug)]
pub enum StorageError {
    /// I/O operation failed
    #[error("IO error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The store file is not a JSON object of strings
    #[error("Corrupt store {path:?}: {message}")]
    Corrupt { path: PathBuf, message: String },

    /// Serialization of a stored value failed
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

/// Result type alias for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StorageError::Corrupt {
            path: PathBuf::from("/tmp/session.json"),
            message: "expected an object".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Corrupt store \"/tmp/session.json\": expected an object"
        );
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<u32>("nope").unwrap_err();
        let storage_err: StorageError = json_err.into();
        assert!(matches!(storage_err, StorageError::Serialization(_)));
    }
}
