//! Storage errors.

use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O failed for key {key}")]
    Io {
        key: String,
        #[source]
        source: io::Error,
    },

    #[error("invalid storage key {0:?}")]
    InvalidKey(String),

    #[error("document under {key} could not be encoded or decoded")]
    Serialization {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("document under {key} has unsupported version {version}")]
    UnsupportedVersion { key: String, version: u32 },
}
