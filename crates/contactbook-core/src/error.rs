//! Error taxonomy for the record store.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failures reported by [`RecordStore`](crate::RecordStore).
///
/// `NotFound` is an expected outcome callers translate into a "not found"
/// response. The remaining variants are fatal to the request only; the store
/// keeps serving reads from whatever it holds in memory.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("contact {0} not found")]
    NotFound(i64),

    #[error("backing file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("backing file {} is malformed: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize contacts: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("no contact id left after {0}")]
    IdsExhausted(i64),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
