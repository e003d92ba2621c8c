use crate::model::ItemKind;
use crate::transport::{Endpoint, PageRequest};
use std::path::PathBuf;

/// A single raw record could not be turned into a typed item.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("{kind} record is missing required field `{field}`")]
    Missing { kind: ItemKind, field: &'static str },

    #[error("{kind} record has invalid field `{field}`: {reason}")]
    Invalid { kind: ItemKind, field: &'static str, reason: String },
}

impl DecodeError {
    pub fn field(&self) -> &'static str {
        match self {
            DecodeError::Missing { field, .. } | DecodeError::Invalid { field, .. } => field,
        }
    }
}

/// Failure reported by a `Transport` implementation.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The thread/post the request targets does not exist upstream.
    #[error("remote resource not found: {resource}")]
    NotFound { resource: String },

    #[error(transparent)]
    Failed(#[from] anyhow::Error),
}

/// Everything that can end a paginated fetch.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("{endpoint} does not exist upstream")]
    NotFound { endpoint: Endpoint },

    #[error("protocol violation on {request}: {reason}")]
    ProtocolViolation { request: PageRequest, reason: String },

    #[error("item {index} of {request} failed to decode")]
    Decode {
        request: PageRequest,
        index: usize,
        #[source]
        source: DecodeError,
    },

    #[error("transport failure on {request}")]
    Transport {
        request: PageRequest,
        #[source]
        source: anyhow::Error,
    },
}

impl FetchError {
    /// The page request that failed, if the failure happened on a specific page.
    pub fn request(&self) -> Option<&PageRequest> {
        match self {
            FetchError::NotFound { .. } => None,
            FetchError::ProtocolViolation { request, .. }
            | FetchError::Decode { request, .. }
            | FetchError::Transport { request, .. } => Some(request),
        }
    }

    /// Cursor to pass back as a start cursor to retry from the failed page.
    /// `None` means "from the beginning".
    pub fn resume_cursor(&self) -> Option<&str> {
        self.request().and_then(|r| r.cursor.as_deref())
    }
}

/// Loading or saving the archive blob failed. A missing archive is not an error.
#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    #[error("archive I/O failed at {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    /// The file exists but does not decode. Never treated as an empty archive.
    #[error("archive at {} is corrupt", path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },
}
