//! Store error type.

use crate::config::StoreConfigError;
use pktfile_format::{CodecError, ErrorKind};

/// Errors returned by [`FileStore`](crate::FileStore) operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Codec or stream failure
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// Rejected configuration
    #[error("invalid store config: {0}")]
    Config(#[from] StoreConfigError),
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Codec(CodecError::Io(e))
    }
}

impl StoreError {
    /// Classification of the underlying codec error.
    ///
    /// `None` for configuration errors.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            StoreError::Codec(e) => Some(e.kind()),
            StoreError::Config(_) => None,
        }
    }

    /// The underlying codec error, if any.
    pub fn as_codec(&self) -> Option<&CodecError> {
        match self {
            StoreError::Codec(e) => Some(e),
            StoreError::Config(_) => None,
        }
    }

    /// Whether a record was cut short by end of file.
    pub fn is_truncated(&self) -> bool {
        self.as_codec().is_some_and(CodecError::is_truncated)
    }

    /// Whether the requested index was out of range.
    pub fn is_not_found(&self) -> bool {
        self.kind() == Some(ErrorKind::NotFound)
    }

    /// Whether the header failed magic validation.
    pub fn is_bad_magic(&self) -> bool {
        matches!(self, StoreError::Codec(CodecError::BadMagic { .. }))
    }
}
