//! Codec error types.

use crate::header::MAGIC_NUMBER;
use crate::layout::HEADER_SIZE;

/// Coarse classification of a [`CodecError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The host could not allocate a payload buffer
    AllocationFailure,
    /// The underlying stream failed or ended early
    Io,
    /// The bytes do not describe a valid file
    Format,
    /// A packet index is outside the stored range
    NotFound,
}

/// Errors raised while encoding, decoding, or locating records.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// Reserving a payload buffer failed.
    #[error("failed to allocate {requested} bytes for packet payload")]
    AllocationFailure {
        /// Bytes requested
        requested: usize,
    },

    /// Stream I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Fewer bytes than a full header were available.
    #[error("header too short: expected {} bytes, got {actual}", HEADER_SIZE)]
    HeaderTooShort {
        /// Bytes actually read
        actual: usize,
    },

    /// A record declares more bytes than the stream holds.
    #[error("truncated packet{}: expected {expected} bytes, got {actual}", describe_index(.index))]
    Truncated {
        /// Index of the affected packet, when known
        index: Option<u64>,
        /// Bytes the record declares
        expected: u64,
        /// Bytes actually available
        actual: u64,
    },

    /// Header magic does not match the format constant.
    #[error("invalid magic number: expected {:#010x}, found {found:#010x}", MAGIC_NUMBER)]
    BadMagic {
        /// Magic as read (big-endian)
        found: u32,
    },

    /// Version field is not a supported version in either byte order.
    #[error("unsupported format version: raw field {raw:#010x}")]
    UnsupportedVersion {
        /// Version field as read in host order
        raw: u32,
    },

    /// Index is at or beyond the header count.
    #[error("packet {index} not found: file holds {count} packets")]
    NotFound {
        /// Requested index
        index: u64,
        /// Header count at the time of the request
        count: u32,
    },

    /// The header count cannot be incremented.
    #[error("packet count overflow: header already holds {count} packets")]
    CountOverflow {
        /// Current count
        count: u32,
    },

    /// Payload exceeds the 32-bit length field or a configured bound.
    #[error("packet length {length} exceeds limit of {max} bytes")]
    PacketTooLarge {
        /// Payload length
        length: u64,
        /// Largest accepted length
        max: u64,
    },
}

fn describe_index(index: &Option<u64>) -> String {
    match index {
        Some(index) => format!(" {}", index),
        None => String::new(),
    }
}

impl CodecError {
    /// Classify the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CodecError::AllocationFailure { .. } => ErrorKind::AllocationFailure,
            CodecError::Io(_) | CodecError::HeaderTooShort { .. } | CodecError::Truncated { .. } => {
                ErrorKind::Io
            }
            CodecError::BadMagic { .. }
            | CodecError::UnsupportedVersion { .. }
            | CodecError::CountOverflow { .. }
            | CodecError::PacketTooLarge { .. } => ErrorKind::Format,
            CodecError::NotFound { .. } => ErrorKind::NotFound,
        }
    }

    /// Whether the error reports a record cut short by end of stream.
    pub fn is_truncated(&self) -> bool {
        matches!(self, CodecError::Truncated { .. })
    }

    /// Attach a packet index to a `Truncated` error. Other errors pass through.
    pub fn at_index(self, packet_index: u64) -> Self {
        match self {
            CodecError::Truncated {
                expected, actual, ..
            } => CodecError::Truncated {
                index: Some(packet_index),
                expected,
                actual,
            },
            other => other,
        }
    }
}
