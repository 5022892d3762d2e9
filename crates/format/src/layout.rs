//! Field tables for the two fixed-size on-disk structures.
//!
//! Codecs place every field at the offset listed here; nothing relies on
//! in-memory struct layout matching the wire layout.
//!
//! ```text
//! Header (14 bytes):
//! ┌───────────┬─────────────┬──────────────┬───────────┐
//! │ Magic (4) │ Version (4) │ Reserved (2) │ Count (4) │
//! └───────────┴─────────────┴──────────────┴───────────┘
//!
//! Packet (14 + length bytes):
//! ┌──────────┬───────────────┬────────────┬────────────────────┐
//! │ Type (2) │ Timestamp (8) │ Length (4) │ Payload (length)   │
//! └──────────┴───────────────┴────────────┴────────────────────┘
//! ```

use std::ops::Range;

/// Byte order handling for a single field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldOrder {
    /// Always big-endian, whatever the file declares
    Canonical,
    /// Stored in the file's declared order
    Declared,
}

/// One fixed-width field of an on-disk structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Field name, for diagnostics
    pub name: &'static str,
    /// Byte offset from the start of the structure
    pub offset: usize,
    /// Width in bytes
    pub width: usize,
    /// How the field's byte order is chosen
    pub order: FieldOrder,
}

impl FieldSpec {
    const fn new(name: &'static str, offset: usize, width: usize, order: FieldOrder) -> Self {
        FieldSpec {
            name,
            offset,
            width,
            order,
        }
    }

    /// Byte range the field occupies.
    pub const fn range(&self) -> Range<usize> {
        self.offset..self.offset + self.width
    }

    /// First byte past the field.
    pub const fn end(&self) -> usize {
        self.offset + self.width
    }
}

/// Header fields.
pub mod header {
    use super::{FieldOrder, FieldSpec};

    /// Format identifier
    pub const MAGIC: FieldSpec = FieldSpec::new("magic", 0, 4, FieldOrder::Canonical);
    /// Format version
    pub const VERSION: FieldSpec = FieldSpec::new("version", 4, 4, FieldOrder::Declared);
    /// Padding, written as zero
    pub const RESERVED: FieldSpec = FieldSpec::new("reserved", 8, 2, FieldOrder::Declared);
    /// Number of packets in the file
    pub const COUNT: FieldSpec = FieldSpec::new("count", 10, 4, FieldOrder::Declared);

    /// All header fields in wire order.
    pub const FIELDS: [FieldSpec; 4] = [MAGIC, VERSION, RESERVED, COUNT];
}

/// Packet prefix fields.
pub mod packet {
    use super::{FieldOrder, FieldSpec};

    /// Application-defined type tag
    pub const TYPE: FieldSpec = FieldSpec::new("type", 0, 2, FieldOrder::Declared);
    /// Signed time value
    pub const TIMESTAMP: FieldSpec = FieldSpec::new("timestamp", 2, 8, FieldOrder::Declared);
    /// Payload byte count
    pub const LENGTH: FieldSpec = FieldSpec::new("length", 10, 4, FieldOrder::Declared);

    /// All prefix fields in wire order.
    pub const FIELDS: [FieldSpec; 3] = [TYPE, TIMESTAMP, LENGTH];
}

/// Size of the file header in bytes.
pub const HEADER_SIZE: usize = header::COUNT.end();

/// Size of a packet prefix in bytes.
pub const PACKET_PREFIX_SIZE: usize = packet::LENGTH.end();
