//! Store configuration.

use crate::mode::{AppendOrder, DurabilityMode};
use pktfile_format::Endian;
use serde::{Deserialize, Serialize};

/// Configuration for a [`FileStore`](crate::FileStore).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// When writes are synced to disk (default: Buffered).
    pub durability: DurabilityMode,

    /// Write order inside `append` (default: HeaderFirst).
    pub append_order: AppendOrder,

    /// Cache record offsets learned during scans and appends (default: off).
    ///
    /// Only changes how fast `read_at` finds a record, never what it returns.
    pub index_offsets: bool,

    /// Byte order declared by files made with `FileStore::create`.
    ///
    /// `None` uses the host's order.
    pub create_endian: Option<Endian>,

    /// Largest payload accepted on append and on read (default: unbounded).
    pub max_packet_len: Option<u32>,
}

impl StoreConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sync every write and append the packet before bumping the count.
    ///
    /// The offset index is on so each append finds the end of the counted
    /// records without rescanning.
    pub fn strict() -> Self {
        StoreConfig {
            durability: DurabilityMode::Always,
            append_order: AppendOrder::PacketFirst,
            index_offsets: true,
            ..Default::default()
        }
    }

    /// Configuration for tests: offset index on, a modest payload bound.
    pub fn for_testing() -> Self {
        StoreConfig {
            index_offsets: true,
            max_packet_len: Some(16 * 1024 * 1024),
            ..Default::default()
        }
    }

    /// Set durability mode (builder pattern).
    pub fn with_durability(mut self, mode: DurabilityMode) -> Self {
        self.durability = mode;
        self
    }

    /// Set append order (builder pattern).
    pub fn with_append_order(mut self, order: AppendOrder) -> Self {
        self.append_order = order;
        self
    }

    /// Enable or disable the offset index (builder pattern).
    pub fn with_offset_index(mut self, enabled: bool) -> Self {
        self.index_offsets = enabled;
        self
    }

    /// Set the byte order used by `FileStore::create` (builder pattern).
    pub fn with_create_endian(mut self, endian: Endian) -> Self {
        self.create_endian = Some(endian);
        self
    }

    /// Bound payload sizes (builder pattern).
    pub fn with_max_packet_len(mut self, max: u32) -> Self {
        self.max_packet_len = Some(max);
        self
    }

    /// Byte order for newly created files.
    pub fn endian_for_create(&self) -> Endian {
        self.create_endian.unwrap_or_else(Endian::native)
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), StoreConfigError> {
        if self.max_packet_len == Some(0) {
            return Err(StoreConfigError::ZeroPacketLimit);
        }
        Ok(())
    }
}

/// Store configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreConfigError {
    /// A payload bound of zero would reject every non-empty packet.
    #[error("max_packet_len must be at least 1 byte")]
    ZeroPacketLimit,
}
