//! Durability and write-ordering modes
//!
//! Controls when structural writes reach stable storage and in which order
//! an append touches the header and the packet bytes.

use serde::{Deserialize, Serialize};

/// When writes are forced to disk.
///
/// | Mode | flush | fsync |
/// |------|-------|-------|
/// | Buffered | Every write | Never |
/// | Always | Every write | Every write |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DurabilityMode {
    /// Flush to the OS after every write; leave syncing to the OS.
    ///
    /// A process crash loses nothing, a power failure may.
    #[default]
    Buffered,

    /// `sync_data` after every header and packet write.
    ///
    /// Each append costs two syncs.
    Always,
}

impl DurabilityMode {
    /// Whether every write must be followed by an fsync
    pub fn requires_immediate_fsync(&self) -> bool {
        matches!(self, DurabilityMode::Always)
    }

    /// Human-readable description of the mode
    pub fn description(&self) -> &'static str {
        match self {
            DurabilityMode::Buffered => "Buffered (flush only)",
            DurabilityMode::Always => "Always sync (safest, slowest)",
        }
    }
}

/// Order of the two writes that make up an append.
///
/// Neither order is atomic. They differ in what a crash between the writes
/// leaves behind:
///
/// | Order | Crash leaves | Surfaces as |
/// |-------|--------------|-------------|
/// | HeaderFirst | count one higher than the records present | `Truncated` on the last index |
/// | PacketFirst | an orphaned record past `count` | `VerifyReport::orphaned_records` |
///
/// Reads never look past `count`, so an orphan stays invisible. A
/// `PacketFirst` append writes at the end of the counted records and cuts off
/// anything beyond them first; a `HeaderFirst` append always writes at end of
/// file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppendOrder {
    /// Rewrite the header, then write the packet
    #[default]
    HeaderFirst,
    /// Write the packet, then rewrite the header
    PacketFirst,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        assert_eq!(DurabilityMode::default(), DurabilityMode::Buffered);
        assert_eq!(AppendOrder::default(), AppendOrder::HeaderFirst);
    }

    #[test]
    fn test_requires_immediate_fsync() {
        assert!(DurabilityMode::Always.requires_immediate_fsync());
        assert!(!DurabilityMode::Buffered.requires_immediate_fsync());
    }

    #[test]
    fn test_description() {
        assert!(DurabilityMode::Always.description().contains("Always"));
        assert!(DurabilityMode::Buffered.description().contains("Buffered"));
    }
}
