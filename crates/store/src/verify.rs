//! Consistency report produced by [`FileStore::verify`](crate::FileStore::verify).

/// Result of scanning a file against its header count.
///
/// `records_found` counts every complete record present, including any past
/// the header count. `valid_end` is where the last complete record ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerifyReport {
    /// Count stored in the header
    pub count: u32,
    /// Complete records physically present
    pub records_found: u64,
    /// End offset of the last complete record
    pub valid_end: u64,
    /// File size in bytes
    pub file_len: u64,
}

impl VerifyReport {
    /// Bytes after the last complete record.
    pub fn trailing_bytes(&self) -> u64 {
        self.file_len - self.valid_end
    }

    /// Records the header claims but the file lacks.
    ///
    /// Non-zero after a header-first append was interrupted.
    pub fn missing_records(&self) -> u64 {
        u64::from(self.count).saturating_sub(self.records_found)
    }

    /// Complete records past the header count.
    ///
    /// Non-zero after a packet-first append was interrupted.
    pub fn orphaned_records(&self) -> u64 {
        self.records_found.saturating_sub(u64::from(self.count))
    }

    /// Whether the file is exactly `Header || count records`.
    pub fn is_consistent(&self) -> bool {
        self.records_found == u64::from(self.count) && self.trailing_bytes() == 0
    }
}
