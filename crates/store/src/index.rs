//! In-memory record offset cache.
//!
//! Record `i` starts at `bounds[i]` and ends at `bounds[i + 1]`. Bounds are
//! only ever learned contiguously from the first record, so a cached entry is
//! always the value a fresh scan would compute.

use pktfile_format::HEADER_SIZE;

#[derive(Debug, Clone)]
pub(crate) struct OffsetIndex {
    bounds: Vec<u64>,
}

impl Default for OffsetIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl OffsetIndex {
    pub(crate) fn new() -> Self {
        OffsetIndex {
            bounds: vec![HEADER_SIZE as u64],
        }
    }

    /// Number of records whose end offset is known.
    pub(crate) fn known_records(&self) -> u64 {
        (self.bounds.len() - 1) as u64
    }

    /// Furthest known record start at or before `index`.
    pub(crate) fn nearest(&self, index: u64) -> (u64, u64) {
        let i = index.min(self.known_records());
        (i, self.bounds[i as usize])
    }

    /// Record that `index` ends at `end`. Ignored unless it extends the
    /// contiguous known range by exactly one.
    pub(crate) fn record_end(&mut self, index: u64, end: u64) {
        if index == self.known_records() {
            self.bounds.push(end);
        }
    }

    /// Record an appended packet written at `start`. Only cached when `start`
    /// is where the last known record ends.
    pub(crate) fn record_append(&mut self, index: u64, start: u64, end: u64) {
        if index == self.known_records() && self.bounds.last() == Some(&start) {
            self.bounds.push(end);
        }
    }

    /// Forget records at and beyond `count`.
    pub(crate) fn truncate(&mut self, count: u64) {
        let keep = (count as usize).saturating_add(1);
        if keep < self.bounds.len() {
            self.bounds.truncate(keep);
        }
    }

    pub(crate) fn clear(&mut self) {
        self.bounds.truncate(1);
    }
}
