//! Streaming packet iterator.

use crate::error::StoreError;
use crate::store::FileStore;
use pktfile_format::{Endian, Header, Packet, HEADER_SIZE};

/// Iterator over the packets of a [`FileStore`], in order.
///
/// Yields at most one error; iteration ends after it.
pub struct PacketIter<'a> {
    store: &'a mut FileStore,
    endian: Endian,
    count: u64,
    next_index: u64,
    offset: u64,
    file_len: u64,
    failed: bool,
}

impl<'a> PacketIter<'a> {
    pub(crate) fn new(store: &'a mut FileStore, header: Header, file_len: u64) -> Self {
        PacketIter {
            store,
            endian: header.endian,
            count: u64::from(header.count),
            next_index: 0,
            offset: HEADER_SIZE as u64,
            file_len,
            failed: false,
        }
    }

    /// Index of the next packet to be yielded.
    pub fn position(&self) -> u64 {
        self.next_index
    }
}

impl Iterator for PacketIter<'_> {
    type Item = Result<Packet, StoreError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.next_index >= self.count {
            return None;
        }

        match self
            .store
            .decode_at(self.next_index, self.offset, self.endian, self.file_len)
        {
            Ok((packet, end)) => {
                self.next_index += 1;
                self.offset = end;
                Some(Ok(packet))
            }
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.failed {
            return (0, Some(0));
        }
        let remaining = (self.count - self.next_index) as usize;
        (remaining.min(1), Some(remaining))
    }
}
