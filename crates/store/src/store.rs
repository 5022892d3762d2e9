//! File-backed packet store.
//!
//! A [`FileStore`] owns one open file and sequences header and packet codec
//! calls over it. The header is re-read at the start of every operation; its
//! count is the only record of how many packets exist. Records carry no
//! offsets, so locating packet `i` means walking the `i` prefixes before it
//! (unless the optional offset index already knows where it starts).
//!
//! # Append
//!
//! An append is two writes: the header with the incremented count, and the
//! packet image after the last counted record. [`AppendOrder`] picks which
//! goes first; see its docs for what each order leaves behind after a crash.

use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::index::OffsetIndex;
use crate::iter::PacketIter;
use crate::mode::AppendOrder;
use crate::verify::VerifyReport;
use pktfile_format::{
    CodecError, Endian, Header, Packet, PacketPrefix, HEADER_SIZE, PACKET_PREFIX_SIZE,
};
use std::fs::{File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, trace, warn};

/// Single-writer handle to a packet file.
///
/// Not safe to share between processes: two stores on one path race on the
/// header count with no detection.
pub struct FileStore {
    file: File,
    path: PathBuf,
    config: StoreConfig,
    index: Option<OffsetIndex>,
}

impl FileStore {
    /// Open `path` for reading and writing, creating it if absent.
    ///
    /// A newly created file is empty; write a header before appending.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        Self::open_with_config(path, StoreConfig::default())
    }

    /// Open with explicit configuration.
    pub fn open_with_config(path: impl AsRef<Path>, config: StoreConfig) -> Result<Self, StoreError> {
        config.validate()?;
        let path = path.as_ref().to_path_buf();

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(&path)?;

        debug!(
            path = %path.display(),
            durability = config.durability.description(),
            "Opened packet file"
        );
        Ok(Self::from_parts(file, path, config))
    }

    /// Create (or truncate) `path` and write an empty header.
    pub fn create(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        Self::create_with_config(path, StoreConfig::default())
    }

    /// Create with explicit configuration.
    ///
    /// The header declares `config.endian_for_create()`.
    pub fn create_with_config(
        path: impl AsRef<Path>,
        config: StoreConfig,
    ) -> Result<Self, StoreError> {
        config.validate()?;
        let path = path.as_ref().to_path_buf();

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)?;

        let endian = config.endian_for_create();
        let mut store = Self::from_parts(file, path, config);
        store.write_header(&Header::with_endian(endian))?;

        debug!(path = %store.path.display(), ?endian, "Created packet file");
        Ok(store)
    }

    fn from_parts(file: File, path: PathBuf, config: StoreConfig) -> Self {
        let index = config.index_offsets.then(OffsetIndex::new);
        FileStore {
            file,
            path,
            config,
            index,
        }
    }

    /// Flush outstanding writes and release the file.
    pub fn close(mut self) -> Result<(), StoreError> {
        self.file.flush()?;
        self.sync()?;
        debug!(path = %self.path.display(), "Closed packet file");
        Ok(())
    }

    /// Path this store was opened with.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Active configuration.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    // ========================================================================
    // Header
    // ========================================================================

    /// Write `header` at offset 0.
    ///
    /// Existing packet bytes are left in place; cached offsets are dropped.
    pub fn write_header(&mut self, header: &Header) -> Result<(), StoreError> {
        self.write_header_durable(header)?;
        if let Some(index) = self.index.as_mut() {
            index.clear();
        }
        Ok(())
    }

    /// Read and validate the header.
    pub fn read_header(&mut self) -> Result<Header, StoreError> {
        let header = pktfile_format::read_header(&mut self.file)?;
        if let Some(index) = self.index.as_mut() {
            index.truncate(u64::from(header.count));
        }
        Ok(header)
    }

    /// Number of packets according to the header.
    pub fn len(&mut self) -> Result<u64, StoreError> {
        Ok(u64::from(self.read_header()?.count))
    }

    /// Whether the header count is zero.
    pub fn is_empty(&mut self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }

    // ========================================================================
    // Append
    // ========================================================================

    /// Append one packet and return its index.
    ///
    /// Fails without writing anything if the header is missing or invalid,
    /// the count would overflow, or the payload exceeds `max_packet_len`.
    pub fn append(&mut self, packet: &Packet) -> Result<u64, StoreError> {
        self.check_packet_len(packet.len() as u64)?;

        let mut header = self.read_header()?;
        let packet_index = u64::from(header.count);
        header.increment()?;
        let image = packet.encode(header.endian)?;

        let start = match self.config.append_order {
            AppendOrder::HeaderFirst => {
                self.write_header_durable(&header)?;
                self.write_image(SeekFrom::End(0), &image)?
            }
            AppendOrder::PacketFirst => {
                let start = self.records_end(packet_index, header.endian)?;
                self.write_image(SeekFrom::Start(start), &image)?;
                self.write_header_durable(&header)?;
                start
            }
        };

        if let Some(index) = self.index.as_mut() {
            index.record_append(packet_index, start, start + image.len() as u64);
        }

        debug!(
            index = packet_index,
            offset = start,
            length = packet.len(),
            "Appended packet"
        );
        Ok(packet_index)
    }

    fn write_header_durable(&mut self, header: &Header) -> Result<(), StoreError> {
        pktfile_format::write_header(&mut self.file, header)?;
        self.sync()
    }

    /// End of the last counted record.
    ///
    /// Bytes past it were never covered by the count (an append interrupted
    /// before its header write) and are cut off so the next record lands
    /// where the count says it is.
    fn records_end(&mut self, count: u64, endian: Endian) -> Result<u64, StoreError> {
        let file_len = self.file_len()?;
        let end = self.locate(count, endian, file_len)?;
        if file_len > end {
            warn!(
                path = %self.path.display(),
                count,
                dropped = file_len - end,
                "Discarding bytes past the last counted packet"
            );
            self.file.set_len(end)?;
        }
        Ok(end)
    }

    /// Write `image` at `pos`, returning where it starts.
    fn write_image(&mut self, pos: SeekFrom, image: &[u8]) -> Result<u64, StoreError> {
        let start = self.file.seek(pos)?;
        self.file.write_all(image)?;
        self.file.flush()?;
        self.sync()?;
        Ok(start)
    }

    fn sync(&mut self) -> Result<(), StoreError> {
        if self.config.durability.requires_immediate_fsync() {
            self.file.sync_data()?;
        }
        Ok(())
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// Read the packet at `index`.
    ///
    /// Fails `NotFound` when `index` is at or past the header count.
    pub fn read_at(&mut self, index: u64) -> Result<Packet, StoreError> {
        let header = self.read_header()?;
        if index >= u64::from(header.count) {
            return Err(CodecError::NotFound {
                index,
                count: header.count,
            }
            .into());
        }

        let file_len = self.file_len()?;
        let offset = self.locate(index, header.endian, file_len)?;
        let (packet, _) = self.decode_at(index, offset, header.endian, file_len)?;
        Ok(packet)
    }

    /// Read the first packet.
    pub fn read_first(&mut self) -> Result<Packet, StoreError> {
        self.read_at(0)
    }

    /// Read every packet in order.
    ///
    /// Either all `count` packets are returned or an error is; a failure
    /// partway through discards what was already decoded.
    pub fn read_all(&mut self) -> Result<Vec<Packet>, StoreError> {
        let header = self.read_header()?;
        let count = u64::from(header.count);
        let file_len = self.file_len()?;

        // A corrupt count must not size the allocation on its own.
        let fits = file_len.saturating_sub(HEADER_SIZE as u64) / PACKET_PREFIX_SIZE as u64;
        let mut packets = Vec::with_capacity(count.min(fits) as usize);

        let mut offset = HEADER_SIZE as u64;
        for i in 0..count {
            let (packet, end) = self.decode_at(i, offset, header.endian, file_len)?;
            packets.push(packet);
            offset = end;
        }

        trace!(count, bytes = offset, "Read all packets");
        Ok(packets)
    }

    /// Stream packets in order without loading them all at once.
    ///
    /// The count is taken from the header when the iterator is created.
    pub fn iter(&mut self) -> Result<PacketIter<'_>, StoreError> {
        let header = self.read_header()?;
        let file_len = self.file_len()?;
        Ok(PacketIter::new(self, header, file_len))
    }

    /// Scan the whole file and compare what is there with the header count.
    ///
    /// Read-only: nothing is repaired.
    pub fn verify(&mut self) -> Result<VerifyReport, StoreError> {
        let header = self.read_header()?;
        let file_len = self.file_len()?;

        let mut records_found = 0u64;
        let mut offset = HEADER_SIZE as u64;
        while offset < file_len {
            self.file.seek(SeekFrom::Start(offset))?;
            let prefix = match PacketPrefix::decode(&mut self.file, header.endian) {
                Ok(prefix) => prefix,
                Err(e) if e.is_truncated() => break,
                Err(e) => return Err(e.into()),
            };
            let end = offset + prefix.encoded_len();
            if end > file_len || self.check_packet_len(u64::from(prefix.length)).is_err() {
                break;
            }
            records_found += 1;
            offset = end;
        }

        let report = VerifyReport {
            count: header.count,
            records_found,
            valid_end: offset,
            file_len,
        };

        if !report.is_consistent() {
            warn!(
                path = %self.path.display(),
                count = report.count,
                records_found = report.records_found,
                trailing_bytes = report.trailing_bytes(),
                "Packet file does not match its header"
            );
        }
        Ok(report)
    }

    // ========================================================================
    // Record walking
    // ========================================================================

    /// Byte offset where packet `target` starts.
    fn locate(&mut self, target: u64, endian: Endian, file_len: u64) -> Result<u64, StoreError> {
        let (mut i, mut offset) = match &self.index {
            Some(index) => index.nearest(target),
            None => (0, HEADER_SIZE as u64),
        };

        while i < target {
            let prefix = self.prefix_at(i, offset, endian)?;
            let end = offset + prefix.encoded_len();
            if end > file_len {
                return Err(truncated(i, offset, &prefix, file_len));
            }
            trace!(index = i, offset, length = prefix.length, "Skipped packet");
            self.learn(i, end);
            offset = end;
            i += 1;
        }
        Ok(offset)
    }

    /// Decode packet `i` starting at `offset`. Returns it with its end offset.
    pub(crate) fn decode_at(
        &mut self,
        i: u64,
        offset: u64,
        endian: Endian,
        file_len: u64,
    ) -> Result<(Packet, u64), StoreError> {
        let prefix = self.prefix_at(i, offset, endian)?;
        let end = offset + prefix.encoded_len();
        if end > file_len {
            return Err(truncated(i, offset, &prefix, file_len));
        }

        let packet = prefix
            .read_payload(&mut self.file)
            .map_err(|e| e.at_index(i))?;
        self.learn(i, end);
        Ok((packet, end))
    }

    fn prefix_at(&mut self, i: u64, offset: u64, endian: Endian) -> Result<PacketPrefix, StoreError> {
        self.file.seek(SeekFrom::Start(offset))?;
        let prefix = match PacketPrefix::decode(&mut self.file, endian) {
            Ok(prefix) => prefix,
            Err(e) => {
                if e.is_truncated() {
                    warn!(index = i, offset, "Packet prefix truncated");
                }
                return Err(e.at_index(i).into());
            }
        };
        self.check_packet_len(u64::from(prefix.length))?;
        Ok(prefix)
    }

    fn learn(&mut self, i: u64, end: u64) {
        if let Some(index) = self.index.as_mut() {
            index.record_end(i, end);
        }
    }

    fn check_packet_len(&self, length: u64) -> Result<(), CodecError> {
        match self.config.max_packet_len {
            Some(max) if length > u64::from(max) => Err(CodecError::PacketTooLarge {
                length,
                max: u64::from(max),
            }),
            _ => Ok(()),
        }
    }

    fn file_len(&self) -> Result<u64, StoreError> {
        Ok(self.file.metadata()?.len())
    }
}

impl std::fmt::Debug for FileStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileStore")
            .field("path", &self.path)
            .field("config", &self.config)
            .finish()
    }
}

/// Error for a record whose payload runs past end of file.
fn truncated(i: u64, offset: u64, prefix: &PacketPrefix, file_len: u64) -> StoreError {
    let available = file_len.saturating_sub(offset + PACKET_PREFIX_SIZE as u64);
    warn!(
        index = i,
        offset,
        expected = prefix.length,
        available,
        "Packet payload truncated"
    );
    CodecError::Truncated {
        index: Some(i),
        expected: u64::from(prefix.length),
        actual: available,
    }
    .into()
}
