//! File header codec.
//!
//! The header is the first [`HEADER_SIZE`] bytes of every file. It identifies
//! the format, declares the byte order of the rest of the file, and holds the
//! authoritative packet count.
//!
//! The byte order is not stored as its own field. The magic is always
//! big-endian, so it can be checked before anything else is known; the
//! version field is then written in the declared order, and since only one
//! version exists, whichever order makes it read as `1` is the file's order.

use crate::error::CodecError;
use crate::layout::{header as field, HEADER_SIZE};
use crate::swap::{swap32, Endian};
use byteorder::{BigEndian, ByteOrder, NativeEndian};
use std::io::{Read, Seek, SeekFrom, Write};

/// Format identifier, `"PKT\0"` read as a big-endian integer.
pub const MAGIC_NUMBER: u32 = 0x504B_5400;

/// Current format version.
pub const FORMAT_VERSION: u32 = 1;

/// Decoded file header, all fields in host order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Always [`MAGIC_NUMBER`] once decoded
    pub magic: u32,
    /// Format version
    pub version: u32,
    /// Byte order of every field except `magic`
    pub endian: Endian,
    /// Padding, written as zero and ignored on read
    pub reserved: u16,
    /// Number of packets in the file
    pub count: u32,
}

impl Default for Header {
    fn default() -> Self {
        Self::new()
    }
}

impl Header {
    /// Create an empty header in the host's byte order.
    pub fn new() -> Self {
        Self::with_endian(Endian::native())
    }

    /// Create an empty header declaring the given byte order.
    pub fn with_endian(endian: Endian) -> Self {
        Header {
            magic: MAGIC_NUMBER,
            version: FORMAT_VERSION,
            endian,
            reserved: 0,
            count: 0,
        }
    }

    /// Bump the packet count, failing when it would wrap.
    pub fn increment(&mut self) -> Result<u32, CodecError> {
        self.count = self
            .count
            .checked_add(1)
            .ok_or(CodecError::CountOverflow { count: self.count })?;
        Ok(self.count)
    }

    /// Serialize to the on-disk image.
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];
        BigEndian::write_u32(&mut buf[field::MAGIC.range()], self.magic);
        NativeEndian::write_u32(
            &mut buf[field::VERSION.range()],
            self.endian.normalize32(self.version),
        );
        // reserved stays zero
        NativeEndian::write_u32(
            &mut buf[field::COUNT.range()],
            self.endian.normalize32(self.count),
        );
        buf
    }

    /// Parse an on-disk image.
    pub fn from_bytes(data: &[u8]) -> Result<Self, CodecError> {
        if data.len() < HEADER_SIZE {
            return Err(CodecError::HeaderTooShort { actual: data.len() });
        }

        let magic = BigEndian::read_u32(&data[field::MAGIC.range()]);
        if magic != MAGIC_NUMBER {
            return Err(CodecError::BadMagic { found: magic });
        }

        let raw_version = NativeEndian::read_u32(&data[field::VERSION.range()]);
        let endian = detect_endian(raw_version)?;
        let raw_count = NativeEndian::read_u32(&data[field::COUNT.range()]);

        Ok(Header {
            magic,
            version: endian.normalize32(raw_version),
            endian,
            reserved: 0,
            count: endian.normalize32(raw_count),
        })
    }
}

/// Recover the declared byte order from the raw version field.
fn detect_endian(raw_version: u32) -> Result<Endian, CodecError> {
    let native = Endian::native();
    if raw_version == FORMAT_VERSION {
        Ok(native)
    } else if swap32(raw_version) == FORMAT_VERSION {
        Ok(native.opposite())
    } else {
        Err(CodecError::UnsupportedVersion { raw: raw_version })
    }
}

/// Write `header` at offset 0 and flush.
pub fn write_header<W: Write + Seek>(stream: &mut W, header: &Header) -> Result<(), CodecError> {
    stream.seek(SeekFrom::Start(0))?;
    stream.write_all(&header.to_bytes())?;
    stream.flush()?;
    Ok(())
}

/// Read and validate the header at offset 0.
///
/// Leaves the stream positioned just past the header.
pub fn read_header<R: Read + Seek>(stream: &mut R) -> Result<Header, CodecError> {
    stream.seek(SeekFrom::Start(0))?;
    let mut buf = Vec::with_capacity(HEADER_SIZE);
    stream.by_ref().take(HEADER_SIZE as u64).read_to_end(&mut buf)?;
    if buf.len() < HEADER_SIZE {
        return Err(CodecError::HeaderTooShort { actual: buf.len() });
    }
    Header::from_bytes(&buf)
}
