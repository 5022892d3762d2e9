//! Packet record codec.
//!
//! A record is a fixed [`PACKET_PREFIX_SIZE`]-byte prefix followed by the raw
//! payload. Prefix fields follow the file's declared byte order; the payload
//! is opaque and written as-is.

use crate::error::CodecError;
use crate::layout::{packet as field, PACKET_PREFIX_SIZE};
use crate::swap::Endian;
use byteorder::{ByteOrder, NativeEndian};
use std::io::Read;

/// Largest payload buffer reserved up front while decoding.
///
/// Beyond this the buffer grows as bytes arrive, so a corrupt length field
/// cannot force a huge allocation before the stream runs dry.
const PAYLOAD_PREALLOC_LIMIT: usize = 1024 * 1024;

/// Well-known packet type tags.
pub mod packet_types {
    /// No type assigned
    pub const UNSET: u16 = 0;
    /// ARP frame
    pub const ARP: u16 = 0x01;
}

/// In-memory packet record.
///
/// The on-disk length field is derived from `data.len()`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Packet {
    /// Application-defined type tag
    pub packet_type: u16,
    /// Signed time value
    pub timestamp: i64,
    /// Raw payload
    pub data: Vec<u8>,
}

impl Packet {
    /// Create a packet with a zero-filled payload of `length` bytes.
    pub fn new(length: u32) -> Result<Self, CodecError> {
        let len = length as usize;
        let mut data = Vec::new();
        data.try_reserve_exact(len)
            .map_err(|_| CodecError::AllocationFailure { requested: len })?;
        data.resize(len, 0);
        Ok(Packet {
            packet_type: packet_types::UNSET,
            timestamp: 0,
            data,
        })
    }

    /// Create a packet from its parts.
    pub fn with_data(packet_type: u16, timestamp: i64, data: impl Into<Vec<u8>>) -> Self {
        Packet {
            packet_type,
            timestamp,
            data: data.into(),
        }
    }

    /// Payload length in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Size of the full on-disk image.
    pub fn encoded_len(&self) -> u64 {
        (PACKET_PREFIX_SIZE + self.data.len()) as u64
    }

    /// Build the prefix for this packet, checking the length fits.
    pub fn prefix(&self) -> Result<PacketPrefix, CodecError> {
        let length = u32::try_from(self.data.len()).map_err(|_| CodecError::PacketTooLarge {
            length: self.data.len() as u64,
            max: u64::from(u32::MAX),
        })?;
        Ok(PacketPrefix {
            packet_type: self.packet_type,
            timestamp: self.timestamp,
            length,
        })
    }

    /// Append the on-disk image to `buf`.
    pub fn encode_into(&self, buf: &mut Vec<u8>, endian: Endian) -> Result<(), CodecError> {
        let prefix = self.prefix()?;
        buf.reserve(PACKET_PREFIX_SIZE + self.data.len());
        buf.extend_from_slice(&prefix.to_bytes(endian));
        buf.extend_from_slice(&self.data);
        Ok(())
    }

    /// Produce the on-disk image.
    pub fn encode(&self, endian: Endian) -> Result<Vec<u8>, CodecError> {
        let mut buf = Vec::new();
        self.encode_into(&mut buf, endian)?;
        Ok(buf)
    }
}

/// Decoded fixed-size prefix of a record, fields in host order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketPrefix {
    /// Application-defined type tag
    pub packet_type: u16,
    /// Signed time value
    pub timestamp: i64,
    /// Payload byte count
    pub length: u32,
}

impl PacketPrefix {
    /// Serialize the prefix in the given byte order.
    pub fn to_bytes(&self, endian: Endian) -> [u8; PACKET_PREFIX_SIZE] {
        let mut buf = [0u8; PACKET_PREFIX_SIZE];
        NativeEndian::write_u16(
            &mut buf[field::TYPE.range()],
            endian.normalize16(self.packet_type),
        );
        NativeEndian::write_u64(
            &mut buf[field::TIMESTAMP.range()],
            endian.normalize64(self.timestamp as u64),
        );
        NativeEndian::write_u32(
            &mut buf[field::LENGTH.range()],
            endian.normalize32(self.length),
        );
        buf
    }

    /// Parse a prefix image in the given byte order.
    pub fn from_bytes(buf: &[u8; PACKET_PREFIX_SIZE], endian: Endian) -> Self {
        PacketPrefix {
            packet_type: endian.normalize16(NativeEndian::read_u16(&buf[field::TYPE.range()])),
            timestamp: endian.normalize64(NativeEndian::read_u64(&buf[field::TIMESTAMP.range()]))
                as i64,
            length: endian.normalize32(NativeEndian::read_u32(&buf[field::LENGTH.range()])),
        }
    }

    /// Read a prefix from the stream.
    ///
    /// Fails `Truncated` when the stream ends before a full prefix.
    pub fn decode<R: Read>(reader: &mut R, endian: Endian) -> Result<Self, CodecError> {
        let mut buf = Vec::with_capacity(PACKET_PREFIX_SIZE);
        reader
            .by_ref()
            .take(PACKET_PREFIX_SIZE as u64)
            .read_to_end(&mut buf)?;
        if buf.len() < PACKET_PREFIX_SIZE {
            return Err(CodecError::Truncated {
                index: None,
                expected: PACKET_PREFIX_SIZE as u64,
                actual: buf.len() as u64,
            });
        }

        let mut bytes = [0u8; PACKET_PREFIX_SIZE];
        bytes.copy_from_slice(&buf);
        Ok(Self::from_bytes(&bytes, endian))
    }

    /// Size of the whole record this prefix introduces.
    pub fn encoded_len(&self) -> u64 {
        PACKET_PREFIX_SIZE as u64 + u64::from(self.length)
    }

    /// Read exactly `length` payload bytes and assemble the packet.
    ///
    /// Fails `Truncated` when fewer bytes are available.
    pub fn read_payload<R: Read>(self, reader: &mut R) -> Result<Packet, CodecError> {
        let mut data = Vec::new();
        if self.length > 0 {
            let expected = u64::from(self.length);
            let initial = (self.length as usize).min(PAYLOAD_PREALLOC_LIMIT);
            data.try_reserve_exact(initial)
                .map_err(|_| CodecError::AllocationFailure { requested: initial })?;

            reader.by_ref().take(expected).read_to_end(&mut data)?;
            if (data.len() as u64) < expected {
                return Err(CodecError::Truncated {
                    index: None,
                    expected,
                    actual: data.len() as u64,
                });
            }
        }

        Ok(Packet {
            packet_type: self.packet_type,
            timestamp: self.timestamp,
            data,
        })
    }
}

/// Decode one full record from the stream.
pub fn decode_packet<R: Read>(reader: &mut R, endian: Endian) -> Result<Packet, CodecError> {
    PacketPrefix::decode(reader, endian)?.read_payload(reader)
}
