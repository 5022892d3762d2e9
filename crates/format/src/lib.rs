//! On-disk format for pktfile containers
//!
//! A pktfile is a fixed-size header followed by `count` variable-length
//! packet records:
//!
//! ```text
//! Header || Packet_0 || Packet_1 || ... || Packet_{count-1}
//! ```
//!
//! This crate owns the byte-level codecs only:
//!
//! - `swap`: byte-swap primitives and the per-file [`Endian`] flag
//! - `layout`: field tables for the header and packet prefix
//! - `header`: header encode/decode and stream read/write
//! - `packet`: packet encode/decode
//! - `error`: [`CodecError`] and its [`ErrorKind`] classification
//!
//! File handling (append, indexed reads, bulk loads) lives in `pktfile-store`.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod header;
pub mod layout;
pub mod packet;
pub mod swap;

pub use error::{CodecError, ErrorKind};
pub use header::{read_header, write_header, Header, FORMAT_VERSION, MAGIC_NUMBER};
pub use layout::{FieldOrder, FieldSpec, HEADER_SIZE, PACKET_PREFIX_SIZE};
pub use packet::{decode_packet, packet_types, Packet, PacketPrefix};
pub use swap::{swap16, swap32, swap64, Endian};

