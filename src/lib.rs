//! pktfile - append-only container of typed binary packets
//!
//! A pktfile holds a fixed 14-byte header followed by variable-length packet
//! records, each tagged with a 16-bit type and a 64-bit timestamp. The header
//! declares the byte order of the file, so files move between little- and
//! big-endian hosts unchanged.
//!
//! # Quick Start
//!
//! ```no_run
//! use pktfile::{FileStore, Packet, packet_types};
//!
//! # fn main() -> Result<(), pktfile::StoreError> {
//! let mut store = FileStore::create("capture.pkt")?;
//! store.append(&Packet::with_data(packet_types::ARP, 1_700_000_000, b"ABC".to_vec()))?;
//!
//! let first = store.read_at(0)?;
//! let all = store.read_all()?;
//! assert_eq!(all, vec![first]);
//! store.close()?;
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - `pktfile-format`: byte-swap helpers, header and packet codecs
//! - `pktfile-store`: the [`FileStore`] that sequences codec calls over a file

pub use pktfile_format::{
    decode_packet, packet_types, read_header, swap16, swap32, swap64, write_header, CodecError,
    Endian, ErrorKind, Header, Packet, PacketPrefix, FORMAT_VERSION, HEADER_SIZE, MAGIC_NUMBER,
    PACKET_PREFIX_SIZE,
};
pub use pktfile_store::{
    AppendOrder, DurabilityMode, FileStore, PacketIter, StoreConfig, StoreConfigError, StoreError,
    VerifyReport,
};
