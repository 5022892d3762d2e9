//! File access layer for pktfile containers
//!
//! [`FileStore`] owns an open file and implements the operations callers use:
//!
//! - `create` / `open` / `close`
//! - `write_header` / `read_header`
//! - `append`: bump the header count and write one packet
//! - `read_at`: locate a packet by walking the prefixes before it
//! - `read_all` / `iter`: load every packet in order
//! - `verify`: compare the file's contents with its header
//!
//! Byte-level encoding lives in `pktfile-format`.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
mod index;
pub mod iter;
pub mod mode;
pub mod store;
pub mod verify;

pub use config::{StoreConfig, StoreConfigError};
pub use error::StoreError;
pub use iter::PacketIter;
pub use mode::{AppendOrder, DurabilityMode};
pub use store::FileStore;
pub use verify::VerifyReport;
