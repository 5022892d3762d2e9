//! Byte-order primitives and the per-file endianness flag.
//!
//! Every multi-byte field except the header magic is stored in the byte order
//! the file declares. Codecs read and write fields in host order and pass them
//! through [`Endian::normalize32`] (and friends), which swaps only when the
//! declared order differs from the host's.

use serde::{Deserialize, Serialize};

/// Reverse the byte order of a 16-bit value.
#[inline]
pub const fn swap16(value: u16) -> u16 {
    value.swap_bytes()
}

/// Reverse the byte order of a 32-bit value.
#[inline]
pub const fn swap32(value: u32) -> u32 {
    value.swap_bytes()
}

/// Reverse the byte order of a 64-bit value.
#[inline]
pub const fn swap64(value: u64) -> u64 {
    value.swap_bytes()
}

/// Byte order declared by a file for its order-sensitive fields.
///
/// The numeric flag values are part of the format: `0` is little-endian,
/// `1` is big-endian. A file created on a little-endian host therefore
/// carries flag `0` and needs no swapping there, while a flag of `1` means
/// the fields are stored swapped relative to a little-endian host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Endian {
    /// Least significant byte first (flag `0`)
    Little,
    /// Most significant byte first (flag `1`)
    Big,
}

impl Endian {
    /// Byte order of the host this code runs on.
    pub const fn native() -> Self {
        if cfg!(target_endian = "little") {
            Endian::Little
        } else {
            Endian::Big
        }
    }

    /// Parse a flag value. Returns `None` for anything other than 0 or 1.
    pub fn from_flag(flag: u8) -> Option<Self> {
        match flag {
            0 => Some(Endian::Little),
            1 => Some(Endian::Big),
            _ => None,
        }
    }

    /// Flag value stored for this order.
    pub const fn flag(self) -> u8 {
        match self {
            Endian::Little => 0,
            Endian::Big => 1,
        }
    }

    /// The other byte order.
    pub const fn opposite(self) -> Self {
        match self {
            Endian::Little => Endian::Big,
            Endian::Big => Endian::Little,
        }
    }

    /// Whether fields in this order must be swapped to reach host order.
    #[inline]
    pub fn needs_swap(self) -> bool {
        self != Self::native()
    }

    /// Convert a 16-bit field between host order and this order.
    ///
    /// The conversion is its own inverse, so the same call serves both
    /// encoding and decoding.
    #[inline]
    pub fn normalize16(self, value: u16) -> u16 {
        if self.needs_swap() {
            swap16(value)
        } else {
            value
        }
    }

    /// Convert a 32-bit field between host order and this order.
    #[inline]
    pub fn normalize32(self, value: u32) -> u32 {
        if self.needs_swap() {
            swap32(value)
        } else {
            value
        }
    }

    /// Convert a 64-bit field between host order and this order.
    #[inline]
    pub fn normalize64(self, value: u64) -> u64 {
        if self.needs_swap() {
            swap64(value)
        } else {
            value
        }
    }
}

impl Default for Endian {
    fn default() -> Self {
        Self::native()
    }
}
