//! Fixed 6-byte state snapshot.
//!
//! ```text
//! [0] version   [1] length   [2] flags & 0x0F   [3] reserved   [4] wiper 0   [5] wiper 1
//! ```

use crate::error::SnapshotError;
use crate::flags::{Flags, PERSISTED_MASK};
use crate::registers::WIPER_MASK;

/// Snapshot format version written by this driver.
pub const SERIALIZE_VERSION: u8 = 0x01;

/// Size of a snapshot in bytes.
pub const SERIALIZE_SIZE: usize = 6;

/// Decoded snapshot contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub(crate) struct Snapshot {
    pub flags: Flags,
    pub shadow: [u8; 2],
}

impl Snapshot {
    /// Write the snapshot into `buf`. Returns the number of bytes written,
    /// or 0 when `buf` cannot hold a full snapshot.
    pub fn encode(&self, buf: &mut [u8]) -> usize {
        let Some(out) = buf.get_mut(..SERIALIZE_SIZE) else {
            return 0;
        };
        out.copy_from_slice(&[
            SERIALIZE_VERSION,
            SERIALIZE_SIZE as u8,
            self.flags.persisted_bits() & PERSISTED_MASK,
            0,
            self.shadow[0],
            self.shadow[1],
        ]);
        SERIALIZE_SIZE
    }

    /// Validate and decode a snapshot. Bytes past the snapshot are ignored.
    pub fn decode(buf: &[u8]) -> Result<Self, SnapshotError> {
        let Some(&[version, length, flags, _reserved, w0, w1]) = buf.get(..SERIALIZE_SIZE) else {
            return Err(SnapshotError::TooShort);
        };
        if version != SERIALIZE_VERSION {
            return Err(SnapshotError::Version(version));
        }
        if usize::from(length) != SERIALIZE_SIZE {
            return Err(SnapshotError::Length(length));
        }
        Ok(Self {
            flags: Flags::from_persisted_bits(flags),
            shadow: [w0 & WIPER_MASK, w1 & WIPER_MASK],
        })
    }
}
