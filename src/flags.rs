//! Driver state flags.
//!
//! Four flags describe caller policy and survive a snapshot. Two more
//! describe how this particular object came to be and are never written
//! out. [`Flags::persisted_bits`] and [`Flags::from_persisted_bits`] are
//! the only way in or out of the byte form.

/// Bit of `preserve_state` in the persisted byte.
pub const FLAG_PRESERVE_STATE: u8 = 0x01;
/// Bit of `enabled` in the persisted byte.
pub const FLAG_ENABLED: u8 = 0x02;
/// Bit of `muted` in the persisted byte.
pub const FLAG_MUTED: u8 = 0x04;
/// Bit of `unmute_on_change` in the persisted byte.
pub const FLAG_UNMUTE_ON_CHANGE: u8 = 0x08;
/// Bit of `initialized` in the diagnostic byte. Never persisted.
pub const FLAG_INITIALIZED: u8 = 0x10;
/// Bit of `from_blob` in the diagnostic byte. Never persisted.
pub const FLAG_FROM_BLOB: u8 = 0x20;

/// Bits that are written to a snapshot.
pub const PERSISTED_MASK: u8 = 0x0F;

/// Named driver flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Flags {
    /// Caller asked for wiper state to be kept across restarts.
    pub preserve_state: bool,
    /// Writes reach the hardware. When clear they only update the shadow values.
    pub enabled: bool,
    /// Caller-level mute marker.
    pub muted: bool,
    /// Caller-level policy: leave mute when a wiper changes.
    pub unmute_on_change: bool,
    /// All three registers have been read from the device.
    pub initialized: bool,
    /// This object was rebuilt from a snapshot.
    pub from_blob: bool,
}

impl Flags {
    /// Flag byte as stored in a snapshot (low four bits only).
    pub const fn persisted_bits(&self) -> u8 {
        let mut bits = 0;
        if self.preserve_state {
            bits |= FLAG_PRESERVE_STATE;
        }
        if self.enabled {
            bits |= FLAG_ENABLED;
        }
        if self.muted {
            bits |= FLAG_MUTED;
        }
        if self.unmute_on_change {
            bits |= FLAG_UNMUTE_ON_CHANGE;
        }
        bits
    }

    /// Full flag byte including runtime-only bits. Diagnostic use only.
    pub const fn bits(&self) -> u8 {
        let mut bits = self.persisted_bits();
        if self.initialized {
            bits |= FLAG_INITIALIZED;
        }
        if self.from_blob {
            bits |= FLAG_FROM_BLOB;
        }
        bits
    }

    /// Persisted flags decoded from a snapshot byte. Runtime-only bits
    /// in `bits` are ignored and come back cleared.
    pub const fn from_persisted_bits(bits: u8) -> Self {
        Self {
            preserve_state: bits & FLAG_PRESERVE_STATE != 0,
            enabled: bits & FLAG_ENABLED != 0,
            muted: bits & FLAG_MUTED != 0,
            unmute_on_change: bits & FLAG_UNMUTE_ON_CHANGE != 0,
            initialized: false,
            from_blob: false,
        }
    }

    /// Replace the persisted flags with `other`'s, keeping this set's
    /// runtime-only flags.
    pub fn adopt_persisted(&mut self, other: Flags) {
        self.preserve_state = other.preserve_state;
        self.enabled = other.enabled;
        self.muted = other.muted;
        self.unmute_on_change = other.unmute_on_change;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runtime_flags_never_persist() {
        let flags = Flags {
            initialized: true,
            from_blob: true,
            ..Flags::default()
        };
        assert_eq!(flags.persisted_bits(), 0);
        assert_eq!(flags.bits(), FLAG_INITIALIZED | FLAG_FROM_BLOB);
    }

    #[test]
    fn persisted_bits_cover_low_nibble() {
        let flags = Flags {
            preserve_state: true,
            enabled: true,
            muted: true,
            unmute_on_change: true,
            initialized: true,
            from_blob: false,
        };
        assert_eq!(flags.persisted_bits(), PERSISTED_MASK);
    }

    #[test]
    fn decoding_ignores_runtime_bits() {
        let flags = Flags::from_persisted_bits(0xFF);
        assert!(flags.preserve_state && flags.enabled && flags.muted && flags.unmute_on_change);
        assert!(!flags.initialized);
        assert!(!flags.from_blob);
    }

    #[test]
    fn decode_matches_encode_for_every_nibble() {
        for bits in 0..=PERSISTED_MASK {
            assert_eq!(Flags::from_persisted_bits(bits).persisted_bits(), bits);
        }
    }

    #[test]
    fn adopt_keeps_runtime_flags() {
        let mut flags = Flags {
            enabled: true,
            initialized: true,
            ..Flags::default()
        };
        flags.adopt_persisted(Flags::from_persisted_bits(FLAG_MUTED));
        assert!(flags.muted);
        assert!(!flags.enabled);
        assert!(flags.initialized);
    }
}
