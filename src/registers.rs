//! Register layout and protocol constants for the DS1881.
//!
//! The DS1881 has no register pointer. Every write is a single byte whose
//! top two bits select the target register and whose low six bits carry
//! the payload. A read always returns all three registers in order:
//! `[wiper 0, wiper 1, control]`.

// ---------------------------------------------------------------------------
// Addressing
// ---------------------------------------------------------------------------

/// Base 7-bit I2C address. Address pins A2..A0 fill the low three bits.
pub const BASE_ADDRESS: u8 = 0x28;

/// Build the 7-bit device address from the state of pins A2..A0.
///
/// Only the low three bits of `pins` are used.
///
/// ```
/// assert_eq!(ds1881_driver::address_from_pins(0b101), 0x2D);
/// ```
pub const fn address_from_pins(pins: u8) -> u8 {
    BASE_ADDRESS | (pins & 0x07)
}

// ---------------------------------------------------------------------------
// Register select (bits 7:6 of every written byte)
// ---------------------------------------------------------------------------

/// Register index of wiper 0.
pub const REG_WIPER0: usize = 0;

/// Register index of wiper 1.
pub const REG_WIPER1: usize = 1;

/// Register index of the control register.
pub const REG_CONTROL: usize = 2;

/// Number of registers returned by a full read.
pub const REGISTER_COUNT: usize = 3;

/// Number of wiper channels on the chip.
pub const WIPER_COUNT: usize = 2;

/// Shift applied to a register index to form the select bits.
pub const SELECT_SHIFT: u8 = 6;

/// Payload bits of a written byte.
pub const PAYLOAD_MASK: u8 = 0x3F;

/// Significant bits of a wiper register.
pub const WIPER_MASK: u8 = 0x3F;

// ---------------------------------------------------------------------------
// Control register bits
// ---------------------------------------------------------------------------

/// Range select. Clear: 63-step span. Set: 33-step span.
pub const CONTROL_RANGE_33: u8 = 0x01;

/// Wait for a zero crossing before moving a wiper.
pub const CONTROL_ZEROCROSS: u8 = 0x02;

/// Route wiper writes to EEPROM as well as the volatile wiper.
pub const CONTROL_NV_WRITE: u8 = 0x04;

// ---------------------------------------------------------------------------
// Wiper spans
// ---------------------------------------------------------------------------

/// Highest wiper value in the 63-step span.
pub const MAX_VALUE_63: u8 = 63;

/// Highest wiper value in the 33-step span.
pub const MAX_VALUE_33: u8 = 32;

// ---------------------------------------------------------------------------
// Timing
// ---------------------------------------------------------------------------

/// EEPROM write cycle in milliseconds. The chip NACKs while it is busy.
pub const EEPROM_WRITE_MS: u64 = 20;

/// Encode a register write as the single byte the chip expects.
pub(crate) const fn encode_write(register: usize, payload: u8) -> u8 {
    ((register as u8) << SELECT_SHIFT) | (payload & PAYLOAD_MASK)
}
