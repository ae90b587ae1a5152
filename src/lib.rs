//! Async driver for the DS1881 dual digital potentiometer.
//!
//! This crate provides an `embedded-hal-async` I2C driver for the Maxim
//! DS1881: two 6-bit audio-taper wipers that share one control register
//! (span select and zero-cross wait).
//!
//! # Architecture
//!
//! The crate is split into two layers:
//!
//! - **`driver`** (crate-private) — The chip's single-byte register writes,
//!   its three-byte register read, and the EEPROM write-cycle wait.
//! - **[`Ds1881`]** (public) — Shadowed register model with wiper
//!   validation, span clamping, enable/disable with held-back writes, and
//!   6-byte state snapshots.
//!
//! # Quick start
//!
//! ```ignore
//! use ds1881_driver::{Ds1881, BASE_ADDRESS};
//!
//! // Construct, then bind any `embedded-hal-async` I2C implementation
//! let mut pot = Ds1881::new(BASE_ADDRESS);
//! pot.init(&mut i2c).await?;
//!
//! // Reads come from the shadow registers, no bus traffic
//! let level = pot.value(0);
//!
//! // Snapshot now, restore later without re-probing
//! let mut blob = [0u8; 6];
//! pot.serialize(&mut blob);
//! let restored = Ds1881::from_blob(BASE_ADDRESS, &blob)?;
//! ```
//!
//! # Features
//!
//! - **`defmt`** — Enable [`defmt::Format`] implementations on public
//!   types and driver logging.

#![no_std]

pub use ds1881::{Applied, DeviceState, Ds1881, WiperRange};
pub use error::{Advisory, ErrorCode, PotError, SnapshotError};
pub use flags::{Flags, PERSISTED_MASK};
pub use registers::{address_from_pins, BASE_ADDRESS, EEPROM_WRITE_MS};
pub use snapshot::{SERIALIZE_SIZE, SERIALIZE_VERSION};

mod driver;
mod ds1881;
mod error;
mod flags;
pub mod registers;
mod snapshot;
