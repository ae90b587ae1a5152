//! Error and status types for the DS1881 driver.
//!
//! Hard failures are [`PotError`]. Successful wiper writes that had to be
//! clamped carry an [`Advisory`] instead of failing. Both map onto the
//! numeric [`ErrorCode`] table for callers that log or transmit status
//! codes.

use core::fmt;

use embedded_hal_async::i2c::{Error as I2cError, ErrorKind, NoAcknowledgeSource};

/// Numeric status codes.
///
/// Non-negative values are successes (possibly with an advisory), negative
/// values are failures. `DeviceDisabled`, `AlreadyAtMax` and `AlreadyAtMin`
/// are part of the code table but no driver operation produces them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(i8)]
pub enum ErrorCode {
    /// A wiper was set while the device is disabled.
    DeviceDisabled = 3,
    /// The write succeeded but the wiper was pegged at its highest position.
    PeggedMax = 2,
    /// The write succeeded but the wiper was pegged at its lowest position.
    PeggedMin = 1,
    /// No error.
    NoError = 0,
    /// The device did not acknowledge its address.
    Absent = -1,
    /// The I2C transfer failed.
    Bus = -2,
    /// The wiper is already at its maximum.
    AlreadyAtMax = -3,
    /// The wiper is already at its minimum.
    AlreadyAtMin = -4,
    /// There is no wiper with that index.
    InvalidPot = -5,
}

impl ErrorCode {
    /// Raw numeric value.
    pub const fn as_i8(self) -> i8 {
        self as i8
    }

    /// `true` for codes that mean the operation did not complete.
    pub const fn is_failure(self) -> bool {
        self.as_i8() < 0
    }

    /// Fixed human-readable description of the code.
    pub const fn as_str(self) -> &'static str {
        match self {
            ErrorCode::DeviceDisabled => "DEVICE_DISABLED",
            ErrorCode::PeggedMax => "PEGGED_MAX",
            ErrorCode::PeggedMin => "PEGGED_MIN",
            ErrorCode::NoError => "NO_ERROR",
            ErrorCode::Absent => "ABSENT",
            ErrorCode::Bus => "BUS",
            ErrorCode::AlreadyAtMax => "ALREADY_AT_MAX",
            ErrorCode::AlreadyAtMin => "ALREADY_AT_MIN",
            ErrorCode::InvalidPot => "INVALID_POT",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Non-fatal note attached to a successful wiper write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Advisory {
    /// The requested value was below the span and was raised to 0.
    PeggedMin,
    /// The requested value was above the span and was lowered to its maximum.
    PeggedMax,
}

impl Advisory {
    /// Status code for this advisory.
    pub const fn code(self) -> ErrorCode {
        match self {
            Advisory::PeggedMin => ErrorCode::PeggedMin,
            Advisory::PeggedMax => ErrorCode::PeggedMax,
        }
    }
}

/// Errors that can occur when talking to the potentiometer.
#[derive(Debug)]
pub enum PotError<E> {
    /// No bus is bound, or the device did not acknowledge its address.
    Absent,

    /// Underlying I2C bus error.
    Bus(E),

    /// Wiper index out of valid range (must be 0 or 1).
    InvalidPot,
}

impl<E> PotError<E> {
    /// Status code for this error.
    pub const fn code(&self) -> ErrorCode {
        match self {
            PotError::Absent => ErrorCode::Absent,
            PotError::Bus(_) => ErrorCode::Bus,
            PotError::InvalidPot => ErrorCode::InvalidPot,
        }
    }
}

// Allow `?` on raw I2C results. A NACK on the address byte means nobody is
// listening; every other fault is a bus error.
impl<E: I2cError> From<E> for PotError<E> {
    fn from(error: E) -> Self {
        match error.kind() {
            ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address)
            | ErrorKind::NoAcknowledge(NoAcknowledgeSource::Unknown) => PotError::Absent,
            _ => PotError::Bus(error),
        }
    }
}

impl<E: fmt::Debug> fmt::Display for PotError<E> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PotError::Absent => write!(f, "Potentiometer absent from the bus"),
            PotError::Bus(e) => write!(f, "I2C error: {:?}", e),
            PotError::InvalidPot => write!(f, "Invalid wiper index (must be 0-1)"),
        }
    }
}

#[cfg(feature = "defmt")]
impl<E: defmt::Format> defmt::Format for PotError<E> {
    fn format(&self, f: defmt::Formatter) {
        match self {
            PotError::Absent => defmt::write!(f, "Potentiometer absent"),
            PotError::Bus(e) => defmt::write!(f, "I2C error: {}", e),
            PotError::InvalidPot => defmt::write!(f, "Invalid wiper index"),
        }
    }
}

/// Reasons a snapshot blob is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SnapshotError {
    /// The buffer is shorter than a snapshot.
    TooShort,
    /// The version byte is not one this driver writes.
    Version(u8),
    /// The length byte does not match the snapshot size.
    Length(u8),
}

impl SnapshotError {
    /// Negative status value, for callers that expect a signed result.
    pub const fn code(self) -> i8 {
        match self {
            SnapshotError::TooShort => -1,
            SnapshotError::Version(_) => -2,
            SnapshotError::Length(_) => -3,
        }
    }
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SnapshotError::TooShort => write!(f, "Snapshot buffer too short"),
            SnapshotError::Version(v) => write!(f, "Unsupported snapshot version {}", v),
            SnapshotError::Length(l) => write!(f, "Snapshot length byte {} is wrong", l),
        }
    }
}
