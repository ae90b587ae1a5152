//! Low-level DS1881 bus primitives.
//!
//! Implements the single-byte register write and the three-byte register
//! read, plus the EEPROM write-cycle wait.
//!
//! This module is crate-private — consumers interact with [`Ds1881`]
//! in `ds1881.rs` instead.
//!
//! [`Ds1881`]: crate::Ds1881

use embassy_time::{Duration, Timer};
use embedded_hal_async::i2c::I2c;

use crate::error::PotError;
use crate::registers::{encode_write, EEPROM_WRITE_MS, REGISTER_COUNT};

/// Low-level DS1881 bus driver.
///
/// Owns the I2C handle given to [`Ds1881::init`](crate::Ds1881::init).
/// Pass `&mut bus` there to keep ownership with the caller.
pub(crate) struct BusDriver<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C> BusDriver<I2C>
where
    I2C: I2c,
{
    /// Create a new bus driver.
    ///
    /// # Arguments
    /// * `i2c` — I2C handle
    /// * `address` — 7-bit I2C device address
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self { i2c, address }
    }

    /// Read all three registers: `[wiper 0, wiper 1, control]`.
    ///
    /// The chip has no register pointer, so this is a bare read with no
    /// preceding write phase.
    pub async fn read_registers(
        &mut self,
    ) -> Result<[u8; REGISTER_COUNT], PotError<I2C::Error>> {
        let mut buf = [0u8; REGISTER_COUNT];
        self.i2c.read(self.address, &mut buf).await?;
        Ok(buf)
    }

    /// Write one register. Only the low six bits of `payload` reach the chip.
    pub async fn write_register(
        &mut self,
        register: usize,
        payload: u8,
    ) -> Result<(), PotError<I2C::Error>> {
        self.i2c
            .write(self.address, &[encode_write(register, payload)])
            .await?;
        Ok(())
    }

    /// Block until the EEPROM write cycle started by the last wiper
    /// write has finished.
    pub async fn wait_eeprom(&mut self) {
        Timer::after(Duration::from_millis(EEPROM_WRITE_MS)).await;
    }
}
