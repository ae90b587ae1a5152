//! High-level interface for the DS1881 dual digital potentiometer.
//!
//! [`Ds1881`] keeps a shadow copy of the chip's three registers so that
//! reads never touch the bus, validates wiper indices, clamps values to
//! the active span, and holds wiper writes back while the device is
//! disabled.

use core::fmt;

use embedded_hal_async::i2c::I2c;

use crate::driver::BusDriver;
use crate::error::{Advisory, PotError, SnapshotError};
use crate::flags::Flags;
use crate::registers::{
    encode_write, CONTROL_NV_WRITE, CONTROL_RANGE_33, CONTROL_ZEROCROSS, MAX_VALUE_33,
    MAX_VALUE_63, REGISTER_COUNT, REG_CONTROL, REG_WIPER0, REG_WIPER1, WIPER_COUNT, WIPER_MASK,
};
use crate::snapshot::Snapshot;

/// Wiper span, shared by both channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WiperRange {
    /// 63-step span, wiper values 0–63.
    Steps63,
    /// 33-step span, wiper values 0–32.
    Steps33,
}

impl WiperRange {
    /// Highest wiper value accepted in this span.
    pub const fn max_value(self) -> u8 {
        match self {
            WiperRange::Steps63 => MAX_VALUE_63,
            WiperRange::Steps33 => MAX_VALUE_33,
        }
    }

    /// Number of steps the span is named after (63 or 33).
    pub const fn steps(self) -> u8 {
        match self {
            WiperRange::Steps63 => 63,
            WiperRange::Steps33 => 33,
        }
    }
}

/// Where a [`Ds1881`] is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeviceState {
    /// Built with [`Ds1881::new`], no bus attached yet.
    Unbound,
    /// A bus is attached but the register read has not succeeded.
    BoundUninitialized,
    /// Registers read; wiper writes go to the hardware.
    InitializedEnabled,
    /// Registers read; wiper writes only update the shadow values.
    InitializedDisabled,
    /// Built from a snapshot and not yet initialized against a bus.
    ReconstructedFromSnapshot,
}

/// Outcome of a successful wiper write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Applied {
    /// Value actually stored, after clamping.
    pub value: u8,
    /// Set when the requested value had to be clamped.
    pub advisory: Option<Advisory>,
}

/// Driver for one DS1881 chip.
///
/// Construct with [`new`](Self::new) for a live device or
/// [`from_blob`](Self::from_blob) to restore a snapshot, then attach a bus
/// with [`init`](Self::init).
///
/// Every bus operation holds `&mut self` until the transfer completes and
/// nothing is retried. The driver does no locking of its own: callers
/// sharing one instance between tasks must wrap it in a mutex.
///
/// # Example
///
/// ```no_run
/// use ds1881_driver::{address_from_pins, Ds1881, WiperRange};
///
/// # async fn example(mut i2c: impl embedded_hal_async::i2c::I2c) {
/// let mut pot = Ds1881::new(address_from_pins(0));
/// pot.init(&mut i2c).await.unwrap();
///
/// pot.set_range(WiperRange::Steps33).await.unwrap();
/// let applied = pot.set_value(0, 40).await.unwrap();
/// assert_eq!(applied.value, 32);
/// # }
/// ```
pub struct Ds1881<I2C> {
    address: u8,
    flags: Flags,
    /// Wiper values requested while disabled.
    shadow: [u8; WIPER_COUNT],
    /// Last known register bytes as the chip reports them.
    registers: [u8; REGISTER_COUNT],
    bus: Option<BusDriver<I2C>>,
}

impl<I2C> Ds1881<I2C> {
    /// Create a driver for the chip at `address`.
    ///
    /// No I2C traffic is generated. You **must** call [`init()`](Self::init)
    /// before any hardware operation.
    pub fn new(address: u8) -> Self {
        Self {
            address,
            flags: Flags::default(),
            shadow: [0; WIPER_COUNT],
            registers: [0; REGISTER_COUNT],
            bus: None,
        }
    }

    /// Rebuild a driver from a snapshot written by
    /// [`serialize()`](Self::serialize).
    ///
    /// The flags and shadow wiper values come from the snapshot. The live
    /// registers stay zeroed until [`init()`](Self::init) reads them, and
    /// if the snapshot was taken while enabled, `init()` writes the saved
    /// wiper values back to the chip.
    ///
    /// # Errors
    /// Any [`SnapshotError`] from validating `blob`.
    pub fn from_blob(address: u8, blob: &[u8]) -> Result<Self, SnapshotError> {
        let mut pot = Self::new(address);
        pot.unserialize(blob)?;
        pot.flags.from_blob = true;
        Ok(pot)
    }

    // -----------------------------------------------------------------------
    // Pure accessors
    // -----------------------------------------------------------------------

    /// 7-bit I2C address.
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Current wiper value of `pot` from the shadowed register.
    ///
    /// Returns 0 for any index other than 0 or 1.
    pub fn value(&self, pot: u8) -> u8 {
        match self.registers.get(usize::from(pot)) {
            Some(reg) if usize::from(pot) < WIPER_COUNT => reg & WIPER_MASK,
            _ => 0,
        }
    }

    /// Value held for `pot` while disabled. Returns 0 for an invalid index.
    pub fn shadow_value(&self, pot: u8) -> u8 {
        self.shadow.get(usize::from(pot)).copied().unwrap_or(0)
    }

    /// Shadowed register bytes `[wiper 0, wiper 1, control]`.
    pub fn registers(&self) -> [u8; REGISTER_COUNT] {
        self.registers
    }

    /// Active wiper span.
    pub fn range(&self) -> WiperRange {
        if self.registers[REG_CONTROL] & CONTROL_RANGE_33 != 0 {
            WiperRange::Steps33
        } else {
            WiperRange::Steps63
        }
    }

    /// Whether wiper moves wait for a zero crossing.
    pub fn zerocross_wait(&self) -> bool {
        self.registers[REG_CONTROL] & CONTROL_ZEROCROSS != 0
    }

    /// Whether wiper writes reach the hardware.
    pub fn enabled(&self) -> bool {
        self.flags.enabled
    }

    /// Whether the registers have been read from the chip.
    pub fn initialized(&self) -> bool {
        self.flags.initialized
    }

    /// Whether this driver was rebuilt from a snapshot.
    pub fn is_from_blob(&self) -> bool {
        self.flags.from_blob
    }

    /// All driver flags.
    pub fn flags(&self) -> Flags {
        self.flags
    }

    /// Lifecycle state.
    pub fn state(&self) -> DeviceState {
        match (self.flags.initialized, self.flags.enabled) {
            (true, true) => DeviceState::InitializedEnabled,
            (true, false) => DeviceState::InitializedDisabled,
            (false, _) if self.flags.from_blob => DeviceState::ReconstructedFromSnapshot,
            (false, _) if self.bus.is_some() => DeviceState::BoundUninitialized,
            (false, _) => DeviceState::Unbound,
        }
    }

    // -----------------------------------------------------------------------
    // Caller policy flags (persisted, no hardware effect)
    // -----------------------------------------------------------------------

    /// Mark whether wiper state should be kept across restarts.
    pub fn set_preserve_state(&mut self, preserve: bool) {
        self.flags.preserve_state = preserve;
    }

    /// Set the caller-level mute marker.
    pub fn set_muted(&mut self, muted: bool) {
        self.flags.muted = muted;
    }

    /// Set the caller-level unmute-on-change policy.
    pub fn set_unmute_on_change(&mut self, unmute: bool) {
        self.flags.unmute_on_change = unmute;
    }

    // -----------------------------------------------------------------------
    // Snapshots
    // -----------------------------------------------------------------------

    /// Write a 6-byte snapshot of the persisted flags and wiper values
    /// into `buf`.
    ///
    /// An initialized, enabled driver saves the live wiper values; otherwise
    /// the shadow values are saved.
    ///
    /// Returns the number of bytes written: 6, or 0 if `buf` is too short.
    pub fn serialize(&self, buf: &mut [u8]) -> usize {
        let shadow = if self.flags.initialized && self.flags.enabled {
            [self.value(0), self.value(1)]
        } else {
            self.shadow
        };
        Snapshot {
            flags: self.flags,
            shadow,
        }
        .encode(buf)
    }

    /// Load persisted flags and shadow values from a snapshot.
    ///
    /// Runtime flags and the live registers are not touched. On error
    /// nothing is changed.
    ///
    /// # Errors
    /// * [`SnapshotError::TooShort`] if `buf` holds fewer than 6 bytes
    /// * [`SnapshotError::Version`] if the version byte is not 1
    /// * [`SnapshotError::Length`] if the length byte is not 6
    pub fn unserialize(&mut self, buf: &[u8]) -> Result<(), SnapshotError> {
        let snapshot = match Snapshot::decode(buf) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("DS1881 {:#x}: rejected snapshot: {}", self.address, e);
                return Err(e);
            }
        };
        self.flags.adopt_persisted(snapshot.flags);
        self.shadow = snapshot.shadow;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Diagnostics
    // -----------------------------------------------------------------------

    /// Render the driver state as text.
    pub fn print_debug<W: fmt::Write>(&self, out: &mut W) -> fmt::Result {
        writeln!(out, "-- DS1881 @ 0x{:02x}", self.address)?;
        writeln!(out, "\tflags:       0x{:02x}", self.flags.bits())?;
        writeln!(out, "\tinitialized: {}", self.flags.initialized)?;
        writeln!(out, "\tenabled:     {}", self.flags.enabled)?;
        writeln!(out, "\tfrom blob:   {}", self.flags.from_blob)?;
        for pot in 0..WIPER_COUNT as u8 {
            writeln!(
                out,
                "\twiper {}:     {} (shadow {})",
                pot,
                self.value(pot),
                self.shadow_value(pot)
            )?;
        }
        writeln!(out, "\tcontrol:     0x{:02x}", self.registers[REG_CONTROL])?;
        writeln!(
            out,
            "\trange:       {} steps (max {})",
            self.range().steps(),
            self.range().max_value()
        )?;
        writeln!(out, "\tzero-cross:  {}", self.zerocross_wait())
    }

    /// Clamp a requested wiper value to the active span.
    fn clamp(&self, value: u8) -> Applied {
        let max = self.range().max_value();
        if value > max {
            Applied {
                value: max,
                advisory: Some(Advisory::PeggedMax),
            }
        } else {
            Applied {
                value,
                advisory: None,
            }
        }
    }
}

impl<I2C> Ds1881<I2C>
where
    I2C: I2c,
{
    // -----------------------------------------------------------------------
    // Bus binding
    // -----------------------------------------------------------------------

    /// Attach `i2c` and read the chip's registers.
    ///
    /// On the first successful read of a live driver, the driver becomes
    /// enabled and its shadow values are seeded from the chip. A driver
    /// rebuilt from an enabled snapshot instead writes its saved wiper
    /// values to the chip.
    ///
    /// # Errors
    /// * [`PotError::Absent`] if the chip does not acknowledge its address
    /// * [`PotError::Bus`] on any other communication failure
    pub async fn init(&mut self, i2c: I2C) -> Result<(), PotError<I2C::Error>> {
        self.bus = Some(BusDriver::new(i2c, self.address));
        self.reinit().await
    }

    /// [`init()`](Self::init) again with the bus attached earlier.
    ///
    /// # Errors
    /// * [`PotError::Absent`] if no bus was ever attached, or the chip
    ///   does not acknowledge its address
    /// * [`PotError::Bus`] on any other communication failure
    pub async fn reinit(&mut self) -> Result<(), PotError<I2C::Error>> {
        let first = !self.flags.initialized;
        if let Err(e) = self.read_registers().await {
            #[cfg(feature = "defmt")]
            defmt::warn!("DS1881 {:#x}: init failed: {}", self.address, e.code());
            return Err(e);
        }
        self.flags.initialized = true;

        if first {
            if self.flags.from_blob {
                if self.flags.enabled {
                    if let Err(e) = self.flush_shadow().await {
                        // Restore again on the next attempt.
                        self.flags.initialized = false;
                        #[cfg(feature = "defmt")]
                        defmt::warn!("DS1881 {:#x}: restore failed: {}", self.address, e.code());
                        return Err(e);
                    }
                }
            } else {
                self.flags.enabled = true;
                self.shadow = [self.value(0), self.value(1)];
            }
        }

        #[cfg(feature = "defmt")]
        defmt::debug!(
            "DS1881 {:#x}: initialized, wipers {} {}, control {:#x}",
            self.address,
            self.value(0),
            self.value(1),
            self.registers[REG_CONTROL]
        );
        Ok(())
    }

    /// Re-read all three registers from the chip, replacing the shadowed
    /// copies.
    ///
    /// On a bound driver that is not yet initialized this is a full
    /// [`reinit()`](Self::reinit).
    ///
    /// # Errors
    /// * [`PotError::Absent`] if no bus is attached or the chip is gone
    /// * [`PotError::Bus`] on communication failure
    pub async fn refresh(&mut self) -> Result<(), PotError<I2C::Error>> {
        if !self.flags.initialized {
            return self.reinit().await;
        }
        self.read_registers().await
    }

    // -----------------------------------------------------------------------
    // Wiper writes
    // -----------------------------------------------------------------------

    /// Set wiper `pot` (0 or 1) to `value`.
    ///
    /// Values above the active span are pegged at its maximum, which is
    /// reported through [`Applied::advisory`]. While disabled, only the
    /// shadow value changes; it reaches the chip on
    /// [`enable(true)`](Self::enable).
    ///
    /// # Errors
    /// * [`PotError::InvalidPot`] if `pot >= 2`
    /// * [`PotError::Absent`] if a live driver is not initialized yet, or
    ///   the chip is gone
    /// * [`PotError::Bus`] on communication failure
    pub async fn set_value(
        &mut self,
        pot: u8,
        value: u8,
    ) -> Result<Applied, PotError<I2C::Error>> {
        let pot = usize::from(pot);
        if pot >= WIPER_COUNT {
            return Err(PotError::InvalidPot);
        }

        let applied = self.clamp(value);
        self.apply(pot, applied.value).await?;
        Ok(applied)
    }

    /// Set both wipers to `value`, wiper 0 first.
    ///
    /// # Errors
    /// The first error from either write; see [`set_value()`](Self::set_value).
    pub async fn set_both(&mut self, value: u8) -> Result<Applied, PotError<I2C::Error>> {
        let applied = self.clamp(value);
        self.apply(REG_WIPER0, applied.value).await?;
        self.apply(REG_WIPER1, applied.value).await?;
        Ok(applied)
    }

    /// Enable or disable wiper writes.
    ///
    /// Enabling writes every shadow value that differs from its register.
    /// Disabling captures the current wiper values as the shadow values
    /// and leaves the chip alone.
    ///
    /// # Errors
    /// * [`PotError::Absent`] if enabling before initialization, or the chip is gone
    /// * [`PotError::Bus`] on communication failure. The driver stays
    ///   disabled; wipers that were already written keep their new values.
    pub async fn enable(&mut self, on: bool) -> Result<(), PotError<I2C::Error>> {
        if on == self.flags.enabled {
            return Ok(());
        }

        if on {
            if !self.flags.initialized {
                return Err(PotError::Absent);
            }
            self.flush_shadow().await?;
        } else {
            self.shadow = [self.value(0), self.value(1)];
        }
        self.flags.enabled = on;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Control register
    // -----------------------------------------------------------------------

    /// Select the wiper span.
    ///
    /// Stored wiper values are not rescaled: after switching to
    /// [`WiperRange::Steps33`] a wiper can read above 32 until it is
    /// written again.
    ///
    /// # Errors
    /// * [`PotError::Absent`] if not initialized or the chip is gone
    /// * [`PotError::Bus`] on communication failure
    pub async fn set_range(&mut self, range: WiperRange) -> Result<(), PotError<I2C::Error>> {
        let control = match range {
            WiperRange::Steps63 => self.registers[REG_CONTROL] & !CONTROL_RANGE_33,
            WiperRange::Steps33 => self.registers[REG_CONTROL] | CONTROL_RANGE_33,
        };
        self.write_control(control).await
    }

    /// Enable or disable waiting for a zero crossing before wiper moves.
    ///
    /// # Errors
    /// * [`PotError::Absent`] if not initialized or the chip is gone
    /// * [`PotError::Bus`] on communication failure
    pub async fn set_zerocross_wait(&mut self, wait: bool) -> Result<(), PotError<I2C::Error>> {
        let control = if wait {
            self.registers[REG_CONTROL] | CONTROL_ZEROCROSS
        } else {
            self.registers[REG_CONTROL] & !CONTROL_ZEROCROSS
        };
        self.write_control(control).await
    }

    /// Commit the current wiper positions to the chip's EEPROM.
    ///
    /// Switches the chip to nonvolatile writes, rewrites each wiper and
    /// waits out the EEPROM cycle after each, then switches back. If a
    /// transfer fails part way the chip may be left in nonvolatile mode;
    /// [`refresh()`](Self::refresh) shows the real control byte.
    ///
    /// # Errors
    /// * [`PotError::Absent`] if not initialized or the chip is gone
    /// * [`PotError::Bus`] on communication failure
    pub async fn store_wipers(&mut self) -> Result<(), PotError<I2C::Error>> {
        let control = self.registers[REG_CONTROL];
        let wipers = [self.value(0), self.value(1)];
        let bus = self.ready_bus()?;

        bus.write_register(REG_CONTROL, control | CONTROL_NV_WRITE).await?;
        for (register, value) in [(REG_WIPER0, wipers[0]), (REG_WIPER1, wipers[1])] {
            bus.write_register(register, value).await?;
            bus.wait_eeprom().await;
        }
        bus.write_register(REG_CONTROL, control & !CONTROL_NV_WRITE).await?;

        #[cfg(feature = "defmt")]
        defmt::info!(
            "DS1881 {:#x}: stored wipers {} {}",
            self.address,
            wipers[0],
            wipers[1]
        );
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    /// Attached bus, or `Absent`.
    fn bus(&mut self) -> Result<&mut BusDriver<I2C>, PotError<I2C::Error>> {
        self.bus.as_mut().ok_or(PotError::Absent)
    }

    /// Attached bus of an initialized driver, or `Absent`.
    fn ready_bus(&mut self) -> Result<&mut BusDriver<I2C>, PotError<I2C::Error>> {
        if !self.flags.initialized {
            return Err(PotError::Absent);
        }
        self.bus()
    }

    async fn read_registers(&mut self) -> Result<(), PotError<I2C::Error>> {
        let registers = self.bus()?.read_registers().await?;
        self.registers = registers;
        Ok(())
    }

    /// Route a clamped wiper value to the chip or the shadow array.
    ///
    /// Only a snapshot driver may queue values before its first read.
    async fn apply(&mut self, pot: usize, value: u8) -> Result<(), PotError<I2C::Error>> {
        if !self.flags.initialized && !self.flags.from_blob {
            return Err(PotError::Absent);
        }
        if self.flags.enabled {
            self.write_wiper(pot, value).await
        } else {
            self.shadow[pot] = value;
            Ok(())
        }
    }

    async fn write_wiper(&mut self, pot: usize, value: u8) -> Result<(), PotError<I2C::Error>> {
        self.ready_bus()?.write_register(pot, value).await?;
        self.registers[pot] = encode_write(pot, value);
        Ok(())
    }

    async fn write_control(&mut self, control: u8) -> Result<(), PotError<I2C::Error>> {
        self.ready_bus()?.write_register(REG_CONTROL, control).await?;
        self.registers[REG_CONTROL] = encode_write(REG_CONTROL, control);
        Ok(())
    }

    /// Write each shadow value that differs from its register, clamped to
    /// the active span.
    async fn flush_shadow(&mut self) -> Result<(), PotError<I2C::Error>> {
        let max = self.range().max_value();
        for pot in [REG_WIPER0, REG_WIPER1] {
            let value = (self.shadow[pot] & WIPER_MASK).min(max);
            if value != self.registers[pot] & WIPER_MASK {
                self.write_wiper(pot, value).await?;
            }
        }
        Ok(())
    }
}
