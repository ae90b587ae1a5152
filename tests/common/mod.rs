//! Simulated DS1881 on a fake I2C bus.
//!
//! Behaves like the chip for the transfers the driver issues: single-byte
//! register writes selected by bits 7:6, and a bare read returning all
//! three registers. Faults can be injected per test.

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use embedded_hal_async::i2c::{
    Error, ErrorKind, ErrorType, I2c, NoAcknowledgeSource, Operation,
};

pub const ADDR: u8 = 0x28;

/// Error returned by the fake bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FakeError(pub ErrorKind);

impl Error for FakeError {
    fn kind(&self) -> ErrorKind {
        self.0
    }
}

/// Chip state shared between the test and the driver's bus handle.
#[derive(Debug)]
pub struct Chip {
    pub address: u8,
    pub present: bool,
    /// Raw register bytes as the chip reports them.
    pub regs: [u8; 3],
    /// Wiper values committed to EEPROM.
    pub eeprom: [u8; 2],
    /// Every byte written, in order.
    pub writes: Vec<u8>,
    pub reads: usize,
    /// Fail writes once this many more have succeeded.
    pub fail_writes_after: Option<usize>,
    pub fail_reads: bool,
}

impl Chip {
    pub fn wiper(&self, pot: usize) -> u8 {
        self.regs[pot] & 0x3F
    }

    fn write_byte(&mut self, byte: u8) -> Result<(), FakeError> {
        if let Some(left) = self.fail_writes_after.as_mut() {
            if *left == 0 {
                return Err(FakeError(ErrorKind::Bus));
            }
            *left -= 1;
        }
        self.writes.push(byte);
        match byte >> 6 {
            0 | 1 => {
                let pot = usize::from(byte >> 6);
                self.regs[pot] = byte;
                if self.regs[2] & 0x04 != 0 {
                    self.eeprom[pot] = byte & 0x3F;
                }
            }
            2 => self.regs[2] = byte,
            _ => {}
        }
        Ok(())
    }
}

/// Cloneable bus handle onto one simulated chip.
#[derive(Clone)]
pub struct FakeBus {
    chip: Rc<RefCell<Chip>>,
}

impl FakeBus {
    /// A present chip at [`ADDR`] with the given wiper values and control bits.
    pub fn new(w0: u8, w1: u8, control: u8) -> Self {
        Self {
            chip: Rc::new(RefCell::new(Chip {
                address: ADDR,
                present: true,
                regs: [w0 & 0x3F, 0x40 | (w1 & 0x3F), 0x80 | (control & 0x3F)],
                eeprom: [w0 & 0x3F, w1 & 0x3F],
                writes: Vec::new(),
                reads: 0,
                fail_writes_after: None,
                fail_reads: false,
            })),
        }
    }

    pub fn chip(&self) -> std::cell::RefMut<'_, Chip> {
        self.chip.borrow_mut()
    }

    pub fn writes(&self) -> Vec<u8> {
        self.chip.borrow().writes.clone()
    }
}

impl ErrorType for FakeBus {
    type Error = FakeError;
}

impl I2c for FakeBus {
    async fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        let mut chip = self.chip.borrow_mut();
        if !chip.present || address != chip.address {
            return Err(FakeError(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address)));
        }
        for op in operations {
            match op {
                Operation::Write(bytes) => {
                    for &byte in bytes.iter() {
                        chip.write_byte(byte)?;
                    }
                }
                Operation::Read(buf) => {
                    if chip.fail_reads {
                        return Err(FakeError(ErrorKind::Bus));
                    }
                    chip.reads += 1;
                    let regs = chip.regs;
                    for (dst, src) in buf.iter_mut().zip(regs.iter()) {
                        *dst = *src;
                    }
                }
            }
        }
        Ok(())
    }
}
