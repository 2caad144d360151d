#![allow(unused_imports)]
#![allow(dead_code)]

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{ErrorKind, ErrorType, I2c, Operation};
use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTransaction};
use max1726x_rs::{registers::Register, BatteryCharacteristics, Max1726x};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

pub const MAX1726X_ADDR: u8 = 0x36;

/// A mock I2C device that can be programmed with expected transactions.
#[derive(Clone)]
pub struct MockI2c {
    mock: Rc<RefCell<I2cMock>>,
}

impl MockI2c {
    /// Creates a new `MockI2c` with the given expected transactions.
    pub fn new(transactions: &[I2cTransaction]) -> Self {
        Self {
            mock: Rc::new(RefCell::new(I2cMock::new(transactions))),
        }
    }

    /// Verifies that all expected transactions occurred.
    pub fn done(self) {
        self.mock.borrow_mut().done();
    }
}

impl ErrorType for MockI2c {
    type Error = ErrorKind;
}

impl I2c for MockI2c {
    fn write(&mut self, address: u8, bytes: &[u8]) -> Result<(), Self::Error> {
        self.mock.borrow_mut().write(address, bytes)
    }

    fn read(&mut self, address: u8, bytes: &mut [u8]) -> Result<(), Self::Error> {
        self.mock.borrow_mut().read(address, bytes)
    }

    fn write_read(
        &mut self,
        address: u8,
        bytes: &[u8],
        buffer: &mut [u8],
    ) -> Result<(), Self::Error> {
        self.mock.borrow_mut().write_read(address, bytes, buffer)
    }

    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        self.mock.borrow_mut().transaction(address, operations)
    }
}

/// Delay provider that only records how long the driver asked to wait.
#[derive(Clone, Default)]
pub struct MockDelay {
    elapsed_ns: Rc<Cell<u64>>,
}

impl MockDelay {
    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ns.get() / 1_000_000
    }
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.elapsed_ns.set(self.elapsed_ns.get() + u64::from(ns));
    }
}

/// Helper function to create a driver for testing.
pub fn create_driver(
    transactions: &[I2cTransaction],
    characteristics: BatteryCharacteristics,
) -> (Max1726x<MockI2c, MockDelay>, MockI2c, MockDelay) {
    let i2c_mock = MockI2c::new(transactions);
    let delay = MockDelay::default();
    let driver = Max1726x::new(i2c_mock.clone(), delay.clone(), characteristics);
    (driver, i2c_mock, delay)
}

/// Expected read of a 16-bit register, LSB first on the wire.
pub fn read(reg: Register, value: u16) -> I2cTransaction {
    I2cTransaction::write_read(
        MAX1726X_ADDR,
        vec![reg as u8],
        value.to_le_bytes().to_vec(),
    )
}

/// Expected write of a 16-bit register, LSB first on the wire.
pub fn write(reg: Register, value: u16) -> I2cTransaction {
    let [lsb, msb] = value.to_le_bytes();
    I2cTransaction::write(MAX1726X_ADDR, vec![reg as u8, lsb, msb])
}

/// Status read reporting a connected battery (Bst = 0).
pub fn battery_present() -> I2cTransaction {
    read(Register::Status, 0x0000)
}

/// Status read reporting no battery (Bst = 1).
pub fn battery_absent() -> I2cTransaction {
    read(Register::Status, 0x0008)
}
