#[cfg(feature = "defmt")]
use defmt::Format;

use embedded_hal::i2c::{ErrorKind, NoAcknowledgeSource};

/// The bit a bounded poll was waiting on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(Format))]
pub enum WaitTarget {
    /// FStat.DNR never cleared after power-up.
    DataReady,
    /// ModelCfg.Refresh was never acknowledged by the EZ algorithm.
    ModelRefresh,
}

/// Coarse classification of a bus failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(Format))]
pub enum TransportFault {
    /// The device did not acknowledge its address.
    AddressNack,
    /// The device did not acknowledge a data byte.
    DataNack,
    /// Timeout, arbitration loss or anything else.
    Other,
}

/// Represents potential errors when interacting with the MAX1726x chip.
#[derive(Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(Format))]
pub enum Error<E> {
    /// An error occurred during I2C communication.
    I2c(E),
    /// A bounded poll ran out of time.
    Timeout(WaitTarget),
    /// A bit range outside 0..=15, or with start > end. Nothing was sent on the bus.
    InvalidBitRange { start: u8, end: u8 },
}

impl<E: embedded_hal::i2c::Error> Error<E> {
    /// Classifies the bus failure, or `None` if this is not a bus error.
    pub fn transport_fault(&self) -> Option<TransportFault> {
        match self {
            Error::I2c(e) => Some(match e.kind() {
                ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address) => {
                    TransportFault::AddressNack
                }
                ErrorKind::NoAcknowledge(NoAcknowledgeSource::Data) => TransportFault::DataNack,
                _ => TransportFault::Other,
            }),
            _ => None,
        }
    }
}
