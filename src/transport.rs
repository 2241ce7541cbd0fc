//! The accessory transport seam.
//!
//! [`Transport`] abstracts the raw I/O performed against a Controller Pak: reading directory
//! slots, moving entry payloads, deleting, formatting, and probing what is plugged into a port.
//! The on-media layout (block allocation, checksums) is entirely the implementor's concern.
//!
//! Implementations typically bind a hardware SDK or an emulator; the crate's tests run against an
//! in-memory implementation.

use crate::catalog::{Entry, Slot};
use core::{
    fmt,
    fmt::{Display, Formatter},
};

/// A controller port.
///
/// Each port takes at most one accessory, and catalogs for different ports address disjoint
/// hardware.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Controller {
    Port1,
    Port2,
    Port3,
    Port4,
}

impl Controller {
    /// The zero-based index of the port.
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// The kind of accessory currently inserted in a controller port.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AccessoryKind {
    /// Nothing is inserted.
    None,
    /// A Controller Pak.
    MemoryPak,
    /// Some other accessory (Rumble Pak, Transfer Pak, ...).
    Other,
}

/// An error that can occur during raw accessory I/O.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TransportError {
    /// No accessory is inserted in the addressed port.
    NotInserted,

    /// The accessory's on-media structure failed validation.
    Unformatted,

    /// The accessory did not answer a read correctly.
    ReadFailure,

    /// The accessory did not answer a write correctly.
    WriteFailure,
}

impl Display for TransportError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(match self {
            Self::NotInserted => "no accessory is inserted in the controller port",
            Self::Unformatted => "the accessory failed on-media validation",
            Self::ReadFailure => "the accessory did not answer a read correctly",
            Self::WriteFailure => "the accessory did not answer a write correctly",
        })
    }
}

impl core::error::Error for TransportError {}

/// Raw I/O against one or more controller ports.
///
/// Every operation is synchronous and blocking; retry and timeout policy belong to the
/// implementor, not to callers.
pub trait Transport {
    /// Reads the directory entry stored in `slot`.
    fn entry(&mut self, controller: Controller, slot: Slot) -> Result<Entry, TransportError>;

    /// Returns the number of unallocated storage blocks.
    fn free_blocks(&mut self, controller: Controller) -> Result<usize, TransportError>;

    /// Reads `entry`'s payload into `buf`, which spans the entry's full block range.
    fn read_data(
        &mut self,
        controller: Controller,
        entry: &Entry,
        buf: &mut [u8],
    ) -> Result<(), TransportError>;

    /// Writes `data` as the payload of `entry`, creating the directory entry on media.
    fn write_data(
        &mut self,
        controller: Controller,
        entry: &Entry,
        data: &[u8],
    ) -> Result<(), TransportError>;

    /// Removes `entry` from the directory and releases its blocks.
    fn delete(&mut self, controller: Controller, entry: &Entry) -> Result<(), TransportError>;

    /// Erases the entire accessory, directory and payloads both.
    fn format(&mut self, controller: Controller) -> Result<(), TransportError>;

    /// Identifies the accessory currently inserted in the port.
    fn detect(&mut self, controller: Controller) -> AccessoryKind;

    /// Checks the inserted accessory's on-media structure.
    fn validate(&mut self, controller: Controller) -> Result<(), TransportError>;
}

#[cfg(test)]
mod tests {
    use super::Controller;

    #[test]
    fn port_indices() {
        assert_eq!(Controller::Port1.index(), 0);
        assert_eq!(Controller::Port2.index(), 1);
        assert_eq!(Controller::Port3.index(), 2);
        assert_eq!(Controller::Port4.index(), 3);
    }
}
