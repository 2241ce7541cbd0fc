use crate::transport::TransportError;
use core::{
    fmt,
    fmt::{Display, Formatter},
};
use embedded_io::ErrorKind;

/// An error that can occur when operating on the entry catalog.
#[derive(Debug, Eq, PartialEq)]
pub enum Error {
    /// The requested slot index lies outside the accessory's 16-slot directory.
    SlotOutOfRange(usize),

    /// No valid entry carries the requested name.
    NotFound,

    /// The slot already holds a valid entry.
    ///
    /// Entries are never overwritten in place; delete the slot first.
    SlotOccupied(usize),

    /// Every slot already holds a valid entry.
    CatalogFull,

    /// The entry cannot be read.
    ///
    /// Either no Controller Pak is inserted, the inserted one failed validation, or the slot is
    /// free.
    NotReadable,

    /// The writer has exhausted its block.
    EndOfWriter,

    /// The underlying accessory I/O failed.
    ///
    /// Callers should re-check accessory presence and validity before retrying.
    Transport(TransportError),
}

impl From<TransportError> for Error {
    fn from(error: TransportError) -> Self {
        Self::Transport(error)
    }
}

impl Display for Error {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::SlotOutOfRange(slot) => {
                write!(formatter, "slot {slot} lies outside the entry directory")
            }
            Self::NotFound => formatter.write_str("no valid entry carries the requested name"),
            Self::SlotOccupied(slot) => {
                write!(formatter, "slot {slot} already holds a valid entry")
            }
            Self::CatalogFull => formatter.write_str("every slot already holds a valid entry"),
            Self::NotReadable => {
                formatter.write_str("the entry cannot be read from the current accessory")
            }
            Self::EndOfWriter => formatter.write_str("the writer has exhausted its block"),
            Self::Transport(error) => write!(formatter, "accessory transport failed: {error}"),
        }
    }
}

impl core::error::Error for Error {}

impl embedded_io::Error for Error {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::SlotOutOfRange(_) => ErrorKind::InvalidInput,
            Self::NotFound => ErrorKind::NotFound,
            Self::SlotOccupied(_) => ErrorKind::AlreadyExists,
            Self::CatalogFull => ErrorKind::OutOfMemory,
            Self::NotReadable => ErrorKind::NotConnected,
            Self::EndOfWriter => ErrorKind::WriteZero,
            Self::Transport(_) => ErrorKind::Other,
        }
    }
}
