use alloc::vec::Vec;
use core::{cmp::min, convert::Infallible};
use embedded_io::{ErrorType, Read};

/// A reader over one entry's payload.
///
/// The payload is copied off the accessory when the reader is created; reading never touches the
/// transport again, so the reader stays usable even if the entry is deleted or the accessory is
/// removed afterwards.
#[derive(Debug)]
pub struct Reader {
    payload: Vec<u8>,
    position: usize,
}

impl Reader {
    pub(in crate::catalog) fn new(payload: Vec<u8>) -> Self {
        Self {
            payload,
            position: 0,
        }
    }
}

impl ErrorType for Reader {
    type Error = Infallible;
}

impl Read for Reader {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let remaining = &self.payload[self.position..];
        let count = min(buf.len(), remaining.len());
        buf[..count].copy_from_slice(&remaining[..count]);
        self.position += count;
        Ok(count)
    }
}
