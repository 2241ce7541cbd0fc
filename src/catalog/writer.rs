use crate::{
    catalog::{Catalog, Error, Slot, BLOCK_SIZE},
    log,
    transport::Transport,
};
use core::cmp::min;
use embedded_io::{ErrorType, Write};

/// A writer that assembles one entry payload in memory and commits it on flush.
///
/// At most one block is buffered. The directory entry is created only when the writer is flushed;
/// dropping an unflushed writer commits whatever was buffered, swallowing any errors. Writing
/// past the block yields [`Error::EndOfWriter`].
#[derive(Debug)]
pub struct Writer<'a, T>
where
    T: Transport,
{
    catalog: &'a mut Catalog<T>,
    slot: Slot,
    buffer: [u8; BLOCK_SIZE],
    len: usize,
    committed: bool,
}

impl<'a, T> Writer<'a, T>
where
    T: Transport,
{
    pub(in crate::catalog) fn new(catalog: &'a mut Catalog<T>, slot: Slot) -> Self {
        log::info!(
            "Creating entry writer for slot {} with capacity {BLOCK_SIZE}",
            slot.get()
        );
        Self {
            catalog,
            slot,
            buffer: [0; BLOCK_SIZE],
            len: 0,
            committed: false,
        }
    }

    /// The slot this writer commits to.
    pub fn slot(&self) -> usize {
        self.slot.get()
    }
}

impl<T> ErrorType for Writer<'_, T>
where
    T: Transport,
{
    type Error = Error;
}

impl<T> Write for Writer<'_, T>
where
    T: Transport,
{
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        if self.committed || self.len == BLOCK_SIZE {
            return Err(Error::EndOfWriter);
        }
        let count = min(buf.len(), BLOCK_SIZE - self.len);
        self.buffer[self.len..self.len + count].copy_from_slice(&buf[..count]);
        self.len += count;
        Ok(count)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        if self.committed {
            return Ok(());
        }
        self.catalog.write(self.slot.get(), &self.buffer[..self.len])?;
        self.committed = true;
        Ok(())
    }
}

impl<T> Drop for Writer<'_, T>
where
    T: Transport,
{
    fn drop(&mut self) {
        if !self.committed {
            log::warn!(
                "Dropped entry writer for slot {} without flushing. The entry will be committed automatically, but any errors will not be handled.",
                self.slot.get()
            );
        }
        // This will swallow any errors.
        let _ignored_result = self.flush();
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        catalog::{Catalog, EntryName, Error, BLOCK_SIZE},
        mock::MockPak,
        transport::Controller,
    };
    use claims::{assert_err_eq, assert_ok, assert_ok_eq};
    use embedded_io::Write;

    fn catalog() -> Catalog<MockPak> {
        assert_ok!(Catalog::new(
            MockPak::formatted(),
            Controller::Port1,
            assert_ok!(EntryName::new("PAKTEST.SAV")),
        ))
    }

    #[test]
    fn partial_writes_fill_the_block() {
        let mut catalog = catalog();
        let mut writer = assert_ok!(catalog.writer(0));

        assert_ok_eq!(writer.write(&[1; 100]), 100);
        assert_ok_eq!(writer.write(&[2; 200]), BLOCK_SIZE - 100);
        assert_err_eq!(writer.write(&[3]), Error::EndOfWriter);
        assert_ok!(writer.flush());
        drop(writer);

        let payload = assert_ok!(catalog.read(0));
        assert_eq!(&payload[..100], &[1; 100]);
        assert_eq!(&payload[100..], &[2; 156]);
    }

    #[test]
    fn flush_commits_exactly_once() {
        let mut catalog = catalog();
        let mut writer = assert_ok!(catalog.writer(0));

        assert_ok_eq!(writer.write(b"once"), 4);
        assert_ok!(writer.flush());
        assert_ok!(writer.flush());
        assert_err_eq!(writer.write(b"more"), Error::EndOfWriter);
        drop(writer);

        assert_eq!(catalog.valid_count(), 1);
    }

    #[test]
    fn drop_commits_buffered_payload() {
        let mut catalog = catalog();

        {
            let mut writer = assert_ok!(catalog.writer_first_free());
            assert_ok_eq!(writer.write(b"dropped"), 7);
        }

        assert_eq!(catalog.valid_count(), 1);
        let payload = assert_ok!(catalog.read(0));
        assert_eq!(&payload[..7], b"dropped");
    }

    #[test]
    fn empty_flush_commits_a_zeroed_block() {
        let mut catalog = catalog();

        let mut writer = assert_ok!(catalog.writer(6));
        assert_ok!(writer.flush());
        drop(writer);

        assert_ok_eq!(catalog.read(6), vec![0; BLOCK_SIZE]);
    }

    #[test]
    fn writer_on_occupied_slot_is_rejected() {
        let mut catalog = catalog();

        assert_ok!(catalog.write(0, b"taken"));
        assert_err_eq!(catalog.writer(0), Error::SlotOccupied(0));
    }

    #[test]
    fn writer_out_of_range() {
        let mut catalog = catalog();

        assert_err_eq!(catalog.writer(16), Error::SlotOutOfRange(16));
    }

    #[test]
    fn writer_first_free_on_full_catalog_is_rejected() {
        let mut catalog = catalog();

        for _ in 0..16 {
            assert_ok!(catalog.write_first_free(b"data"));
        }

        assert_err_eq!(catalog.writer_first_free(), Error::CatalogFull);
    }

    #[test]
    fn writer_targets_first_free_slot() {
        let mut catalog = catalog();

        assert_ok!(catalog.write(0, b"taken"));
        let writer = assert_ok!(catalog.writer_first_free());
        assert_eq!(writer.slot(), 1);
    }
}
