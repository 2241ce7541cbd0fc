//! The Controller Pak entry catalog.
//!
//! A Controller Pak stores up to 16 directory entries. [`Catalog`] keeps an in-memory mirror of
//! those 16 slots for one controller port and routes every structural mutation (write, delete,
//! format) through the accessory [`Transport`], so callers never race two mutations against the
//! same directory.
//!
//! The mirror is a snapshot: it reflects the accessory only as of the last refresh. Pulling the
//! accessory out and plugging a different one in is not observed until [`Catalog::refresh()`]
//! runs again. Successful writes and deletes refresh implicitly; formatting does not.
//!
//! ``` no_run
//! use n64_pak::{
//!     catalog::{Catalog, EntryName},
//!     transport::{Controller, Transport},
//! };
//!
//! fn demo(transport: impl Transport) {
//!     let name = EntryName::new("PAKDEMO.SAV").expect("name fits");
//!     let mut catalog =
//!         Catalog::new(transport, Controller::Port1, name).expect("accessory not reachable");
//!
//!     let slot = catalog.write_first_free(b"hello").expect("no free slot");
//!     let payload = catalog.read(slot).expect("entry not readable");
//!     assert_eq!(&payload[..5], b"hello");
//!     catalog.delete(slot).expect("delete failed");
//! }
//! ```

mod entry;
mod error;
mod reader;
mod writer;

pub use entry::{
    Entry, EntryName, NameTooLong, Slot, BLOCK_SIZE, MAX_ENTRIES, NAME_CAPACITY, REGION,
};
pub use error::Error;
pub use reader::Reader;
pub use writer::Writer;

use crate::{
    log,
    transport::{AccessoryKind, Controller, Transport},
};
use alloc::{vec, vec::Vec};
use core::cmp::min;

/// The in-memory mirror of one accessory's entry directory.
///
/// A catalog is bound to a single controller port and owns its transport handle; `&mut self` on
/// every mutating operation serializes all directory mutations through the catalog. Catalogs for
/// different ports address disjoint hardware and are fully independent.
#[derive(Debug)]
pub struct Catalog<T> {
    transport: T,
    controller: Controller,
    default_name: EntryName,
    entries: heapless::Vec<Entry, MAX_ENTRIES>,
    valid_count: usize,
    free_blocks: usize,
}

impl<T> Catalog<T>
where
    T: Transport,
{
    /// Creates a catalog bound to the accessory in `controller`'s port and performs the initial
    /// refresh.
    ///
    /// `default_name` is stamped on every entry written through this catalog.
    pub fn new(
        transport: T,
        controller: Controller,
        default_name: EntryName,
    ) -> Result<Self, Error> {
        let mut catalog = Self {
            transport,
            controller,
            default_name,
            entries: heapless::Vec::new(),
            valid_count: 0,
            free_blocks: 0,
        };
        catalog.refresh()?;
        Ok(catalog)
    }

    /// Re-reads all 16 directory slots and the free-block count from the accessory.
    ///
    /// The counters are recomputed wholesale, never patched incrementally. On failure the
    /// previous snapshot is left untouched.
    pub fn refresh(&mut self) -> Result<(), Error> {
        let mut fresh = heapless::Vec::new();
        for index in 0..MAX_ENTRIES {
            // index is bounded by MAX_ENTRIES.
            let slot = unsafe { Slot::new_unchecked(index) };
            let entry = self.transport.entry(self.controller, slot)?;
            // fresh holds exactly MAX_ENTRIES elements.
            let _ = fresh.push(entry);
        }
        let free_blocks = self.transport.free_blocks(self.controller)?;

        self.valid_count = fresh.iter().filter(|entry| entry.is_valid()).count();
        self.free_blocks = free_blocks;
        self.entries = fresh;
        Ok(())
    }

    /// The mirrored entry at `slot`.
    pub fn entry(&self, slot: usize) -> Result<&Entry, Error> {
        self.entries.get(slot).ok_or(Error::SlotOutOfRange(slot))
    }

    /// The slot index of the first valid entry named `name`, scanning in slot order.
    pub fn find(&self, name: &str) -> Result<usize, Error> {
        self.entries
            .iter()
            .position(|entry| entry.name() == Some(name))
            .ok_or(Error::NotFound)
    }

    /// Writes `data` as a new entry in `slot`.
    ///
    /// The slot must currently be free; existing entries are never overwritten (delete first).
    /// The entry is stamped with the catalog's default name and occupies exactly one block:
    /// longer payloads are truncated, shorter ones zero-padded.
    pub fn write(&mut self, slot: usize, data: &[u8]) -> Result<(), Error> {
        let target = Slot::new(slot).ok_or(Error::SlotOutOfRange(slot))?;
        if self.entries[slot].is_valid() {
            return Err(Error::SlotOccupied(slot));
        }

        if data.len() > BLOCK_SIZE {
            log::warn!(
                "Truncating {} byte payload to one {BLOCK_SIZE} byte block",
                data.len()
            );
        }
        let mut block = [0; BLOCK_SIZE];
        let len = min(data.len(), BLOCK_SIZE);
        block[..len].copy_from_slice(&data[..len]);

        log::info!(
            "Writing entry \"{}\" to slot {slot} on {:?}",
            self.default_name,
            self.controller
        );
        let entry = Entry::occupied(target, self.default_name.clone(), 1, REGION);
        self.transport.write_data(self.controller, &entry, &block)?;
        self.refresh()
    }

    /// Writes `data` into the first free slot, returning the slot index used.
    pub fn write_first_free(&mut self, data: &[u8]) -> Result<usize, Error> {
        let slot = self.first_free()?;
        self.write(slot, data)?;
        Ok(slot)
    }

    /// Deletes the entry in `slot`.
    ///
    /// Deleting a free slot is a no-op, not an error.
    pub fn delete(&mut self, slot: usize) -> Result<(), Error> {
        let entry = self.entry(slot)?.clone();
        if !entry.is_valid() {
            return Ok(());
        }
        log::info!("Deleting entry in slot {slot} on {:?}", self.controller);
        self.transport.delete(self.controller, &entry)?;
        self.refresh()
    }

    /// Erases the entire accessory.
    ///
    /// The mirror is not refreshed; call [`refresh`](Self::refresh) before trusting the catalog
    /// again.
    pub fn format(&mut self) -> Result<(), Error> {
        log::info!("Formatting accessory on {:?}", self.controller);
        self.transport.format(self.controller)?;
        Ok(())
    }

    /// Whether a Controller Pak is currently inserted in the port.
    ///
    /// Probes the transport directly, independent of catalog freshness.
    pub fn is_present(&mut self) -> bool {
        self.transport.detect(self.controller) == AccessoryKind::MemoryPak
    }

    /// Whether the inserted accessory passes on-media validation.
    ///
    /// Always `false` when no Controller Pak is inserted.
    pub fn is_valid(&mut self) -> bool {
        self.is_present() && self.transport.validate(self.controller).is_ok()
    }

    /// Reads the payload of the valid entry in `slot` into a freshly allocated buffer.
    ///
    /// The entry is re-read from the accessory first, so a stale mirror cannot misreport
    /// validity. The returned buffer holds the entry's full block range and is owned by the
    /// caller.
    pub fn read(&mut self, slot: usize) -> Result<Vec<u8>, Error> {
        let target = Slot::new(slot).ok_or(Error::SlotOutOfRange(slot))?;
        if !self.is_valid() {
            return Err(Error::NotReadable);
        }
        let entry = self.transport.entry(self.controller, target)?;
        let Some(blocks) = entry.blocks() else {
            return Err(Error::NotReadable);
        };

        let mut payload = vec![0; usize::from(blocks) * BLOCK_SIZE];
        self.transport
            .read_data(self.controller, &entry, &mut payload)?;
        Ok(payload)
    }

    /// Returns a reader over the payload of the valid entry in `slot`.
    ///
    /// The payload is copied off the accessory up front; the reader itself cannot fail.
    pub fn reader(&mut self, slot: usize) -> Result<Reader, Error> {
        Ok(Reader::new(self.read(slot)?))
    }

    /// Returns a writer that buffers up to one block and commits it to `slot`.
    ///
    /// The slot must currently be free. The entry is created when the writer is flushed or
    /// dropped.
    pub fn writer(&mut self, slot: usize) -> Result<Writer<'_, T>, Error> {
        let target = Slot::new(slot).ok_or(Error::SlotOutOfRange(slot))?;
        if self.entries[slot].is_valid() {
            return Err(Error::SlotOccupied(slot));
        }
        Ok(Writer::new(self, target))
    }

    /// Returns a writer that commits to the first currently free slot.
    pub fn writer_first_free(&mut self) -> Result<Writer<'_, T>, Error> {
        let slot = self.first_free()?;
        // first_free is bounded by MAX_ENTRIES.
        let target = unsafe { Slot::new_unchecked(slot) };
        Ok(Writer::new(self, target))
    }

    /// Number of valid entries as of the last refresh.
    pub fn valid_count(&self) -> usize {
        self.valid_count
    }

    /// Accessory-reported free block count as of the last refresh.
    pub fn free_blocks(&self) -> usize {
        self.free_blocks
    }

    /// The last-refreshed view of all 16 slots, in slot order.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// The name of the valid entry at `slot`, if any.
    pub fn name_of(&self, slot: usize) -> Result<Option<&str>, Error> {
        Ok(self.entry(slot)?.name())
    }

    /// The name stamped on entries written through this catalog.
    pub fn default_name(&self) -> &EntryName {
        &self.default_name
    }

    /// The controller port this catalog addresses.
    pub fn controller(&self) -> Controller {
        self.controller
    }

    fn first_free(&self) -> Result<usize, Error> {
        self.entries
            .iter()
            .position(|entry| !entry.is_valid())
            .ok_or(Error::CatalogFull)
    }
}
