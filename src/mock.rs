//! An in-memory Controller Pak used by the unit tests.

use crate::{
    catalog::{Entry, EntryName, Slot, BLOCK_SIZE, MAX_ENTRIES},
    transport::{AccessoryKind, Controller, Transport, TransportError},
};
use std::{array, cell::RefCell, rc::Rc};

/// Usable blocks on a freshly formatted accessory (128 pages minus the 5 system pages).
pub(crate) const FREE_BLOCKS: usize = 123;

#[derive(Debug)]
struct Note {
    name: EntryName,
    region: u8,
    data: Vec<u8>,
}

#[derive(Debug)]
struct State {
    kind: AccessoryKind,
    formatted: bool,
    notes: [Option<Note>; MAX_ENTRIES],
    fail_next: Option<TransportError>,
}

/// A handle onto an in-memory accessory.
///
/// Cloning yields a second handle onto the same accessory, letting a test mutate the "hardware"
/// (plant notes, eject the pak, inject faults) while a catalog owns the other handle.
#[derive(Clone, Debug)]
pub(crate) struct MockPak {
    state: Rc<RefCell<State>>,
}

impl MockPak {
    fn with_kind(kind: AccessoryKind) -> Self {
        Self {
            state: Rc::new(RefCell::new(State {
                kind,
                formatted: true,
                notes: array::from_fn(|_| None),
                fail_next: None,
            })),
        }
    }

    /// A formatted, empty Controller Pak.
    pub(crate) fn formatted() -> Self {
        Self::with_kind(AccessoryKind::MemoryPak)
    }

    /// An empty controller port.
    pub(crate) fn absent() -> Self {
        Self::with_kind(AccessoryKind::None)
    }

    /// Stores a note directly on the media, bypassing the catalog.
    pub(crate) fn plant(&self, slot: usize, name: &str, data: &[u8]) {
        assert_eq!(data.len() % BLOCK_SIZE, 0, "planted data must fill whole blocks");
        self.state.borrow_mut().notes[slot] = Some(Note {
            name: EntryName::new(name).expect("planted name must fit"),
            region: 0x45,
            data: data.to_vec(),
        });
    }

    /// Removes the accessory from the port.
    pub(crate) fn eject(&self) {
        self.state.borrow_mut().kind = AccessoryKind::None;
    }

    /// Replaces the accessory with a non-storage one.
    pub(crate) fn swap_for_rumble(&self) {
        self.state.borrow_mut().kind = AccessoryKind::Other;
    }

    /// Marks the media as failing validation.
    pub(crate) fn corrupt(&self) {
        self.state.borrow_mut().formatted = false;
    }

    /// Makes the next fallible transport call return `error`.
    pub(crate) fn fail_next(&self, error: TransportError) {
        self.state.borrow_mut().fail_next = Some(error);
    }

    fn take_failure(&self) -> Result<(), TransportError> {
        match self.state.borrow_mut().fail_next.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn guard(&self) -> Result<(), TransportError> {
        let state = self.state.borrow();
        if state.kind != AccessoryKind::MemoryPak {
            return Err(TransportError::NotInserted);
        }
        if !state.formatted {
            return Err(TransportError::Unformatted);
        }
        Ok(())
    }
}

impl Transport for MockPak {
    fn entry(&mut self, _controller: Controller, slot: Slot) -> Result<Entry, TransportError> {
        self.take_failure()?;
        self.guard()?;
        let state = self.state.borrow();
        Ok(match &state.notes[slot.get()] {
            Some(note) => Entry::occupied(
                slot,
                note.name.clone(),
                (note.data.len() / BLOCK_SIZE) as u8,
                note.region,
            ),
            None => Entry::vacant(slot),
        })
    }

    fn free_blocks(&mut self, _controller: Controller) -> Result<usize, TransportError> {
        self.take_failure()?;
        self.guard()?;
        let used: usize = self
            .state
            .borrow()
            .notes
            .iter()
            .flatten()
            .map(|note| note.data.len() / BLOCK_SIZE)
            .sum();
        Ok(FREE_BLOCKS - used)
    }

    fn read_data(
        &mut self,
        _controller: Controller,
        entry: &Entry,
        buf: &mut [u8],
    ) -> Result<(), TransportError> {
        self.take_failure()?;
        self.guard()?;
        match &self.state.borrow().notes[entry.slot().get()] {
            Some(note) => {
                buf.copy_from_slice(&note.data);
                Ok(())
            }
            None => Err(TransportError::ReadFailure),
        }
    }

    fn write_data(
        &mut self,
        _controller: Controller,
        entry: &Entry,
        data: &[u8],
    ) -> Result<(), TransportError> {
        self.take_failure()?;
        self.guard()?;
        let note = Note {
            name: EntryName::new(entry.name().expect("entry must be occupied"))
                .expect("name must fit"),
            region: entry.region().expect("entry must be occupied"),
            data: data.to_vec(),
        };
        self.state.borrow_mut().notes[entry.slot().get()] = Some(note);
        Ok(())
    }

    fn delete(&mut self, _controller: Controller, entry: &Entry) -> Result<(), TransportError> {
        self.take_failure()?;
        self.guard()?;
        self.state.borrow_mut().notes[entry.slot().get()] = None;
        Ok(())
    }

    fn format(&mut self, _controller: Controller) -> Result<(), TransportError> {
        self.take_failure()?;
        if self.state.borrow().kind != AccessoryKind::MemoryPak {
            return Err(TransportError::NotInserted);
        }
        let mut state = self.state.borrow_mut();
        state.notes = array::from_fn(|_| None);
        state.formatted = true;
        Ok(())
    }

    fn detect(&mut self, _controller: Controller) -> AccessoryKind {
        self.state.borrow().kind
    }

    fn validate(&mut self, _controller: Controller) -> Result<(), TransportError> {
        self.guard()
    }
}
