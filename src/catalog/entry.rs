use core::{
    fmt,
    fmt::{Display, Formatter},
};
use deranged::RangedUsize;

/// Number of directory slots on a Controller Pak.
pub const MAX_ENTRIES: usize = 16;

/// Size in bytes of one storage block.
pub const BLOCK_SIZE: usize = 256;

/// Longest entry name the accessory's directory can hold.
pub const NAME_CAPACITY: usize = 16;

/// Region code stamped on every entry written through this crate.
pub const REGION: u8 = 0x45;

/// A directory slot index proven to be in range.
///
/// The public catalog API takes plain `usize` indices and validates them; transports only ever
/// see a `Slot`.
pub type Slot = RangedUsize<0, { MAX_ENTRIES - 1 }>;

/// The identifier under which an entry is stored in the directory.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntryName(heapless::String<NAME_CAPACITY>);

impl EntryName {
    /// Creates an entry name, failing if `name` exceeds the accessory's limit.
    pub fn new(name: &str) -> Result<Self, NameTooLong> {
        let mut string = heapless::String::new();
        string.push_str(name).map_err(|_| NameTooLong)?;
        Ok(Self(string))
    }

    pub(crate) const fn empty() -> Self {
        Self(heapless::String::new())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl TryFrom<&str> for EntryName {
    type Error = NameTooLong;

    fn try_from(name: &str) -> Result<Self, Self::Error> {
        Self::new(name)
    }
}

impl Display for EntryName {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// The name passed to [`EntryName::new()`] is longer than [`NAME_CAPACITY`] bytes.
#[derive(Debug, Eq, PartialEq)]
pub struct NameTooLong;

impl Display for NameTooLong {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        write!(
            formatter,
            "the entry name exceeds the accessory's {NAME_CAPACITY} byte limit"
        )
    }
}

impl core::error::Error for NameTooLong {}

/// The catalog's view of one directory slot.
///
/// `name`, `blocks`, and `region` are meaningful only while the slot is valid; the accessors
/// return `None` for a free slot.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Entry {
    slot: Slot,
    valid: bool,
    name: EntryName,
    blocks: u8,
    region: u8,
}

impl Entry {
    /// The view of a free slot.
    pub fn vacant(slot: Slot) -> Self {
        Self {
            slot,
            valid: false,
            name: EntryName::empty(),
            blocks: 0,
            region: 0,
        }
    }

    /// The view of an occupied slot.
    pub fn occupied(slot: Slot, name: EntryName, blocks: u8, region: u8) -> Self {
        Self {
            slot,
            valid: true,
            name,
            blocks,
            region,
        }
    }

    /// The directory position this entry describes.
    ///
    /// Position-stable within one catalog snapshot.
    pub fn slot(&self) -> Slot {
        self.slot
    }

    /// Whether the slot holds an entry. `false` means free/erased.
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// The entry's name, or `None` for a free slot.
    pub fn name(&self) -> Option<&str> {
        self.valid.then(|| self.name.as_str())
    }

    /// Storage blocks occupied (at least 1), or `None` for a free slot.
    pub fn blocks(&self) -> Option<u8> {
        self.valid.then_some(self.blocks)
    }

    /// The region code byte, or `None` for a free slot.
    pub fn region(&self) -> Option<u8> {
        self.valid.then_some(self.region)
    }
}

#[cfg(test)]
mod tests {
    use super::{Entry, EntryName, NameTooLong, Slot, REGION};
    use claims::{assert_err_eq, assert_ok, assert_ok_eq};

    #[test]
    fn name_at_capacity() {
        let name = assert_ok!(EntryName::new("SIXTEEN.CHARSAVE"));
        assert_eq!(name.as_str(), "SIXTEEN.CHARSAVE");
        assert_ok_eq!(EntryName::try_from("SIXTEEN.CHARSAVE"), name);
    }

    #[test]
    fn name_too_long() {
        assert_err_eq!(EntryName::new("SEVENTEEN.CHARSAV"), NameTooLong);
    }

    #[test]
    fn vacant_fields_are_hidden() {
        let entry = Entry::vacant(Slot::new_static::<3>());

        assert_eq!(entry.slot().get(), 3);
        assert!(!entry.is_valid());
        assert_eq!(entry.name(), None);
        assert_eq!(entry.blocks(), None);
        assert_eq!(entry.region(), None);
    }

    #[test]
    fn occupied_fields_are_exposed() {
        let name = assert_ok!(EntryName::new("PAKTEST.SAV"));
        let entry = Entry::occupied(Slot::new_static::<0>(), name, 1, REGION);

        assert_eq!(entry.slot().get(), 0);
        assert!(entry.is_valid());
        assert_eq!(entry.name(), Some("PAKTEST.SAV"));
        assert_eq!(entry.blocks(), Some(1));
        assert_eq!(entry.region(), Some(REGION));
    }

    #[cfg(feature = "serde")]
    mod serialization {
        use super::super::{Entry, EntryName, Slot, REGION};
        use claims::{assert_ok, assert_ok_eq};
        use serde::{Deserialize, Serialize};
        use serde_assert::{Deserializer, Serializer};

        #[test]
        fn entry_roundtrip() {
            let name = assert_ok!(EntryName::new("PAKTEST.SAV"));
            let entry = Entry::occupied(Slot::new_static::<7>(), name, 1, REGION);

            let serializer = Serializer::builder().build();
            let tokens = assert_ok!(entry.serialize(&serializer));
            let mut deserializer = Deserializer::builder(tokens).build();

            assert_ok_eq!(Entry::deserialize(&mut deserializer), entry);
        }

        #[test]
        fn vacant_entry_roundtrip() {
            let entry = Entry::vacant(Slot::new_static::<15>());

            let serializer = Serializer::builder().build();
            let tokens = assert_ok!(entry.serialize(&serializer));
            let mut deserializer = Deserializer::builder(tokens).build();

            assert_ok_eq!(Entry::deserialize(&mut deserializer), entry);
        }
    }
}
