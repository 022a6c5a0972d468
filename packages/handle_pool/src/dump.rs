use std::fmt;

use crate::{HandleId, SlotIndex};

/// A diagnostic snapshot of the internal state of a [`HandlePool`][crate::HandlePool].
///
/// Created by [`HandlePool::dump()`][crate::HandlePool::dump]. The snapshot lists the dense
/// storage (slot by slot, with the owner of each slot and a [`Debug`][fmt::Debug] rendering of
/// the entry) and the indirection map (identifier by identifier). It implements
/// [`Display`][fmt::Display] for printing to the terminal.
///
/// The exact contents and formatting are meant for humans and may change between versions.
///
/// # Example
///
/// ```rust
/// use handle_pool::HandlePool;
///
/// let mut pool = HandlePool::<u32>::new();
/// let a = pool.insert(10);
/// let b = pool.insert(20);
/// pool.destroy(a).unwrap();
///
/// let dump = pool.dump();
/// assert_eq!(dump.slots().len(), 1);
/// assert_eq!(dump.mappings()[0].0, b.id());
///
/// println!("{dump}");
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PoolDump {
    slots: Vec<SlotDump>,
    mappings: Vec<(HandleId, SlotIndex)>,
}

/// One slot of the dense storage in a [`PoolDump`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SlotDump {
    slot: SlotIndex,
    owner: HandleId,
    summary: String,
}

impl PoolDump {
    #[must_use]
    pub(crate) fn new(slots: Vec<SlotDump>, mappings: Vec<(HandleId, SlotIndex)>) -> Self {
        Self { slots, mappings }
    }

    /// The storage slots, in storage order.
    #[must_use]
    pub fn slots(&self) -> &[SlotDump] {
        &self.slots
    }

    /// The `(id, slot)` pairs of the indirection map, sorted by identifier.
    #[must_use]
    pub fn mappings(&self) -> &[(HandleId, SlotIndex)] {
        &self.mappings
    }
}

impl SlotDump {
    #[must_use]
    pub(crate) fn new(slot: SlotIndex, owner: HandleId, summary: String) -> Self {
        Self {
            slot,
            owner,
            summary,
        }
    }

    /// The 1-based slot index.
    #[must_use]
    pub fn slot(&self) -> SlotIndex {
        self.slot
    }

    /// The identifier of the entry occupying the slot.
    #[must_use]
    pub fn owner(&self) -> HandleId {
        self.owner
    }

    /// The [`Debug`][fmt::Debug] rendering of the entry.
    #[must_use]
    pub fn summary(&self) -> &str {
        &self.summary
    }
}

impl fmt::Display for PoolDump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "slots ({}):", self.slots.len())?;

        for slot in &self.slots {
            writeln!(
                f,
                "    slot {}: owner {}, {}",
                slot.slot, slot.owner, slot.summary
            )?;
        }

        writeln!(f, "map ({}):", self.mappings.len())?;

        for (id, slot) in &self.mappings {
            writeln!(f, "    id {id} -> slot {slot}")?;
        }

        Ok(())
    }
}
