use std::fmt;
use std::num::NonZero;

use foldhash::{HashMap, HashMapExt};

use crate::HandleId;

/// The 1-based position of an entry in the dense storage of a [`HandlePool`][crate::HandlePool].
///
/// Slot index 0 is reserved to mean "removed", mirroring the role of [`HandleId::NULL`] on the
/// identifier side. The type cannot hold that value, so a slot index obtained from a pool always
/// names a real position.
///
/// Unlike a [`HandleId`], the slot index of an entry changes when other entries are destroyed.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct SlotIndex(NonZero<usize>);

impl SlotIndex {
    /// The slot index of the entry at the 0-based storage `position`.
    #[must_use]
    pub(crate) fn from_position(position: usize) -> Self {
        Self(
            NonZero::<usize>::MIN
                .checked_add(position)
                .expect("storage cannot hold usize::MAX entries, so the position is always small enough"),
        )
    }

    /// The 1-based slot index value.
    #[must_use]
    pub fn get(self) -> usize {
        self.0.get()
    }

    /// The 0-based storage position this slot index refers to.
    #[must_use]
    pub(crate) fn position(self) -> usize {
        self.0
            .get()
            .checked_sub(1)
            .expect("slot index is non-zero, so subtracting one cannot underflow")
    }
}

impl fmt::Display for SlotIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Outcome of removing one identifier from an [`IndirectionMap`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct Removal {
    /// The slot the removed identifier used to map to. The caller must remove the storage entry
    /// at this slot using the same strategy that was applied to the map.
    pub(crate) slot: SlotIndex,

    /// How many surviving identifiers were repointed to a different slot.
    pub(crate) relocated: usize,
}

/// Maps [`HandleId`]s to the current [`SlotIndex`] of their entry and back.
///
/// The forward map answers "where is this entry now". The reverse lookup is kept densely, in
/// parallel with the storage, and answers "which identifier owns this slot". The latter is what
/// lets swap-removal repoint the relocated entry without scanning the forward map.
///
/// The map also owns the identifier counter, as identifiers only exist in here.
#[derive(Debug)]
pub(crate) struct IndirectionMap {
    slots_by_id: HashMap<HandleId, SlotIndex>,

    /// Element `n` is the identifier that owns the slot with 0-based position `n`.
    ids_by_slot: Vec<HandleId>,

    /// The identifier that the next call to `issue()` hands out. Never reset.
    next_id: HandleId,
}

impl IndirectionMap {
    #[must_use]
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            slots_by_id: HashMap::with_capacity(capacity),
            ids_by_slot: Vec::with_capacity(capacity),
            next_id: HandleId::FIRST,
        }
    }

    #[must_use]
    pub(crate) fn len(&self) -> usize {
        self.ids_by_slot.len()
    }

    /// Issues a fresh identifier and maps it to a new slot right after the current last one.
    ///
    /// The caller must append the matching entry to the storage.
    #[must_use]
    pub(crate) fn issue(&mut self) -> (HandleId, SlotIndex) {
        let id = self.next_id;
        self.next_id = id.successor();

        let slot = SlotIndex::from_position(self.ids_by_slot.len());

        self.ids_by_slot.push(id);
        let previous = self.slots_by_id.insert(id, slot);
        debug_assert!(previous.is_none(), "identifier {id} was issued twice");

        (id, slot)
    }

    /// The slot of a live identifier, or `None` if the identifier is not live.
    #[must_use]
    pub(crate) fn slot_of(&self, id: HandleId) -> Option<SlotIndex> {
        self.slots_by_id.get(&id).copied()
    }

    /// The identifier owning the slot at the 0-based storage `position`.
    #[must_use]
    pub(crate) fn id_at(&self, position: usize) -> Option<HandleId> {
        self.ids_by_slot.get(position).copied()
    }

    /// Retires `id`, filling the gap with the identifier of the last slot.
    ///
    /// Returns `None` without touching anything if `id` is not live.
    pub(crate) fn swap_remove(&mut self, id: HandleId) -> Option<Removal> {
        let slot = self.slots_by_id.remove(&id)?;
        let position = slot.position();

        let removed = self.ids_by_slot.swap_remove(position);
        debug_assert_eq!(removed, id);

        // If the removed slot was not the last one, the former owner of the last slot now
        // lives at `position` and has to be told so.
        let relocated = match self.ids_by_slot.get(position) {
            Some(moved) => {
                *self
                    .slots_by_id
                    .get_mut(moved)
                    .expect("every identifier in the reverse lookup is a live key") = slot;
                1
            }
            None => 0,
        };

        Some(Removal { slot, relocated })
    }

    /// Retires `id`, shifting every later slot left by one.
    ///
    /// Returns `None` without touching anything if `id` is not live.
    pub(crate) fn ordered_remove(&mut self, id: HandleId) -> Option<Removal> {
        let slot = self.slots_by_id.remove(&id)?;
        let position = slot.position();

        let removed = self.ids_by_slot.remove(position);
        debug_assert_eq!(removed, id);

        // Only the identifiers after the removed slot changed position.
        for (new_position, moved) in self.ids_by_slot.iter().enumerate().skip(position) {
            *self
                .slots_by_id
                .get_mut(moved)
                .expect("every identifier in the reverse lookup is a live key") =
                SlotIndex::from_position(new_position);
        }

        let relocated = self
            .ids_by_slot
            .len()
            .checked_sub(position)
            .expect("the removed position was in bounds, so it cannot exceed the new length");

        Some(Removal { slot, relocated })
    }

    /// Retires every live identifier. The identifier counter keeps going.
    pub(crate) fn clear(&mut self) {
        self.slots_by_id.clear();
        self.ids_by_slot.clear();
    }

    pub(crate) fn reserve(&mut self, additional: usize) {
        self.slots_by_id.reserve(additional);
        self.ids_by_slot.reserve(additional);
    }

    #[cfg_attr(test, mutants::skip)] // Only affects memory usage, not behavior.
    pub(crate) fn shrink_to_fit(&mut self) {
        self.slots_by_id.shrink_to_fit();
        self.ids_by_slot.shrink_to_fit();
    }

    /// Live identifiers in slot order.
    #[must_use]
    pub(crate) fn ids(&self) -> &[HandleId] {
        &self.ids_by_slot
    }

    /// `(id, slot)` pairs sorted by identifier.
    #[must_use]
    pub(crate) fn sorted_mappings(&self) -> Vec<(HandleId, SlotIndex)> {
        let mut mappings = self
            .slots_by_id
            .iter()
            .map(|(id, slot)| (*id, *slot))
            .collect::<Vec<_>>();

        mappings.sort_unstable_by_key(|(id, _)| *id);
        mappings
    }

    #[cfg(test)]
    #[mutants::skip] // This is essentially test logic, mutation is meaningless.
    pub(crate) fn integrity_check(&self) {
        assert_eq!(
            self.slots_by_id.len(),
            self.ids_by_slot.len(),
            "forward map and reverse lookup disagree on the number of live entries"
        );

        for (position, id) in self.ids_by_slot.iter().enumerate() {
            assert!(!id.is_null(), "the null identifier is mapped at position {position}");
            assert!(*id < self.next_id, "identifier {id} was never issued");

            let slot = self.slots_by_id.get(id).copied();
            assert_eq!(
                slot,
                Some(SlotIndex::from_position(position)),
                "identifier {id} at position {position} is mapped elsewhere"
            );
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    fn issue_many(map: &mut IndirectionMap, count: usize) -> Vec<HandleId> {
        (0..count).map(|_| map.issue().0).collect()
    }

    #[test]
    fn slot_index_is_one_based() {
        let slot = SlotIndex::from_position(0);
        assert_eq!(slot.get(), 1);
        assert_eq!(slot.position(), 0);
        assert_eq!(slot.to_string(), "1");

        assert_eq!(SlotIndex::from_position(9).get(), 10);
    }

    #[test]
    fn issue_hands_out_increasing_ids_and_trailing_slots() {
        let mut map = IndirectionMap::with_capacity(0);

        let (a, slot_a) = map.issue();
        let (b, slot_b) = map.issue();

        assert_eq!(a, HandleId::FIRST);
        assert_eq!(b, HandleId::new(2));
        assert_eq!(slot_a.get(), 1);
        assert_eq!(slot_b.get(), 2);
        assert_eq!(map.len(), 2);

        map.integrity_check();
    }

    #[test]
    fn unknown_ids_have_no_slot() {
        let mut map = IndirectionMap::with_capacity(0);
        _ = map.issue();

        assert_eq!(map.slot_of(HandleId::NULL), None);
        assert_eq!(map.slot_of(HandleId::new(99)), None);
    }

    #[test]
    fn swap_remove_middle_repoints_last() {
        let mut map = IndirectionMap::with_capacity(3);
        let ids = issue_many(&mut map, 3);

        let removal = map.swap_remove(ids[0]).unwrap();

        assert_eq!(removal.slot.get(), 1);
        assert_eq!(removal.relocated, 1);
        assert_eq!(map.slot_of(ids[0]), None);
        assert_eq!(map.slot_of(ids[2]).unwrap().get(), 1);
        assert_eq!(map.slot_of(ids[1]).unwrap().get(), 2);
        assert_eq!(map.ids().to_vec(), vec![ids[2], ids[1]]);

        map.integrity_check();
    }

    #[test]
    fn swap_remove_last_relocates_nothing() {
        let mut map = IndirectionMap::with_capacity(2);
        let ids = issue_many(&mut map, 2);

        let removal = map.swap_remove(ids[1]).unwrap();

        assert_eq!(removal.slot.get(), 2);
        assert_eq!(removal.relocated, 0);
        assert_eq!(map.slot_of(ids[0]).unwrap().get(), 1);

        map.integrity_check();
    }

    #[test]
    fn ordered_remove_shifts_later_slots() {
        let mut map = IndirectionMap::with_capacity(4);
        let ids = issue_many(&mut map, 4);

        let removal = map.ordered_remove(ids[1]).unwrap();

        assert_eq!(removal.slot.get(), 2);
        assert_eq!(removal.relocated, 2);
        assert_eq!(map.slot_of(ids[0]).unwrap().get(), 1);
        assert_eq!(map.slot_of(ids[2]).unwrap().get(), 2);
        assert_eq!(map.slot_of(ids[3]).unwrap().get(), 3);
        assert_eq!(map.ids().to_vec(), vec![ids[0], ids[2], ids[3]]);

        map.integrity_check();
    }

    #[test]
    fn removing_dead_id_changes_nothing() {
        let mut map = IndirectionMap::with_capacity(2);
        let ids = issue_many(&mut map, 2);

        _ = map.swap_remove(ids[0]).unwrap();

        assert_eq!(map.swap_remove(ids[0]), None);
        assert_eq!(map.ordered_remove(ids[0]), None);
        assert_eq!(map.swap_remove(HandleId::NULL), None);
        assert_eq!(map.len(), 1);

        map.integrity_check();
    }

    #[test]
    fn clear_keeps_counter() {
        let mut map = IndirectionMap::with_capacity(2);
        let ids = issue_many(&mut map, 2);

        map.clear();
        assert_eq!(map.len(), 0);
        assert_eq!(map.slot_of(ids[0]), None);

        let (next, slot) = map.issue();
        assert_eq!(next, HandleId::new(3));
        assert_eq!(slot.get(), 1);

        map.integrity_check();
    }

    #[test]
    fn sorted_mappings_are_sorted_by_id() {
        let mut map = IndirectionMap::with_capacity(5);
        let ids = issue_many(&mut map, 5);

        _ = map.swap_remove(ids[0]).unwrap();
        _ = map.swap_remove(ids[1]).unwrap();

        let mappings = map.sorted_mappings();
        let mapped_ids = mappings.iter().map(|(id, _)| *id).collect::<Vec<_>>();

        assert_eq!(mapped_ids, vec![ids[2], ids[3], ids[4]]);

        for (id, slot) in mappings {
            assert_eq!(map.id_at(slot.position()), Some(id));
        }
    }
}
