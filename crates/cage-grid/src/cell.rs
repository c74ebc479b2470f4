//! A single grid cell.

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use cage_core::{AgentId, Fingerprint};
use smallvec::SmallVec;

/// Inline capacity of a cell. With the cell size at least twice the largest
/// radius, a cell rarely holds more than a handful of agents.
pub const CELL_INLINE_AGENTS: usize = 8;

/// The occupants of one cell.
///
/// An ordered sequence without duplicates, plus the union of the occupants'
/// fingerprints. The union can be wider than the current occupants after a
/// [`remove`](Self::remove), since removal never narrows it.
#[derive(Clone, Debug, Default)]
pub struct CellSlot {
    agents: SmallVec<[AgentId; CELL_INLINE_AGENTS]>,
    fingerprint: Fingerprint,
}

impl CellSlot {
    /// Append `agent` unless it is already present. Returns whether it was added.
    pub fn add(&mut self, agent: AgentId, fingerprint: Fingerprint) -> bool {
        if self.agents.contains(&agent) {
            return false;
        }
        self.agents.push(agent);
        self.fingerprint |= fingerprint;
        true
    }

    /// Remove `agent`, keeping the order of the rest. Returns whether it was present.
    pub fn remove(&mut self, agent: AgentId) -> bool {
        match self.agents.iter().position(|a| *a == agent) {
            Some(i) => {
                self.agents.remove(i);
                true
            }
            None => false,
        }
    }

    /// Drop every occupant, keeping the allocation.
    pub fn clear(&mut self) {
        self.agents.clear();
        self.fingerprint = Fingerprint::EMPTY;
    }

    /// Occupants in insertion order.
    pub fn agents(&self) -> &[AgentId] {
        &self.agents
    }

    /// Whether `agent` is an occupant.
    pub fn contains(&self, agent: AgentId) -> bool {
        self.agents.contains(&agent)
    }

    /// Union of the occupants' fingerprints.
    pub fn fingerprint(&self) -> Fingerprint {
        self.fingerprint
    }

    /// Number of occupants.
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    /// Whether the cell has no occupants.
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}

/// A grid cell: a [`CellSlot`] behind its own lock.
///
/// Writers take [`lock`](Self::lock) for the duration of an add or remove,
/// so workers filling different cells never contend. Readers take
/// [`read`](Self::read) during queries, and exclusive owners of the grid go
/// through [`get_mut`](Self::get_mut) without locking at all.
#[derive(Debug, Default)]
pub struct Cell {
    slot: RwLock<CellSlot>,
}

impl Cell {
    /// Exclusive access for the lifetime of the returned guard.
    pub fn lock(&self) -> RwLockWriteGuard<'_, CellSlot> {
        // A worker panicking mid-add leaves the slot structurally valid.
        self.slot.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Shared read access for the lifetime of the returned guard.
    pub fn read(&self) -> RwLockReadGuard<'_, CellSlot> {
        self.slot.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Direct access through an exclusive borrow.
    pub fn get_mut(&mut self) -> &mut CellSlot {
        self.slot.get_mut().unwrap_or_else(PoisonError::into_inner)
    }

    /// Drop every occupant, keeping the allocation.
    pub fn clear(&mut self) {
        self.get_mut().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(i: u32) -> AgentId {
        AgentId::new(i, 0)
    }

    #[test]
    fn add_rejects_duplicates() {
        let mut slot = CellSlot::default();
        assert!(slot.add(id(1), Fingerprint::EMPTY));
        assert!(!slot.add(id(1), Fingerprint::EMPTY));
        assert_eq!(slot.len(), 1);
    }

    #[test]
    fn same_index_different_generation_is_distinct() {
        let mut slot = CellSlot::default();
        assert!(slot.add(AgentId::new(1, 0), Fingerprint::EMPTY));
        assert!(slot.add(AgentId::new(1, 1), Fingerprint::EMPTY));
        assert_eq!(slot.len(), 2);
    }

    #[test]
    fn remove_keeps_order() {
        let mut slot = CellSlot::default();
        for i in 0..4 {
            slot.add(id(i), Fingerprint::EMPTY);
        }
        assert!(slot.remove(id(1)));
        assert!(!slot.remove(id(1)));
        assert_eq!(slot.agents(), &[id(0), id(2), id(3)]);
    }

    #[test]
    fn fingerprint_accumulates_and_clears() {
        let mut slot = CellSlot::default();
        slot.add(id(0), Fingerprint::tag(0));
        slot.add(id(1), Fingerprint::tag(3));
        assert_eq!(slot.fingerprint(), Fingerprint::tag(0) | Fingerprint::tag(3));
        slot.remove(id(1));
        assert!(slot.fingerprint().contains(Fingerprint::tag(3)));
        slot.clear();
        assert!(slot.is_empty());
        assert!(slot.fingerprint().is_empty());
    }

    #[test]
    fn clear_keeps_spilled_capacity() {
        let mut cell = Cell::default();
        for i in 0..(CELL_INLINE_AGENTS as u32 * 2) {
            cell.lock().add(id(i), Fingerprint::EMPTY);
        }
        cell.clear();
        assert!(cell.read().is_empty());
        assert!(cell.get_mut().agents.capacity() >= CELL_INLINE_AGENTS * 2);
    }

    #[test]
    fn concurrent_adds_to_one_cell() {
        let cell = Cell::default();
        std::thread::scope(|s| {
            for t in 0..4u32 {
                let cell = &cell;
                s.spawn(move || {
                    for i in 0..50u32 {
                        cell.lock().add(id(t * 100 + i), Fingerprint::EMPTY);
                    }
                });
            }
        });
        assert_eq!(cell.read().len(), 200);
    }
}
