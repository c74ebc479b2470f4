//! Generation-checked agent handles.

use std::fmt;

/// Stable reference to an agent owned by an [`AgentStore`](crate::AgentStore).
///
/// A handle is a slot index plus the generation of the slot at the time the
/// agent was spawned. Once the agent is despawned and the slot reused, the
/// generation no longer matches and the old handle resolves to nothing.
///
/// Handles are totally ordered by `(index, generation)`. The cage relies on
/// this order as the stable identifier for breaking ties between agents that
/// sit on exactly the same spot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AgentId {
    index: u32,
    generation: u32,
}

impl AgentId {
    /// Build a handle from a slot index and generation.
    pub const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Slot index within the owning store.
    pub const fn index(self) -> u32 {
        self.index
    }

    /// Generation of the slot when this handle was issued.
    pub const fn generation(self) -> u32 {
        self.generation
    }

    /// The handle packed into a single integer, generation in the high bits.
    pub const fn to_bits(self) -> u64 {
        ((self.generation as u64) << 32) | self.index as u64
    }

    /// Inverse of [`to_bits`](Self::to_bits).
    pub const fn from_bits(bits: u64) -> Self {
        Self {
            index: bits as u32,
            generation: (bits >> 32) as u32,
        }
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}
