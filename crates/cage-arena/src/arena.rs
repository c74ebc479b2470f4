//! The arena itself.

use std::sync::{Mutex, MutexGuard, PoisonError};

use cage_core::{
    AgentId, AgentLookup, AgentStore, Body, BodyMut, Decoupling, Fingerprint, Sphere, WorkerPool,
};
use glam::Vec3;
use indexmap::IndexSet;
use rayon::prelude::*;
use tracing::debug;

use crate::error::ArenaError;

/// Everything the arena stores for one agent.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Agent {
    /// World-space centre.
    pub position: Vec3,
    /// Collider. Agents without one are invisible to the cage.
    pub sphere: Option<Sphere>,
    /// Tags for filtered queries.
    pub fingerprint: Fingerprint,
    /// Decoupling scratch, zero between passes.
    pub decoupling: Decoupling,
}

impl Agent {
    fn body(&self) -> Option<Body> {
        self.sphere.map(|sphere| Body {
            position: self.position,
            sphere,
            fingerprint: self.fingerprint,
        })
    }
}

#[derive(Debug, Default)]
struct Slot {
    generation: u32,
    agent: Option<Agent>,
}

/// Generational storage for agents.
#[derive(Debug, Default)]
pub struct AgentArena {
    slots: Vec<Slot>,
    free_list: Vec<u32>,
    live: usize,
    /// Insertion-ordered and duplicate-free.
    deferred: Mutex<IndexSet<AgentId>>,
}

// Worker tasks share `&AgentArena`.
const _: fn() = || {
    fn assert<T: Send + Sync>() {}
    assert::<AgentArena>();
};

impl AgentArena {
    /// An empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty arena with room for `capacity` agents.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            ..Self::default()
        }
    }

    /// Add an agent with no tags.
    pub fn spawn(&mut self, position: Vec3, sphere: Option<Sphere>) -> Result<AgentId, ArenaError> {
        self.spawn_tagged(position, sphere, Fingerprint::EMPTY)
    }

    /// Add an agent carrying `fingerprint`.
    pub fn spawn_tagged(
        &mut self,
        position: Vec3,
        sphere: Option<Sphere>,
        fingerprint: Fingerprint,
    ) -> Result<AgentId, ArenaError> {
        let agent = Agent {
            position,
            sphere,
            fingerprint,
            decoupling: Decoupling::default(),
        };
        let index = match self.free_list.pop() {
            Some(index) => index,
            None => {
                let index = u32::try_from(self.slots.len()).map_err(|_| {
                    ArenaError::CapacityExceeded {
                        slots: self.slots.len(),
                    }
                })?;
                self.slots.push(Slot::default());
                index
            }
        };
        let slot = &mut self.slots[index as usize];
        slot.agent = Some(agent);
        self.live += 1;
        Ok(AgentId::new(index, slot.generation))
    }

    /// Remove an agent immediately, returning its last state.
    pub fn despawn(&mut self, id: AgentId) -> Result<Agent, ArenaError> {
        let slot = self
            .slots
            .get_mut(id.index() as usize)
            .filter(|s| s.generation == id.generation())
            .ok_or(ArenaError::StaleHandle { agent: id })?;
        let agent = slot.agent.take().ok_or(ArenaError::StaleHandle { agent: id })?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free_list.push(id.index());
        self.live -= 1;
        Ok(agent)
    }

    /// Whether `id` names a live agent.
    pub fn contains(&self, id: AgentId) -> bool {
        self.get(id).is_some()
    }

    /// The agent behind `id`.
    pub fn get(&self, id: AgentId) -> Option<&Agent> {
        self.slots
            .get(id.index() as usize)
            .filter(|s| s.generation == id.generation())
            .and_then(|s| s.agent.as_ref())
    }

    /// The agent behind `id`, mutably.
    pub fn get_mut(&mut self, id: AgentId) -> Option<&mut Agent> {
        self.slots
            .get_mut(id.index() as usize)
            .filter(|s| s.generation == id.generation())
            .and_then(|s| s.agent.as_mut())
    }

    /// Position of a live agent, sphere or not.
    pub fn position_of(&self, id: AgentId) -> Option<Vec3> {
        self.get(id).map(|a| a.position)
    }

    /// Move an agent.
    pub fn set_position(&mut self, id: AgentId, position: Vec3) -> Result<(), ArenaError> {
        let agent = self.get_mut(id).ok_or(ArenaError::StaleHandle { agent: id })?;
        agent.position = position;
        Ok(())
    }

    /// An agent's collider, if it has one.
    pub fn sphere(&self, id: AgentId) -> Option<Sphere> {
        self.get(id).and_then(|a| a.sphere)
    }

    /// Attach, replace or remove an agent's collider.
    pub fn set_sphere(&mut self, id: AgentId, sphere: Option<Sphere>) -> Result<(), ArenaError> {
        let agent = self.get_mut(id).ok_or(ArenaError::StaleHandle { agent: id })?;
        agent.sphere = sphere;
        Ok(())
    }

    /// Number of live agents.
    pub fn len(&self) -> usize {
        self.live
    }

    /// Whether the arena holds no live agents.
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Live agents in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (AgentId, &Agent)> + '_ {
        self.slots.iter().enumerate().filter_map(|(i, s)| {
            s.agent
                .as_ref()
                .map(|a| (AgentId::new(i as u32, s.generation), a))
        })
    }

    fn deferred(&self) -> MutexGuard<'_, IndexSet<AgentId>> {
        self.deferred.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl AgentLookup for AgentArena {
    fn body(&self, agent: AgentId) -> Option<Body> {
        self.get(agent).and_then(Agent::body)
    }
}

impl AgentStore for AgentArena {
    fn operate_concurrently<F>(&self, pool: &WorkerPool, f: F)
    where
        F: Fn(AgentId, Body) + Send + Sync,
    {
        pool.install(|| {
            self.slots.par_iter().enumerate().for_each(|(i, slot)| {
                if let Some(body) = slot.agent.as_ref().and_then(Agent::body) {
                    f(AgentId::new(i as u32, slot.generation), body);
                }
            });
        });
    }

    fn operate_concurrently_mut<F>(&mut self, pool: &WorkerPool, f: F)
    where
        F: Fn(AgentId, BodyMut<'_>) + Send + Sync,
    {
        let slots = &mut self.slots;
        pool.install(|| {
            slots.par_iter_mut().enumerate().for_each(|(i, slot)| {
                let generation = slot.generation;
                let Some(agent) = slot.agent.as_mut() else {
                    return;
                };
                let Agent {
                    position,
                    sphere,
                    decoupling,
                    ..
                } = agent;
                if let Some(sphere) = sphere.as_ref() {
                    f(
                        AgentId::new(i as u32, generation),
                        BodyMut {
                            position,
                            sphere,
                            decoupling,
                        },
                    );
                }
            });
        });
    }

    fn decoupling(&self, agent: AgentId) -> Option<Decoupling> {
        self.get(agent).map(|a| a.decoupling)
    }

    fn decoupling_mut(&mut self, agent: AgentId) -> Option<&mut Decoupling> {
        self.get_mut(agent).map(|a| &mut a.decoupling)
    }

    fn despawn_deferred(&self, agent: AgentId) {
        self.deferred().insert(agent);
    }

    fn pending_despawns(&self) -> Vec<AgentId> {
        self.deferred().iter().copied().collect()
    }

    fn apply_deferreds(&mut self) -> Vec<AgentId> {
        let requests = std::mem::take(
            self.deferred
                .get_mut()
                .unwrap_or_else(PoisonError::into_inner),
        );
        let removed: Vec<AgentId> = requests
            .into_iter()
            .filter(|&id| self.despawn(id).is_ok())
            .collect();
        if !removed.is_empty() {
            debug!(removed = removed.len(), live = self.live, "applied deferred despawns");
        }
        removed
    }
}
