//! Test utilities and mock types for bubble cage development.
//!
//! - [`MockStore`]: a plain `Vec`-backed [`AgentStore`] that records every
//!   deferred despawn request, duplicates included.
//! - [`fixtures`]: scenario grids, lattices and seeded random swarms.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use std::sync::{Mutex, PoisonError};

use cage_core::{
    AgentId, AgentLookup, AgentStore, Body, BodyMut, Decoupling, Fingerprint, Sphere, WorkerPool,
};
use glam::Vec3;
use rayon::prelude::*;

#[derive(Clone, Debug)]
struct Entry {
    id: AgentId,
    position: Vec3,
    sphere: Sphere,
    fingerprint: Fingerprint,
    decoupling: Decoupling,
}

/// Minimal [`AgentStore`] for exercising the passes against something that
/// is not the arena.
///
/// Ids are assigned sequentially with generation 0 and never reused.
/// Every [`despawn_deferred`](AgentStore::despawn_deferred) call is logged
/// in [`despawn_requests`](MockStore::despawn_requests).
#[derive(Debug, Default)]
pub struct MockStore {
    entries: Vec<Entry>,
    next: u32,
    requests: Mutex<Vec<AgentId>>,
    log: Mutex<Vec<AgentId>>,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an agent with weight 1 and no tags.
    pub fn add(&mut self, position: Vec3, radius: f32) -> AgentId {
        self.add_with(position, Sphere::new(radius), Fingerprint::EMPTY)
    }

    pub fn add_with(&mut self, position: Vec3, sphere: Sphere, fingerprint: Fingerprint) -> AgentId {
        let id = AgentId::new(self.next, 0);
        self.next += 1;
        self.entries.push(Entry {
            id,
            position,
            sphere,
            fingerprint,
            decoupling: Decoupling::default(),
        });
        id
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn ids(&self) -> Vec<AgentId> {
        self.entries.iter().map(|e| e.id).collect()
    }

    pub fn set_position(&mut self, id: AgentId, position: Vec3) {
        if let Some(e) = self.entries.iter_mut().find(|e| e.id == id) {
            e.position = position;
        }
    }

    /// Every despawn request received so far, in arrival order.
    pub fn despawn_requests(&self) -> Vec<AgentId> {
        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn entry(&self, id: AgentId) -> Option<&Entry> {
        self.entries.iter().find(|e| e.id == id)
    }
}

impl AgentLookup for MockStore {
    fn body(&self, agent: AgentId) -> Option<Body> {
        self.entry(agent).map(|e| Body {
            position: e.position,
            sphere: e.sphere,
            fingerprint: e.fingerprint,
        })
    }
}

impl AgentStore for MockStore {
    fn operate_concurrently<F>(&self, pool: &WorkerPool, f: F)
    where
        F: Fn(AgentId, Body) + Send + Sync,
    {
        pool.install(|| {
            self.entries.par_iter().for_each(|e| {
                f(
                    e.id,
                    Body {
                        position: e.position,
                        sphere: e.sphere,
                        fingerprint: e.fingerprint,
                    },
                )
            });
        });
    }

    fn operate_concurrently_mut<F>(&mut self, pool: &WorkerPool, f: F)
    where
        F: Fn(AgentId, BodyMut<'_>) + Send + Sync,
    {
        let entries = &mut self.entries;
        pool.install(|| {
            entries.par_iter_mut().for_each(|e| {
                f(
                    e.id,
                    BodyMut {
                        position: &mut e.position,
                        sphere: &e.sphere,
                        decoupling: &mut e.decoupling,
                    },
                )
            });
        });
    }

    fn decoupling(&self, agent: AgentId) -> Option<Decoupling> {
        self.entry(agent).map(|e| e.decoupling)
    }

    fn decoupling_mut(&mut self, agent: AgentId) -> Option<&mut Decoupling> {
        self.entries
            .iter_mut()
            .find(|e| e.id == agent)
            .map(|e| &mut e.decoupling)
    }

    fn despawn_deferred(&self, agent: AgentId) {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(agent);
        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(agent);
    }

    fn pending_despawns(&self) -> Vec<AgentId> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn apply_deferreds(&mut self) -> Vec<AgentId> {
        let requests = std::mem::take(
            self.requests
                .get_mut()
                .unwrap_or_else(PoisonError::into_inner),
        );
        let mut removed = Vec::new();
        for id in requests {
            if let Some(pos) = self.entries.iter().position(|e| e.id == id) {
                self.entries.remove(pos);
                removed.push(id);
            }
        }
        removed
    }
}
