//! The entity-iteration collaborator.
//!
//! The cage does not own agents. It reads and writes them through an
//! [`AgentStore`], which decides which agents carry both a position and a
//! sphere, dispatches per-agent closures across a [`WorkerPool`], and
//! honours deferred despawn requests.

use glam::Vec3;

use crate::agent::{Body, BodyMut, Decoupling};
use crate::id::AgentId;
use crate::pool::WorkerPool;

/// Read access to agents by handle, shareable across worker threads.
pub trait AgentLookup: Sync {
    /// The agent's current body, or `None` if the handle is stale or the
    /// agent has no sphere.
    fn body(&self, agent: AgentId) -> Option<Body>;

    /// Shortcut for the agent's position.
    fn position(&self, agent: AgentId) -> Option<Vec3> {
        self.body(agent).map(|b| b.position)
    }
}

/// Owner of the agents the cage operates on.
///
/// Only agents carrying both a position and a sphere are visited by the
/// `operate_*` methods. Visit order across threads is unspecified; callers
/// must not depend on it.
pub trait AgentStore: AgentLookup {
    /// Visit every agent concurrently with read-only access.
    fn operate_concurrently<F>(&self, pool: &WorkerPool, f: F)
    where
        F: Fn(AgentId, Body) + Send + Sync;

    /// Visit every agent concurrently, each task getting mutable access to
    /// that agent's own position and decoupling scratch only.
    fn operate_concurrently_mut<F>(&mut self, pool: &WorkerPool, f: F)
    where
        F: Fn(AgentId, BodyMut<'_>) + Send + Sync;

    /// The agent's decoupling scratch.
    fn decoupling(&self, agent: AgentId) -> Option<Decoupling>;

    /// Mutable access to the agent's decoupling scratch.
    fn decoupling_mut(&mut self, agent: AgentId) -> Option<&mut Decoupling>;

    /// Ask for the agent to be removed once the current pass completes.
    ///
    /// Callable from worker threads. The agent stays readable until
    /// [`apply_deferreds`](Self::apply_deferreds) runs.
    fn despawn_deferred(&self, agent: AgentId);

    /// Despawn requests queued but not yet applied, in request order.
    fn pending_despawns(&self) -> Vec<AgentId>;

    /// Apply all queued despawn requests, returning the agents actually
    /// removed. Stale and repeated requests are dropped.
    fn apply_deferreds(&mut self) -> Vec<AgentId>;
}
