//! The decouple pass: push overlapping agents apart.
//!
//! Three phases separated by full barriers:
//!
//! - **Scan** (parallel, read-only): each agent with a positive weight
//!   searches its neighbourhood and sums one contribution per overlapping
//!   neighbour into a private [`Decoupling`]. Non-empty sums go onto a
//!   shared queue.
//! - **Accumulate** (sequential): the queue is drained into the agents'
//!   scratch fields in the store.
//! - **Resolve** (parallel): every agent moves by its averaged displacement
//!   and its scratch is reset, whether it overlapped or not.
//!
//! Resolve never re-checks containment; an agent pushed out of the grid is
//! caught by the next populate.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use cage_core::{AgentId, AgentStore, Body, Decoupling, Filter, Vec3, WorkerPool};
use cage_grid::Grid;
use crossbeam_channel::Receiver;
use tracing::{debug, instrument};

use crate::metrics::{DecoupleReport, PassMetrics};

/// Below this centre distance two spheres count as coincident and separate
/// along the X axis instead of their (unstable) centre line.
pub const DEGENERATE_DISTANCE: f32 = 0.01;

/// Displacement that `b` applies to `a`, or `None` when they do not overlap
/// or `a` does not decouple.
///
/// The overlap depth is split by weight: `a` takes
/// `weight_a / (weight_a + weight_b)` of it. Coincident spheres separate
/// along X, the larger id towards `-X`.
pub fn contribution(a_id: AgentId, a: &Body, b_id: AgentId, b: &Body) -> Option<Vec3> {
    let weight_a = a.sphere.decouple_weight;
    if weight_a <= 0.0 {
        return None;
    }
    let offset = a.position - b.position;
    let distance = offset.length();
    let overlap = a.sphere.radius + b.sphere.radius - distance;
    if overlap <= 0.0 {
        return None;
    }
    let strength = weight_a / (weight_a + b.sphere.decouple_weight.max(0.0));
    let direction = if distance <= DEGENERATE_DISTANCE {
        if a_id > b_id {
            Vec3::NEG_X
        } else {
            Vec3::X
        }
    } else {
        offset / distance
    };
    Some(direction * overlap * strength)
}

/// Result of the scan phase, waiting to be accumulated.
#[derive(Debug)]
pub struct Scan {
    /// Agents visited.
    pub scanned: usize,
    /// Agents skipped for a zero weight.
    pub skipped: usize,
    contributions: Receiver<(AgentId, Decoupling)>,
}

impl Scan {
    /// Number of agents with at least one contribution.
    pub fn overlapping(&self) -> usize {
        self.contributions.len()
    }
}

/// Scan phase. Reads the grid and the store, writes neither.
pub fn scan<S: AgentStore>(grid: &Grid, store: &S, pool: &WorkerPool) -> Scan {
    let (tx, rx) = crossbeam_channel::unbounded();
    let scanned = AtomicUsize::new(0);
    let skipped = AtomicUsize::new(0);

    store.operate_concurrently(pool, |agent, body| {
        scanned.fetch_add(1, Ordering::Relaxed);
        if !body.sphere.decouples() {
            skipped.fetch_add(1, Ordering::Relaxed);
            return;
        }
        let mut sum = Decoupling::default();
        grid.for_each_overlapping(
            body.position,
            body.sphere.radius,
            &Filter::ANY,
            store,
            |other, other_body| {
                if other == agent {
                    return;
                }
                if let Some(push) = contribution(agent, &body, other, &other_body) {
                    sum.push(push);
                }
            },
        );
        if !sum.is_empty() {
            // `rx` outlives every task.
            let _ = tx.send((agent, sum));
        }
    });

    Scan {
        scanned: scanned.into_inner(),
        skipped: skipped.into_inner(),
        contributions: rx,
    }
}

/// Accumulate phase. Commits scanned sums into the store, returning how
/// many agents received one. Agents gone from the store are dropped.
pub fn accumulate<S: AgentStore>(scan: &Scan, store: &mut S) -> usize {
    let mut committed = 0;
    for (agent, sum) in scan.contributions.try_iter() {
        if let Some(scratch) = store.decoupling_mut(agent) {
            scratch.merge(sum);
            committed += 1;
        }
    }
    committed
}

/// Resolve phase. Applies each agent's averaged displacement and resets
/// every agent's scratch. Returns the number of agents that had at least
/// one contribution, whether or not their average is zero.
pub fn resolve<S: AgentStore>(store: &mut S, pool: &WorkerPool) -> usize {
    let moved = AtomicUsize::new(0);
    store.operate_concurrently_mut(pool, |_, body| {
        if let Some(average) = body.decoupling.average() {
            *body.position += average;
            moved.fetch_add(1, Ordering::Relaxed);
        }
        body.decoupling.reset();
    });
    moved.into_inner()
}

/// Run scan, accumulate and resolve back to back.
#[instrument(skip_all, name = "decouple", fields(threads = pool.threads()))]
pub fn decouple<S: AgentStore>(grid: &Grid, store: &mut S, pool: &WorkerPool) -> DecoupleReport {
    let start = Instant::now();

    let scan_start = Instant::now();
    let scanned = scan(grid, store, pool);
    let scan_us = scan_start.elapsed().as_micros() as u64;

    let accumulate_start = Instant::now();
    let overlapping = accumulate(&scanned, store);
    let accumulate_us = accumulate_start.elapsed().as_micros() as u64;

    let resolve_start = Instant::now();
    let resolved = resolve(store, pool);
    let resolve_us = resolve_start.elapsed().as_micros() as u64;

    let report = DecoupleReport {
        scanned: scanned.scanned,
        skipped: scanned.skipped,
        overlapping,
        resolved,
        metrics: PassMetrics {
            total_us: start.elapsed().as_micros() as u64,
            phase_us: vec![
                ("scan", scan_us),
                ("accumulate", accumulate_us),
                ("resolve", resolve_us),
            ],
        },
    };
    debug!(
        scanned = report.scanned,
        skipped = report.skipped,
        overlapping = report.overlapping,
        resolved = report.resolved,
        total_us = report.metrics.total_us,
        "decouple done"
    );
    report
}
