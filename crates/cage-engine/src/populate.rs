//! The populate pass: rebuild the grid from current agent positions.
//!
//! 1. Drain the occupied-cells worklist, clearing only last frame's cells.
//! 2. Reset the largest-radius tracker.
//! 3. Fan out over every agent with a sphere. Out-of-bounds agents get a
//!    deferred despawn and no cell. Agents already awaiting a despawn are
//!    skipped. The rest raise the radius tracker and land in their cell
//!    under that cell's lock alone.
//! 4. Let the store apply the despawns.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use cage_core::{AgentStore, WorkerPool};
use cage_grid::Grid;
use tracing::{debug, instrument, trace, warn};

use crate::metrics::{PassMetrics, PopulateReport};

/// Run one populate pass over `store` on `pool`.
#[instrument(skip_all, name = "populate", fields(threads = pool.threads()))]
pub fn populate<S: AgentStore>(grid: &mut Grid, store: &mut S, pool: &WorkerPool) -> PopulateReport {
    let start = Instant::now();

    let clear_start = Instant::now();
    let cells_cleared = grid.clear_occupied();
    grid.reset_largest_radius();
    let clear_us = clear_start.elapsed().as_micros() as u64;

    let fill_start = Instant::now();
    let mut pending = store.pending_despawns();
    pending.sort_unstable();
    let inserted = AtomicUsize::new(0);
    let out_of_bounds = AtomicUsize::new(0);
    {
        let grid: &Grid = grid;
        let store: &S = store;
        let pending = pending.as_slice();
        store.operate_concurrently(pool, |agent, body| {
            if pending.binary_search(&agent).is_ok() {
                return;
            }
            if !grid.is_inside_point(body.position) {
                trace!(%agent, position = ?body.position, "agent left the grid");
                store.despawn_deferred(agent);
                out_of_bounds.fetch_add(1, Ordering::Relaxed);
                return;
            }
            grid.raise_largest_radius(body.sphere.radius);
            let index = grid.cell_index_at_point(body.position);
            if grid.insert(index, agent, body.fingerprint) {
                inserted.fetch_add(1, Ordering::Relaxed);
            }
        });
    }
    let fill_us = fill_start.elapsed().as_micros() as u64;

    let despawn_start = Instant::now();
    let despawned = store.apply_deferreds();
    let despawn_us = despawn_start.elapsed().as_micros() as u64;

    let largest_radius = grid.largest_radius();
    check_cell_size(grid);

    let report = PopulateReport {
        cells_cleared,
        inserted: inserted.into_inner(),
        despawned,
        largest_radius,
        metrics: PassMetrics {
            total_us: start.elapsed().as_micros() as u64,
            phase_us: vec![("clear", clear_us), ("fill", fill_us), ("despawn", despawn_us)],
        },
    };
    debug!(
        cleared = report.cells_cleared,
        inserted = report.inserted,
        out_of_bounds = out_of_bounds.into_inner(),
        despawned = report.despawned.len(),
        largest_radius,
        total_us = report.metrics.total_us,
        "populate done"
    );
    report
}

/// Neighbour searches only reach adjacent cells reliably while every
/// diameter fits in a cell.
fn check_cell_size(grid: &Grid) {
    let diameter = grid.largest_radius() * 2.0;
    debug_assert!(
        diameter <= grid.cell_size(),
        "agent diameter {diameter} exceeds cell size {}",
        grid.cell_size()
    );
    if diameter > grid.cell_size() {
        warn!(
            diameter,
            cell_size = grid.cell_size(),
            "largest agent is wider than a cell; overlaps may be missed"
        );
    }
}
