//! [`BubbleCage`]: the grid, its worker pool and the evaluate cycle.

use std::time::Instant;

use cage_core::{AgentId, AgentLookup, AgentStore, Filter, Vec3, WorkerPool};
use cage_grid::{BoundsSource, Grid};
use glam::IVec3;
use tracing::{debug, info, instrument};

use crate::config::{CageConfig, ConfigError};
use crate::decouple;
use crate::metrics::{DecoupleReport, EvaluateReport, PopulateReport};
use crate::populate;

/// Broad-phase overlap detection and separation for sphere agents.
///
/// The cage owns its grid and worker pool but not the agents; every pass
/// takes the [`AgentStore`] to operate on. Calls must be serialised by the
/// caller (they take `&mut self`), while the work inside each pass is
/// spread over the pool.
///
/// ```
/// use cage_arena::AgentArena;
/// use cage_core::{Sphere, Vec3};
/// use cage_engine::{BubbleCage, CageConfig};
///
/// let mut cage = BubbleCage::new(CageConfig {
///     cell_size: 2.0,
///     threads_count: Some(2),
///     ..CageConfig::default()
/// })?;
/// let mut agents = AgentArena::new();
/// let a = agents.spawn(Vec3::ZERO, Some(Sphere::new(1.0)))?;
/// let b = agents.spawn(Vec3::new(0.5, 0.0, 0.0), Some(Sphere::new(1.0)))?;
///
/// cage.evaluate(&mut agents);
/// let gap = agents.position_of(b).unwrap() - agents.position_of(a).unwrap();
/// assert!((gap.length() - 2.0).abs() < 1e-4);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct BubbleCage {
    config: CageConfig,
    grid: Grid,
    pool: WorkerPool,
}

impl BubbleCage {
    /// Build the grid and worker pool described by `config`.
    pub fn new(config: CageConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let grid = Grid::new(config.cell_size, config.size, config.bounds)?;
        let pool = WorkerPool::new(config.resolved_threads_count())?;
        info!(
            cell_size = config.cell_size,
            size = %config.size,
            cells = grid.cell_count(),
            threads = pool.threads(),
            "bubble cage initialised"
        );
        Ok(Self { config, grid, pool })
    }

    /// The configuration in effect.
    pub fn config(&self) -> &CageConfig {
        &self.config
    }

    /// The grid, as left by the last populate.
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// The worker pool used by every pass.
    pub fn pool(&self) -> &WorkerPool {
        &self.pool
    }

    /// Number of worker threads.
    pub fn threads_count(&self) -> usize {
        self.pool.threads()
    }

    /// Replace the worker pool. `None` selects the automatic count.
    pub fn set_threads_count(&mut self, threads_count: Option<usize>) -> Result<(), ConfigError> {
        let config = CageConfig {
            threads_count,
            ..self.config.clone()
        };
        self.pool = WorkerPool::new(config.resolved_threads_count())?;
        self.config = config;
        debug!(threads = self.pool.threads(), "worker pool rebuilt");
        Ok(())
    }

    /// Move the grid. All cells are emptied until the next populate.
    pub fn relocate(&mut self, bounds: BoundsSource) {
        self.grid.relocate(bounds);
        self.config.bounds = bounds;
    }

    /// Change cell size and dimensions around the current centre. All
    /// cells are emptied until the next populate.
    pub fn resize(&mut self, cell_size: f32, size: IVec3) -> Result<(), ConfigError> {
        self.grid.resize(cell_size, size)?;
        self.config.cell_size = cell_size;
        self.config.size = size;
        self.config.bounds = BoundsSource::Centered(self.grid.bounds().center());
        Ok(())
    }

    // ── Passes ──────────────────────────────────────────────────

    /// Populate only.
    pub fn update<S: AgentStore>(&mut self, store: &mut S) -> PopulateReport {
        populate::populate(&mut self.grid, store, &self.pool)
    }

    /// Decouple only, against the grid as last populated.
    pub fn decouple<S: AgentStore>(&mut self, store: &mut S) -> DecoupleReport {
        decouple::decouple(&self.grid, store, &self.pool)
    }

    /// Populate, decouple, then repopulate if
    /// [`repopulate_after_decouple`](CageConfig::repopulate_after_decouple)
    /// is set.
    #[instrument(skip_all, name = "evaluate")]
    pub fn evaluate<S: AgentStore>(&mut self, store: &mut S) -> EvaluateReport {
        let start = Instant::now();
        let populate = self.update(store);
        let decouple = self.decouple(store);
        let repopulate = if self.config.repopulate_after_decouple {
            Some(self.update(store))
        } else {
            None
        };
        EvaluateReport {
            populate,
            decouple,
            repopulate,
            total_us: start.elapsed().as_micros() as u64,
        }
    }

    // ── Queries ─────────────────────────────────────────────────

    /// Agents whose sphere contains `location`.
    pub fn get_overlapping_point<L>(&self, location: Vec3, lookup: &L) -> Vec<AgentId>
    where
        L: AgentLookup + ?Sized,
    {
        self.grid.overlapping_point(location, lookup)
    }

    /// Agents whose sphere overlaps a sphere of `radius` at `location`.
    pub fn get_overlapping<L>(&self, location: Vec3, radius: f32, lookup: &L) -> Vec<AgentId>
    where
        L: AgentLookup + ?Sized,
    {
        self.grid.overlapping(location, radius, lookup)
    }

    /// [`get_overlapping`](Self::get_overlapping) restricted to agents
    /// matching `filter`.
    pub fn get_overlapping_filtered<L>(
        &self,
        location: Vec3,
        radius: f32,
        filter: &Filter,
        lookup: &L,
    ) -> Vec<AgentId>
    where
        L: AgentLookup + ?Sized,
    {
        self.grid.overlapping_filtered(location, radius, filter, lookup)
    }

    /// [`get_overlapping`](Self::get_overlapping) into a reused buffer.
    pub fn get_overlapping_into<L>(
        &self,
        location: Vec3,
        radius: f32,
        lookup: &L,
        out: &mut Vec<AgentId>,
    ) -> usize
    where
        L: AgentLookup + ?Sized,
    {
        self.grid.overlapping_into(location, radius, lookup, out)
    }
}
