//! The grid: cell storage, coordinate mapping and per-frame bookkeeping.

use std::sync::atomic::{AtomicU32, Ordering};

use cage_core::{Aabb, AgentId, Fingerprint};
use crossbeam_channel::{Receiver, Sender};
use glam::{IVec3, Vec3};

use crate::cell::Cell;
use crate::error::GridError;

/// Where the grid's world box sits.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BoundsSource {
    /// Box centred on this point.
    Centered(Vec3),
    /// Box whose minimum corner is this point.
    Corner(Vec3),
}

impl Default for BoundsSource {
    fn default() -> Self {
        Self::Centered(Vec3::ZERO)
    }
}

impl BoundsSource {
    /// Resolve to a world box for the given cell size and dimensions.
    pub fn resolve(self, cell_size: f32, size: IVec3) -> Aabb {
        let full = size.as_vec3() * cell_size;
        match self {
            Self::Centered(origin) => Aabb::from_center_extents(origin, full * 0.5),
            Self::Corner(min) => Aabb::new(min, min + full),
        }
    }
}

/// A uniform 3D grid of [`Cell`]s over a world-space box.
///
/// Cells are stored flat, x fastest, then y, then z. Besides the cells the
/// grid tracks the largest radius inserted since the last reset and a
/// worklist of cells that became occupied, so clearing costs time
/// proportional to the last frame's occupancy rather than the grid volume.
#[derive(Debug)]
pub struct Grid {
    cell_size: f32,
    size: IVec3,
    bounds: Aabb,
    cells: Vec<Cell>,
    occupied_tx: Sender<usize>,
    occupied_rx: Receiver<usize>,
    /// `f32` bits; radii are non-negative so the bits order like the floats.
    largest_radius: AtomicU32,
}

// Workers share `&Grid` during population.
const _: fn() = || {
    fn assert<T: Send + Sync>() {}
    assert::<Grid>();
};

impl Grid {
    /// Largest supported cell count; flat indices must fit an `i32`.
    pub const MAX_CELLS: i64 = i32::MAX as i64;

    /// Create an empty grid of `size` cells, each `cell_size` wide.
    pub fn new(cell_size: f32, size: IVec3, bounds: BoundsSource) -> Result<Self, GridError> {
        let cell_count = Self::check_dimensions(cell_size, size)?;
        let (occupied_tx, occupied_rx) = crossbeam_channel::unbounded();
        Ok(Self {
            cell_size,
            size,
            bounds: bounds.resolve(cell_size, size),
            cells: std::iter::repeat_with(Cell::default)
                .take(cell_count)
                .collect(),
            occupied_tx,
            occupied_rx,
            largest_radius: AtomicU32::new(0.0f32.to_bits()),
        })
    }

    /// Check that `cell_size` and `size` describe a usable grid, returning
    /// its cell count.
    pub fn check_dimensions(cell_size: f32, size: IVec3) -> Result<usize, GridError> {
        if !cell_size.is_finite() || cell_size <= 0.0 {
            return Err(GridError::InvalidCellSize { value: cell_size });
        }
        if size.min_element() < 1 {
            return Err(GridError::EmptyGrid { size });
        }
        let cells = i64::from(size.x) * i64::from(size.y) * i64::from(size.z);
        if cells >= Self::MAX_CELLS {
            return Err(GridError::CellCountOverflow {
                cells,
                max: Self::MAX_CELLS - 1,
            });
        }
        Ok(cells as usize)
    }

    /// Edge length of a cell in world units.
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Number of cells along each axis.
    pub fn size(&self) -> IVec3 {
        self.size
    }

    /// World-space box covered by the grid.
    pub fn bounds(&self) -> Aabb {
        self.bounds
    }

    /// Total number of cells.
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// All cells in flat index order.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    // ── Coordinate mapping ──────────────────────────────────────

    /// Cell coordinate containing `point`. No bounds checks.
    #[inline]
    pub fn world_to_cell(&self, point: Vec3) -> IVec3 {
        ((point - self.bounds.min) / self.cell_size)
            .floor()
            .as_ivec3()
    }

    /// Flat index of the cell at `(x, y, z)`, each axis clamped into range.
    ///
    /// Out-of-range coordinates resolve to a border cell. Check
    /// [`is_inside`](Self::is_inside) first when that matters.
    #[inline]
    pub fn cell_index(&self, x: i32, y: i32, z: i32) -> usize {
        let x = x.clamp(0, self.size.x - 1) as usize;
        let y = y.clamp(0, self.size.y - 1) as usize;
        let z = z.clamp(0, self.size.z - 1) as usize;
        x + self.size.x as usize * (y + self.size.y as usize * z)
    }

    /// Flat index of the cell at `coord`, clamped like [`cell_index`](Self::cell_index).
    #[inline]
    pub fn cell_index_at(&self, coord: IVec3) -> usize {
        self.cell_index(coord.x, coord.y, coord.z)
    }

    /// Flat index of the cell containing `point`, clamped.
    #[inline]
    pub fn cell_index_at_point(&self, point: Vec3) -> usize {
        self.cell_index_at(self.world_to_cell(point))
    }

    /// Cell coordinate of a flat index. Inverse of [`cell_index`](Self::cell_index)
    /// for in-range indices.
    pub fn cell_coord(&self, index: usize) -> IVec3 {
        let sx = self.size.x as usize;
        let layer = sx * self.size.y as usize;
        let z = index / layer;
        let rem = index - z * layer;
        IVec3::new((rem % sx) as i32, (rem / sx) as i32, z as i32)
    }

    /// Whether `coord` addresses a real cell. Never clamps.
    #[inline]
    pub fn is_inside(&self, coord: IVec3) -> bool {
        coord.cmpge(IVec3::ZERO).all() && coord.cmplt(self.size).all()
    }

    /// Whether `point` falls in a real cell. Non-finite points never do.
    #[inline]
    pub fn is_inside_point(&self, point: Vec3) -> bool {
        point.is_finite() && self.is_inside(self.world_to_cell(point))
    }

    // ── Cell access ─────────────────────────────────────────────

    /// The cell at `coord` (clamped).
    pub fn cell(&self, coord: IVec3) -> &Cell {
        &self.cells[self.cell_index_at(coord)]
    }

    /// The cell at `coord` (clamped), mutably.
    pub fn cell_mut(&mut self, coord: IVec3) -> &mut Cell {
        let index = self.cell_index_at(coord);
        &mut self.cells[index]
    }

    /// The cell containing `point` (clamped).
    pub fn cell_at_point(&self, point: Vec3) -> &Cell {
        self.cell(self.world_to_cell(point))
    }

    /// The cell containing `point` (clamped), mutably.
    pub fn cell_at_point_mut(&mut self, point: Vec3) -> &mut Cell {
        self.cell_mut(self.world_to_cell(point))
    }

    /// World-space box of the cell at `coord`.
    pub fn cell_box(&self, coord: IVec3) -> Aabb {
        let min = self.bounds.min + coord.as_vec3() * self.cell_size;
        Aabb::new(min, min + Vec3::splat(self.cell_size))
    }

    /// World-space box of the cell containing `point`.
    pub fn cell_box_at_point(&self, point: Vec3) -> Aabb {
        self.cell_box(self.world_to_cell(point))
    }

    // ── Population ──────────────────────────────────────────────

    /// Add `agent` to the cell at flat `index`, holding that cell's lock
    /// only. The index is queued for clearing when the cell was empty.
    ///
    /// Returns whether the agent was added (it is rejected if already
    /// present in that cell).
    pub fn insert(&self, index: usize, agent: AgentId, fingerprint: Fingerprint) -> bool {
        let mut slot = self.cells[index].lock();
        let was_empty = slot.is_empty();
        let added = slot.add(agent, fingerprint);
        drop(slot);
        if added && was_empty {
            // The receiver lives as long as `self`, so this cannot fail.
            let _ = self.occupied_tx.send(index);
        }
        added
    }

    /// Remove `agent` from the cell at flat `index`.
    pub fn remove(&self, index: usize, agent: AgentId) -> bool {
        self.cells[index].lock().remove(agent)
    }

    /// Number of entries waiting in the occupied-cells worklist.
    pub fn occupied_len(&self) -> usize {
        self.occupied_rx.len()
    }

    /// Drain the occupied-cells worklist, clearing each listed cell.
    ///
    /// Returns the number of worklist entries consumed. Entries naming an
    /// already empty cell are harmless.
    pub fn clear_occupied(&mut self) -> usize {
        let mut drained = 0;
        while let Ok(index) = self.occupied_rx.try_recv() {
            self.cells[index].clear();
            drained += 1;
        }
        drained
    }

    /// Empty every cell and the worklist, regardless of occupancy.
    pub fn clear_all(&mut self) {
        while self.occupied_rx.try_recv().is_ok() {}
        for cell in &mut self.cells {
            cell.clear();
        }
        self.reset_largest_radius();
    }

    /// Total number of agents across all cells.
    pub fn agent_count(&self) -> usize {
        self.cells.iter().map(|c| c.read().len()).sum()
    }

    /// Flat indices of every cell holding `agent`. Scans the whole grid.
    pub fn cells_containing(&self, agent: AgentId) -> Vec<usize> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, c)| c.read().contains(agent))
            .map(|(i, _)| i)
            .collect()
    }

    // ── Largest radius ──────────────────────────────────────────

    /// Largest radius inserted since the last reset.
    pub fn largest_radius(&self) -> f32 {
        f32::from_bits(self.largest_radius.load(Ordering::Acquire))
    }

    /// Raise the tracked largest radius to at least `radius`. Lock-free.
    pub fn raise_largest_radius(&self, radius: f32) {
        let mut current = self.largest_radius.load(Ordering::Relaxed);
        while f32::from_bits(current) < radius {
            match self.largest_radius.compare_exchange_weak(
                current,
                radius.to_bits(),
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => break,
                Err(observed) => current = observed,
            }
        }
    }

    /// Set the tracked largest radius back to zero.
    pub fn reset_largest_radius(&mut self) {
        *self.largest_radius.get_mut() = 0.0f32.to_bits();
    }

    // ── Reconfiguration ─────────────────────────────────────────

    /// Move the grid's world box. All cells are emptied.
    pub fn relocate(&mut self, bounds: BoundsSource) {
        self.bounds = bounds.resolve(self.cell_size, self.size);
        self.clear_all();
    }

    /// Change the cell size and dimensions, keeping the box's centre.
    /// All cells are emptied. On error the grid is left untouched.
    pub fn resize(&mut self, cell_size: f32, size: IVec3) -> Result<(), GridError> {
        let center = self.bounds.center();
        *self = Self::new(cell_size, size, BoundsSource::Centered(center))?;
        Ok(())
    }
}
