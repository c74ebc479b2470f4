//! Cage configuration, validation, and error types.

use std::error::Error;
use std::fmt;

use cage_core::PoolError;
use cage_grid::{BoundsSource, Grid, GridError};
use glam::IVec3;
use tracing::warn;

// ── CageConfig ─────────────────────────────────────────────────────

/// Everything needed to build a [`BubbleCage`](crate::BubbleCage).
#[derive(Clone, Debug, PartialEq)]
pub struct CageConfig {
    /// Edge length of a cell. Should be at least twice the largest agent
    /// radius. Default: 1.0.
    pub cell_size: f32,
    /// Cells along each axis. Default: 16³.
    pub size: IVec3,
    /// Placement of the grid's world box. Default: centred on the origin.
    pub bounds: BoundsSource,
    /// Worker threads per pass. `None` = auto-detect
    /// (`available_parallelism`, clamped to `[1, 16]`).
    pub threads_count: Option<usize>,
    /// Whether [`evaluate`](crate::BubbleCage::evaluate) repopulates after
    /// decoupling so the grid matches the corrected positions. Default: true.
    pub repopulate_after_decouple: bool,
}

impl Default for CageConfig {
    fn default() -> Self {
        Self {
            cell_size: 1.0,
            size: IVec3::splat(16),
            bounds: BoundsSource::default(),
            threads_count: None,
            repopulate_after_decouple: true,
        }
    }
}

impl CageConfig {
    /// Maximum explicit thread count.
    pub const MAX_THREADS: usize = 64;

    /// Check the grid dimensions without building anything.
    pub fn validate(&self) -> Result<(), ConfigError> {
        Grid::check_dimensions(self.cell_size, self.size)?;
        Ok(())
    }

    /// Resolve the actual thread count, applying auto-detection if `None`.
    ///
    /// Explicit values are clamped to `[1, 64]`.
    pub fn resolved_threads_count(&self) -> usize {
        match self.threads_count {
            Some(n) => {
                let clamped = n.clamp(1, Self::MAX_THREADS);
                if clamped != n {
                    warn!(requested = n, used = clamped, "threads_count clamped");
                }
                clamped
            }
            None => std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4)
                .clamp(1, 16),
        }
    }
}

// ── ConfigError ────────────────────────────────────────────────────

/// Errors raised while building or reconfiguring a cage.
#[derive(Debug, PartialEq)]
pub enum ConfigError {
    /// The grid dimensions are unusable.
    Grid(GridError),
    /// The worker pool could not be built.
    Pool(PoolError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Grid(e) => write!(f, "grid: {e}"),
            Self::Pool(e) => write!(f, "worker pool: {e}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Grid(e) => Some(e),
            Self::Pool(e) => Some(e),
        }
    }
}

impl From<GridError> for ConfigError {
    fn from(e: GridError) -> Self {
        Self::Grid(e)
    }
}

impl From<PoolError> for ConfigError {
    fn from(e: PoolError) -> Self {
        Self::Pool(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        let c = CageConfig::default();
        assert!(c.validate().is_ok());
        assert_eq!(c.cell_size, 1.0);
        assert_eq!(c.size, IVec3::splat(16));
        assert!(c.repopulate_after_decouple);
    }

    #[test]
    fn bad_grid_is_reported() {
        let c = CageConfig {
            cell_size: -2.0,
            ..CageConfig::default()
        };
        assert!(matches!(
            c.validate(),
            Err(ConfigError::Grid(GridError::InvalidCellSize { .. }))
        ));
    }

    #[test]
    fn explicit_threads_are_clamped() {
        let mut c = CageConfig {
            threads_count: Some(0),
            ..CageConfig::default()
        };
        assert_eq!(c.resolved_threads_count(), 1);
        c.threads_count = Some(1000);
        assert_eq!(c.resolved_threads_count(), 64);
        c.threads_count = Some(4);
        assert_eq!(c.resolved_threads_count(), 4);
    }

    #[test]
    fn auto_threads_in_range() {
        let n = CageConfig::default().resolved_threads_count();
        assert!((1..=16).contains(&n));
    }

    #[test]
    fn error_source_chains() {
        let e = ConfigError::from(PoolError::NoThreads);
        assert!(e.source().is_some());
        assert!(e.to_string().starts_with("worker pool:"));
    }
}
