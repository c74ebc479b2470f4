//! Benchmark profiles for the bubble cage.
//!
//! - [`reference_profile`]: 32³ cells, 10K agents at moderate density
//! - [`dense_profile`]: 16³ cells, 10K agents packed tightly
//! - [`init_agent_positions`]: deterministic agent placement via seed

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use cage_arena::{AgentArena, ArenaError};
use cage_core::Sphere;
use cage_engine::CageConfig;
use cage_grid::BoundsSource;
use glam::{IVec3, Vec3};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

/// A cage configuration plus the agents to run it against.
pub struct Profile {
    /// Cage settings.
    pub config: CageConfig,
    /// Agents, all inside the grid.
    pub agents: AgentArena,
}

/// 32³ cells of size 1 with 10K agents of radius 0.3 to 0.5.
pub fn reference_profile(seed: u64, threads: Option<usize>) -> Result<Profile, ArenaError> {
    profile(32, 10_000, seed, threads)
}

/// 16³ cells of size 1 with 10K agents of radius 0.3 to 0.5: heavy overlap.
pub fn dense_profile(seed: u64, threads: Option<usize>) -> Result<Profile, ArenaError> {
    profile(16, 10_000, seed, threads)
}

fn profile(cells: i32, count: usize, seed: u64, threads: Option<usize>) -> Result<Profile, ArenaError> {
    let config = CageConfig {
        cell_size: 1.0,
        size: IVec3::splat(cells),
        bounds: BoundsSource::Centered(Vec3::ZERO),
        threads_count: threads,
        repopulate_after_decouple: true,
    };
    // Keep a margin so the first frames do not despawn anything.
    let half = cells as f32 * 0.5 - 1.0;
    let mut rng = ChaCha8Rng::seed_from_u64(seed.wrapping_add(1));
    let mut agents = AgentArena::with_capacity(count);
    for p in init_agent_positions(count, half, seed) {
        let radius = rng.random_range(0.3f32..0.5);
        agents.spawn(p, Some(Sphere::new(radius)))?;
    }
    Ok(Profile { config, agents })
}

/// `count` positions in `[-half, half)³`, deterministic for a seed.
pub fn init_agent_positions(count: usize, half: f32, seed: u64) -> Vec<Vec3> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            Vec3::new(
                rng.random_range(-half..half),
                rng.random_range(-half..half),
                rng.random_range(-half..half),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positions_are_deterministic_and_bounded() {
        let a = init_agent_positions(100, 3.0, 9);
        let b = init_agent_positions(100, 3.0, 9);
        assert_eq!(a, b);
        assert!(a.iter().all(|p| p.abs().max_element() < 3.0));
    }

    #[test]
    fn profiles_are_valid() {
        let p = reference_profile(1, Some(2)).unwrap();
        assert!(p.config.validate().is_ok());
        assert_eq!(p.agents.len(), 10_000);
    }
}
