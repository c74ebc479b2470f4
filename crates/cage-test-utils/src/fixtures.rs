//! Reusable grids and agent layouts.

use cage_arena::AgentArena;
use cage_core::{Aabb, AgentId, Sphere};
use cage_grid::{BoundsSource, Grid};
use glam::{IVec3, Vec3};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

/// Cell size of the reference scenario.
pub const SCENARIO_CELL_SIZE: f32 = 2.0;

/// Dimensions of the reference scenario: 4³ cells spanning `[-4, 4]³`.
pub const SCENARIO_SIZE: IVec3 = IVec3::splat(4);

/// The reference scenario grid, centred on the origin.
pub fn scenario_grid() -> Grid {
    match Grid::new(SCENARIO_CELL_SIZE, SCENARIO_SIZE, BoundsSource::Centered(Vec3::ZERO)) {
        Ok(grid) => grid,
        Err(e) => panic!("scenario grid: {e}"),
    }
}

/// Spawn a sphere agent, panicking on arena errors.
pub fn spawn(arena: &mut AgentArena, position: Vec3, sphere: Sphere) -> AgentId {
    match arena.spawn(position, Some(sphere)) {
        Ok(id) => id,
        Err(e) => panic!("spawn: {e}"),
    }
}

/// Agents on a regular lattice with the given spacing, starting at `origin`.
pub fn lattice(
    arena: &mut AgentArena,
    origin: Vec3,
    counts: IVec3,
    spacing: f32,
    radius: f32,
) -> Vec<AgentId> {
    let mut ids = Vec::with_capacity((counts.x * counts.y * counts.z).max(0) as usize);
    for z in 0..counts.z {
        for y in 0..counts.y {
            for x in 0..counts.x {
                let p = origin + IVec3::new(x, y, z).as_vec3() * spacing;
                ids.push(spawn(arena, p, Sphere::new(radius)));
            }
        }
    }
    ids
}

/// Positions drawn uniformly from `region`, deterministic for a seed.
pub fn scatter(seed: u64, count: usize, region: Aabb) -> Vec<Vec3> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            Vec3::new(
                rng.random_range(region.min.x..region.max.x),
                rng.random_range(region.min.y..region.max.y),
                rng.random_range(region.min.z..region.max.z),
            )
        })
        .collect()
}

/// A seeded swarm: `count` agents scattered in `region`, radii drawn from
/// `(0, max_radius]` and weights from `[0, 2)`.
pub fn seeded_swarm(seed: u64, count: usize, region: Aabb, max_radius: f32) -> AgentArena {
    let mut rng = ChaCha8Rng::seed_from_u64(seed ^ 0x5eed);
    let mut arena = AgentArena::with_capacity(count);
    for p in scatter(seed, count, region) {
        let radius = max_radius * (1.0 - rng.random::<f32>());
        let weight = rng.random_range(0.0f32..2.0);
        spawn(&mut arena, p, Sphere::weighted(radius, weight));
    }
    arena
}

/// Centre distance between two live agents.
pub fn distance(arena: &AgentArena, a: AgentId, b: AgentId) -> Option<f32> {
    Some(arena.position_of(a)?.distance(arena.position_of(b)?))
}
