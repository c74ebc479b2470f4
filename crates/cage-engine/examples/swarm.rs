//! Swarm: a crowd of spheres relaxing inside a bubble cage.
//!
//! Demonstrates:
//!   1. Building a cage from a `CageConfig`
//!   2. Spawning tagged agents into an `AgentArena`
//!   3. Running `evaluate` until overlaps settle
//!   4. Querying the grid, with and without a tag filter
//!
//! Run with:
//!   RUST_LOG=debug cargo run --example swarm

use std::error::Error;

use cage_arena::AgentArena;
use cage_core::{Filter, Fingerprint, Sphere, Vec3};
use cage_engine::{BubbleCage, CageConfig};
use cage_grid::BoundsSource;
use glam::IVec3;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use tracing::info;
use tracing_subscriber::EnvFilter;

// ─── Parameters ─────────────────────────────────────────────────

const AGENTS: usize = 2_000;
const RADIUS: f32 = 0.45;
const SPREAD: f32 = 6.0;
const ROUNDS: usize = 20;
const SEED: u64 = 42;

const SCOUT: Fingerprint = Fingerprint::tag(0);

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let mut cage = BubbleCage::new(CageConfig {
        cell_size: 1.0,
        size: IVec3::splat(24),
        bounds: BoundsSource::Centered(Vec3::ZERO),
        threads_count: None,
        repopulate_after_decouple: true,
    })?;

    let mut rng = ChaCha8Rng::seed_from_u64(SEED);
    let mut agents = AgentArena::with_capacity(AGENTS);
    for i in 0..AGENTS {
        let position = Vec3::new(
            rng.random_range(-SPREAD..SPREAD),
            rng.random_range(-SPREAD..SPREAD),
            rng.random_range(-SPREAD..SPREAD),
        );
        let tags = if i % 10 == 0 { SCOUT } else { Fingerprint::EMPTY };
        agents.spawn_tagged(position, Some(Sphere::new(RADIUS)), tags)?;
    }

    for round in 0..ROUNDS {
        let report = cage.evaluate(&mut agents);
        info!(
            round,
            overlapping = report.decouple.overlapping,
            despawned = report.populate.despawned.len(),
            total_us = report.total_us,
            "evaluated"
        );
        if report.decouple.overlapping == 0 {
            break;
        }
    }

    let near = cage.get_overlapping(Vec3::ZERO, 2.0, &agents);
    let scouts = cage.get_overlapping_filtered(Vec3::ZERO, 2.0, &Filter::including(SCOUT), &agents);
    info!(
        alive = agents.len(),
        near = near.len(),
        scouts = scouts.len(),
        "final state"
    );
    Ok(())
}
