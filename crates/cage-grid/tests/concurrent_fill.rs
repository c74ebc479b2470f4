//! Many threads filling one grid at once.

use std::collections::HashSet;

use cage_core::{AgentId, Fingerprint};
use cage_grid::{BoundsSource, Grid};
use glam::{IVec3, Vec3};
use proptest::prelude::*;

fn fill(grid: &Grid, points: &[Vec3], threads: usize) {
    let chunk = points.len().div_ceil(threads).max(1);
    std::thread::scope(|s| {
        for (t, part) in points.chunks(chunk).enumerate() {
            s.spawn(move || {
                for (i, &p) in part.iter().enumerate() {
                    let id = AgentId::new((t * chunk + i) as u32, 0);
                    let fp = Fingerprint::tag((t % 64) as u32);
                    grid.insert(grid.cell_index_at_point(p), id, fp);
                }
            });
        }
    });
}

#[test]
fn every_agent_lands_in_exactly_one_cell() {
    let grid = Grid::new(1.0, IVec3::splat(8), BoundsSource::Centered(Vec3::ZERO)).unwrap();
    let points: Vec<Vec3> = (0..2000)
        .map(|i| {
            let f = i as f32;
            Vec3::new((f * 0.37).sin() * 3.9, (f * 0.11).cos() * 3.9, (f * 0.73).sin() * 3.9)
        })
        .collect();
    fill(&grid, &points, 8);

    assert_eq!(grid.agent_count(), points.len());
    for (i, &p) in points.iter().enumerate() {
        let homes = grid.cells_containing(AgentId::new(i as u32, 0));
        assert_eq!(homes, vec![grid.cell_index_at_point(p)]);
    }
}

#[test]
fn worklist_matches_occupied_cells_then_clears() {
    let mut grid = Grid::new(1.0, IVec3::splat(8), BoundsSource::Centered(Vec3::ZERO)).unwrap();
    let points: Vec<Vec3> = (0..500)
        .map(|i| Vec3::splat(-3.5) + Vec3::new((i % 7) as f32, (i % 5) as f32, (i % 3) as f32))
        .collect();
    fill(&grid, &points, 4);

    let distinct: HashSet<usize> = points.iter().map(|&p| grid.cell_index_at_point(p)).collect();
    assert_eq!(grid.occupied_len(), distinct.len());
    assert_eq!(grid.clear_occupied(), distinct.len());
    assert_eq!(grid.agent_count(), 0);
    assert_eq!(grid.occupied_len(), 0);
}

#[test]
fn cell_signature_is_union_of_occupants() {
    let grid = Grid::new(2.0, IVec3::splat(2), BoundsSource::Corner(Vec3::ZERO)).unwrap();
    grid.insert(0, AgentId::new(0, 0), Fingerprint::tag(3));
    grid.insert(0, AgentId::new(1, 0), Fingerprint::tag(5));
    let sig = grid.cells()[0].read().fingerprint();
    assert!(sig.contains(Fingerprint::tag(3) | Fingerprint::tag(5)));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn fill_then_clear_leaves_grid_empty(
        coords in prop::collection::vec((-8.0f32..8.0, -8.0f32..8.0, -8.0f32..8.0), 0..300),
        threads in 1usize..6,
    ) {
        let mut grid = Grid::new(2.0, IVec3::splat(8), BoundsSource::Centered(Vec3::ZERO)).unwrap();
        let points: Vec<Vec3> = coords.into_iter().map(|(x, y, z)| Vec3::new(x, y, z)).collect();
        fill(&grid, &points, threads);
        prop_assert_eq!(grid.agent_count(), points.len());
        grid.clear_occupied();
        prop_assert_eq!(grid.agent_count(), 0);
    }
}
