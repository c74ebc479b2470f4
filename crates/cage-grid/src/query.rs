//! Neighbourhood queries against the current grid contents.
//!
//! Every query widens its search box by the largest radius seen in the last
//! populate, since an overlapping agent may be centred in a cell further out
//! than the query radius alone would reach. Candidate cells come from the
//! inclusive cell range of that box, restricted to real cells; candidates
//! are then tested with exact sphere distance.

use cage_core::{AgentId, AgentLookup, Body, Filter, Vec3};
use glam::IVec3;

use crate::cell::CellSlot;
use crate::grid::Grid;

impl Grid {
    /// Inclusive range of real cell coordinates within `reach` of `location`.
    ///
    /// Returns `None` when the range misses the grid entirely.
    pub fn cell_range(&self, location: Vec3, reach: f32) -> Option<(IVec3, IVec3)> {
        let reach = Vec3::splat(reach.max(0.0));
        let lo = self.world_to_cell(location - reach).max(IVec3::ZERO);
        let hi = self
            .world_to_cell(location + reach)
            .min(self.size() - IVec3::ONE);
        lo.cmple(hi).all().then_some((lo, hi))
    }

    /// Call `f` for every cell that may hold an agent overlapping a sphere
    /// of `radius` at `location`, with that cell's read lock held.
    pub fn visit_cells<F>(&self, location: Vec3, radius: f32, mut f: F)
    where
        F: FnMut(usize, &CellSlot),
    {
        let Some((lo, hi)) = self.cell_range(location, radius + self.largest_radius()) else {
            return;
        };
        for z in lo.z..=hi.z {
            for y in lo.y..=hi.y {
                for x in lo.x..=hi.x {
                    let index = self.cell_index(x, y, z);
                    let slot = self.cells()[index].read();
                    if !slot.is_empty() {
                        f(index, &slot);
                    }
                }
            }
        }
    }

    /// Call `f` for every agent whose sphere overlaps a sphere of `radius`
    /// at `location`. A radius of zero tests against the point itself.
    ///
    /// Agents the lookup no longer knows are skipped.
    pub fn for_each_overlapping<L, F>(
        &self,
        location: Vec3,
        radius: f32,
        filter: &Filter,
        lookup: &L,
        mut f: F,
    ) where
        L: AgentLookup + ?Sized,
        F: FnMut(AgentId, Body),
    {
        let radius = radius.max(0.0);
        self.visit_cells(location, radius, |_, slot| {
            if !filter.may_match(slot.fingerprint()) {
                return;
            }
            for &agent in slot.agents() {
                let Some(body) = lookup.body(agent) else {
                    continue;
                };
                if !filter.matches(body.fingerprint) {
                    continue;
                }
                if body.sphere.radius + radius > body.position.distance(location) {
                    f(agent, body);
                }
            }
        });
    }

    /// Agents whose sphere contains `location`.
    pub fn overlapping_point<L>(&self, location: Vec3, lookup: &L) -> Vec<AgentId>
    where
        L: AgentLookup + ?Sized,
    {
        self.overlapping_filtered(location, 0.0, &Filter::ANY, lookup)
    }

    /// Agents whose sphere overlaps a sphere of `radius` at `location`.
    pub fn overlapping<L>(&self, location: Vec3, radius: f32, lookup: &L) -> Vec<AgentId>
    where
        L: AgentLookup + ?Sized,
    {
        self.overlapping_filtered(location, radius, &Filter::ANY, lookup)
    }

    /// Like [`overlapping`](Self::overlapping), keeping only agents that
    /// match `filter`.
    pub fn overlapping_filtered<L>(
        &self,
        location: Vec3,
        radius: f32,
        filter: &Filter,
        lookup: &L,
    ) -> Vec<AgentId>
    where
        L: AgentLookup + ?Sized,
    {
        let mut out = Vec::new();
        self.overlapping_filtered_into(location, radius, filter, lookup, &mut out);
        out
    }

    /// [`overlapping_point`](Self::overlapping_point) into a reused buffer.
    /// Returns the number of agents appended.
    pub fn overlapping_point_into<L>(&self, location: Vec3, lookup: &L, out: &mut Vec<AgentId>) -> usize
    where
        L: AgentLookup + ?Sized,
    {
        self.overlapping_filtered_into(location, 0.0, &Filter::ANY, lookup, out)
    }

    /// [`overlapping`](Self::overlapping) into a reused buffer.
    /// Returns the number of agents appended.
    pub fn overlapping_into<L>(
        &self,
        location: Vec3,
        radius: f32,
        lookup: &L,
        out: &mut Vec<AgentId>,
    ) -> usize
    where
        L: AgentLookup + ?Sized,
    {
        self.overlapping_filtered_into(location, radius, &Filter::ANY, lookup, out)
    }

    /// [`overlapping_filtered`](Self::overlapping_filtered) into a reused
    /// buffer. Returns the number of agents appended.
    pub fn overlapping_filtered_into<L>(
        &self,
        location: Vec3,
        radius: f32,
        filter: &Filter,
        lookup: &L,
        out: &mut Vec<AgentId>,
    ) -> usize
    where
        L: AgentLookup + ?Sized,
    {
        let before = out.len();
        self.for_each_overlapping(location, radius, filter, lookup, |agent, _| out.push(agent));
        out.len() - before
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use cage_core::{Fingerprint, Sphere};

    use super::*;
    use crate::grid::BoundsSource;

    const RED: Fingerprint = Fingerprint::tag(0);
    const BLUE: Fingerprint = Fingerprint::tag(1);

    #[derive(Default)]
    struct Bodies(HashMap<AgentId, Body>);

    impl AgentLookup for Bodies {
        fn body(&self, agent: AgentId) -> Option<Body> {
            self.0.get(&agent).copied()
        }
    }

    struct World {
        grid: Grid,
        bodies: Bodies,
    }

    impl World {
        fn new() -> Self {
            Self {
                grid: Grid::new(2.0, IVec3::splat(4), BoundsSource::Centered(Vec3::ZERO)).unwrap(),
                bodies: Bodies::default(),
            }
        }

        fn place(&mut self, i: u32, position: Vec3, radius: f32, fingerprint: Fingerprint) -> AgentId {
            let id = AgentId::new(i, 0);
            let body = Body {
                position,
                sphere: Sphere::new(radius),
                fingerprint,
            };
            self.bodies.0.insert(id, body);
            let index = self.grid.cell_index_at_point(position);
            self.grid.insert(index, id, fingerprint);
            self.grid.raise_largest_radius(radius);
            id
        }
    }

    fn sorted(mut v: Vec<AgentId>) -> Vec<AgentId> {
        v.sort();
        v
    }

    #[test]
    fn point_query_hits_containing_sphere() {
        let mut w = World::new();
        let a = w.place(0, Vec3::ZERO, 1.0, Fingerprint::EMPTY);
        assert_eq!(w.grid.overlapping_point(Vec3::splat(0.5), &w.bodies), vec![a]);
        assert!(w.grid.overlapping_point(Vec3::new(1.0, 0.0, 0.0), &w.bodies).is_empty());
    }

    #[test]
    fn zero_radius_matches_point_form() {
        let mut w = World::new();
        w.place(0, Vec3::ZERO, 1.0, Fingerprint::EMPTY);
        w.place(1, Vec3::new(1.5, 0.0, 0.0), 1.0, Fingerprint::EMPTY);
        let p = Vec3::new(0.8, 0.0, 0.0);
        assert_eq!(
            sorted(w.grid.overlapping(p, 0.0, &w.bodies)),
            sorted(w.grid.overlapping_point(p, &w.bodies)),
        );
        assert_eq!(w.grid.overlapping_point(p, &w.bodies).len(), 2);
    }

    #[test]
    fn sphere_query_reaches_neighbour_cell() {
        let mut w = World::new();
        let far = w.place(0, Vec3::new(2.5, 0.5, 0.5), 1.0, Fingerprint::EMPTY);
        let hits = w.grid.overlapping(Vec3::new(1.2, 0.5, 0.5), 0.5, &w.bodies);
        assert_eq!(hits, vec![far]);
    }

    #[test]
    fn query_outside_grid_is_empty() {
        let mut w = World::new();
        w.place(0, Vec3::ZERO, 1.0, Fingerprint::EMPTY);
        assert!(w.grid.overlapping(Vec3::splat(10.0), 0.1, &w.bodies).is_empty());
        assert_eq!(w.grid.overlapping(Vec3::ZERO, 0.1, &w.bodies).len(), 1);
    }

    #[test]
    fn query_box_straddling_border_is_clipped() {
        let mut w = World::new();
        let edge = w.place(0, Vec3::new(3.9, 0.0, 0.0), 0.5, Fingerprint::EMPTY);
        let hits = w.grid.overlapping(Vec3::new(4.2, 0.0, 0.0), 0.5, &w.bodies);
        assert_eq!(hits, vec![edge]);
        assert!(w.grid.cell_range(Vec3::splat(100.0), 1.0).is_none());
    }

    #[test]
    fn filter_narrows_results() {
        let mut w = World::new();
        let red = w.place(0, Vec3::ZERO, 1.0, RED);
        let blue = w.place(1, Vec3::new(0.2, 0.0, 0.0), 1.0, BLUE);
        let both = w.place(2, Vec3::new(-0.2, 0.0, 0.0), 1.0, RED | BLUE);
        let all = sorted(w.grid.overlapping(Vec3::ZERO, 0.1, &w.bodies));
        assert_eq!(all, vec![red, blue, both]);

        let only_red = Filter::including(RED);
        assert_eq!(
            sorted(w.grid.overlapping_filtered(Vec3::ZERO, 0.1, &only_red, &w.bodies)),
            vec![red, both]
        );
        let red_not_blue = Filter::including(RED).excluding(BLUE);
        assert_eq!(
            w.grid.overlapping_filtered(Vec3::ZERO, 0.1, &red_not_blue, &w.bodies),
            vec![red]
        );
    }

    #[test]
    fn into_variants_append_and_count() {
        let mut w = World::new();
        w.place(0, Vec3::ZERO, 1.0, Fingerprint::EMPTY);
        let mut out = vec![AgentId::new(99, 0)];
        assert_eq!(w.grid.overlapping_into(Vec3::ZERO, 0.5, &w.bodies, &mut out), 1);
        assert_eq!(w.grid.overlapping_point_into(Vec3::ZERO, &w.bodies, &mut out), 1);
        assert_eq!(out.len(), 3);
    }

    #[test]
    fn stale_agents_are_skipped() {
        let mut w = World::new();
        let a = w.place(0, Vec3::ZERO, 1.0, Fingerprint::EMPTY);
        w.bodies.0.remove(&a);
        assert!(w.grid.overlapping_point(Vec3::ZERO, &w.bodies).is_empty());
    }
}
