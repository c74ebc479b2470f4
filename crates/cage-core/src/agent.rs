//! Per-agent values read and written by the cage passes.

use glam::Vec3;

use crate::fingerprint::Fingerprint;

/// Sphere collider attached to an agent.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sphere {
    /// Radius in world units. Zero makes the agent a point.
    pub radius: f32,
    /// Decoupling strength, a bit like a reciprocal of mass.
    ///
    /// The larger this value, the more the sphere gets pushed away from its
    /// neighbours relative to their own weights. Zero suppresses decoupling
    /// for this sphere entirely.
    pub decouple_weight: f32,
}

impl Sphere {
    /// A sphere with the given radius and a decouple weight of 1.
    pub fn new(radius: f32) -> Self {
        Self::weighted(radius, 1.0)
    }

    /// A sphere with an explicit decouple weight.
    ///
    /// Negative radii and weights are clamped to zero.
    pub fn weighted(radius: f32, decouple_weight: f32) -> Self {
        Self {
            radius: radius.max(0.0),
            decouple_weight: decouple_weight.max(0.0),
        }
    }

    /// Whether this sphere takes part in decoupling.
    pub fn decouples(&self) -> bool {
        self.decouple_weight > 0.0
    }
}

impl Default for Sphere {
    fn default() -> Self {
        Self::new(1.0)
    }
}

/// Transient per-pass decoupling scratch.
///
/// Filled by the scan phase of a decouple pass and consumed (then reset) by
/// the resolve phase. Outside a decouple pass it is always zeroed.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Decoupling {
    /// Sum of all displacement contributions collected this pass.
    pub accumulated: Vec3,
    /// Number of contributions summed into `accumulated`.
    pub count: u32,
}

impl Decoupling {
    /// Add one contribution.
    pub fn push(&mut self, displacement: Vec3) {
        self.accumulated += displacement;
        self.count += 1;
    }

    /// Fold another accumulator into this one.
    pub fn merge(&mut self, other: Decoupling) {
        self.accumulated += other.accumulated;
        self.count += other.count;
    }

    /// The averaged displacement, or `None` when nothing was accumulated.
    pub fn average(&self) -> Option<Vec3> {
        (self.count > 0).then(|| self.accumulated / self.count as f32)
    }

    /// Whether nothing has been accumulated.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Zero both fields.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Read-only snapshot of an agent as seen by the cage.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Body {
    /// World-space centre.
    pub position: Vec3,
    /// Collider.
    pub sphere: Sphere,
    /// Tags used by filtered queries.
    pub fingerprint: Fingerprint,
}

/// Mutable access to one agent during the resolve phase.
///
/// Only the agent's own fields are reachable, so resolve tasks on different
/// threads never touch the same memory.
#[derive(Debug)]
pub struct BodyMut<'a> {
    /// World-space centre.
    pub position: &'a mut Vec3,
    /// Collider.
    pub sphere: &'a Sphere,
    /// Decoupling scratch.
    pub decoupling: &'a mut Decoupling,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_inputs_clamp_to_zero() {
        let s = Sphere::weighted(-1.0, -3.0);
        assert_eq!(s.radius, 0.0);
        assert_eq!(s.decouple_weight, 0.0);
        assert!(!s.decouples());
    }

    #[test]
    fn average_divides_by_count() {
        let mut d = Decoupling::default();
        assert_eq!(d.average(), None);
        d.push(Vec3::new(2.0, 0.0, 0.0));
        d.push(Vec3::new(0.0, 4.0, 0.0));
        assert_eq!(d.count, 2);
        assert_eq!(d.average(), Some(Vec3::new(1.0, 2.0, 0.0)));
        let mut e = Decoupling::default();
        e.push(Vec3::new(0.0, 0.0, 3.0));
        e.merge(d);
        assert_eq!(e.count, 3);
        assert_eq!(e.accumulated, Vec3::new(2.0, 4.0, 3.0));
        d.reset();
        assert!(d.is_empty());
        assert_eq!(d.accumulated, Vec3::ZERO);
    }
}
