//! Per-pass reports and timings.
//!
//! Every pass returns a report of what it did, each carrying a
//! [`PassMetrics`] with wall-clock timings in microseconds.

use cage_core::AgentId;

/// Wall-clock timings for one pass.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PassMetrics {
    /// Time for the whole pass, in microseconds.
    pub total_us: u64,
    /// Per-phase times: `(phase, microseconds)`, in execution order.
    pub phase_us: Vec<(&'static str, u64)>,
}

impl PassMetrics {
    /// Time recorded for `phase`, if it ran.
    pub fn phase(&self, phase: &str) -> Option<u64> {
        self.phase_us
            .iter()
            .find(|(name, _)| *name == phase)
            .map(|&(_, us)| us)
    }
}

/// Outcome of a populate pass.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PopulateReport {
    /// Worklist entries drained while clearing last frame's cells.
    pub cells_cleared: usize,
    /// Agents placed in a cell.
    pub inserted: usize,
    /// Agents removed from the store, out-of-bounds ones included.
    pub despawned: Vec<AgentId>,
    /// Largest radius among inserted agents.
    pub largest_radius: f32,
    /// Timings for `clear`, `fill` and `despawn`.
    pub metrics: PassMetrics,
}

/// Outcome of a decouple pass.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DecoupleReport {
    /// Agents visited by the scan.
    pub scanned: usize,
    /// Agents skipped for having a zero decouple weight.
    pub skipped: usize,
    /// Agents that overlapped at least one other agent.
    pub overlapping: usize,
    /// Agents the resolve phase found with at least one accumulated
    /// contribution. Pushes that cancel out still count.
    pub resolved: usize,
    /// Timings for `scan`, `accumulate` and `resolve`.
    pub metrics: PassMetrics,
}

/// Outcome of a full evaluation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EvaluateReport {
    /// The leading populate.
    pub populate: PopulateReport,
    /// The decouple pass.
    pub decouple: DecoupleReport,
    /// The trailing populate, when enabled.
    pub repopulate: Option<PopulateReport>,
    /// Total time for the evaluation.
    pub total_us: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_metrics_are_zero() {
        let m = PassMetrics::default();
        assert_eq!(m.total_us, 0);
        assert!(m.phase_us.is_empty());
        assert_eq!(m.phase("scan"), None);
    }

    #[test]
    fn phase_lookup_by_name() {
        let m = PassMetrics {
            total_us: 30,
            phase_us: vec![("scan", 20), ("resolve", 10)],
        };
        assert_eq!(m.phase("resolve"), Some(10));
        assert_eq!(m.phase("accumulate"), None);
    }
}
