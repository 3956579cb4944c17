//! Decision-plan statistics for diagnostics and tuning.
//!
//! Counters are atomics so that concurrent readers of one engine (search
//! threads exploring different snapshots) can record without locking.
//! They are advisory: nothing in the engine reads them back.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Live counters owned by a `DecisionPlan`.
#[derive(Debug, Default)]
pub struct PlanStats {
    decisions: AtomicU64,
    gate_skips: AtomicU64,
    trivial_gate_hits: AtomicU64,
    kind_filter_skips: AtomicU64,
    condition_evaluations: AtomicU64,
    accepted: AtomicU64,
    rejected: AtomicU64,
    unhandled: AtomicU64,
}

#[derive(Clone, Copy, Debug)]
pub(crate) enum Counter {
    Decision,
    GateSkip,
    TrivialGate,
    KindFilterSkip,
    ConditionEvaluation,
    Accepted,
    Rejected,
    Unhandled,
}

impl PlanStats {
    /// Create zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    fn counter(&self, counter: Counter) -> &AtomicU64 {
        match counter {
            Counter::Decision => &self.decisions,
            Counter::GateSkip => &self.gate_skips,
            Counter::TrivialGate => &self.trivial_gate_hits,
            Counter::KindFilterSkip => &self.kind_filter_skips,
            Counter::ConditionEvaluation => &self.condition_evaluations,
            Counter::Accepted => &self.accepted,
            Counter::Rejected => &self.rejected,
            Counter::Unhandled => &self.unhandled,
        }
    }

    pub(crate) fn bump(&self, counter: Counter) {
        self.counter(counter).fetch_add(1, Ordering::Relaxed);
    }

    /// Copy the current values.
    #[must_use]
    pub fn snapshot(&self) -> PlanStatsSnapshot {
        let load = |c: Counter| self.counter(c).load(Ordering::Relaxed);
        PlanStatsSnapshot {
            decisions: load(Counter::Decision),
            gate_skips: load(Counter::GateSkip),
            trivial_gate_hits: load(Counter::TrivialGate),
            kind_filter_skips: load(Counter::KindFilterSkip),
            condition_evaluations: load(Counter::ConditionEvaluation),
            accepted: load(Counter::Accepted),
            rejected: load(Counter::Rejected),
            unhandled: load(Counter::Unhandled),
        }
    }

    /// Reset all counters to zero.
    pub fn reset(&self) {
        for counter in [
            Counter::Decision,
            Counter::GateSkip,
            Counter::TrivialGate,
            Counter::KindFilterSkip,
            Counter::ConditionEvaluation,
            Counter::Accepted,
            Counter::Rejected,
            Counter::Unhandled,
        ] {
            self.counter(counter).store(0, Ordering::Relaxed);
        }
    }
}

/// Point-in-time copy of `PlanStats`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanStatsSnapshot {
    /// Decisions made (one per `decide` call).
    pub decisions: u64,

    /// Entries skipped because their phase gate was not `Valid`.
    pub gate_skips: u64,

    /// Gates that compiled to "always" and were not evaluated.
    pub trivial_gate_hits: u64,

    /// Entries skipped by the event-kind filter before their condition ran.
    pub kind_filter_skips: u64,

    /// Rule conditions evaluated.
    pub condition_evaluations: u64,

    pub accepted: u64,
    pub rejected: u64,
    pub unhandled: u64,
}

impl PlanStatsSnapshot {
    /// Average conditions evaluated per decision.
    #[must_use]
    pub fn conditions_per_decision(&self) -> f64 {
        if self.decisions == 0 {
            0.0
        } else {
            self.condition_evaluations as f64 / self.decisions as f64
        }
    }

    /// Fraction of entry visits short-circuited by a fast path.
    #[must_use]
    pub fn fast_path_ratio(&self) -> f64 {
        let fast = self.kind_filter_skips + self.trivial_gate_hits;
        let total = fast + self.condition_evaluations + self.gate_skips;
        if total == 0 {
            0.0
        } else {
            fast as f64 / total as f64
        }
    }
}
