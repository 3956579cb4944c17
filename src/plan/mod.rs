//! Decision plan: the compiled form of a game's phase/rule tree.
//!
//! ## Compilation
//!
//! Built once per engine. The phase tree is flattened in declaration
//! order into one `PlanEntry` per rule. Each entry points at its phase,
//! whose compiled gate is the AND of its own gate and all ancestor gates,
//! and carries the rule's compiled condition and event-kind filter.
//!
//! ## Evaluation
//!
//! For each candidate form of an event (phases with a preprocessor may
//! rewrite it), entries are scanned in order:
//!
//! - kind filter excludes the event: skip
//! - phase gate not `Valid`: skip
//! - condition `Ignore`: continue
//! - condition `Valid`: accept with this entry
//! - condition `Invalid`: reject with the response
//!
//! First match wins. Nothing accepts or rejects: unhandled.

mod stats;

pub use stats::{PlanStats, PlanStatsSnapshot};

use std::sync::Arc;

use rustc_hash::FxHashSet;
use smallvec::{smallvec, SmallVec};
use tracing::{debug, trace};

use crate::condition::{
    CompiledExpr, Condition, ConditionResponse, Expr, GateExpr, StateCondition, Verdict,
};
use crate::core::{Event, PhaseId};
use crate::engine::Engine;
use crate::error::BuildError;
use crate::rules::{EventPreprocessor, MoveGenerator, Phase, PhaseNode, Rule};
use crate::state::GameState;

use stats::Counter;

/// A compiled phase.
pub struct PlanPhase {
    pub id: PhaseId,
    pub name: String,
    /// Nesting depth; top-level phases are 0.
    pub depth: usize,
    /// Index of the enclosing phase in `DecisionPlan::phases`.
    pub parent: Option<usize>,
    /// Own gate AND every ancestor gate.
    pub gate: CompiledExpr<Arc<dyn StateCondition>>,
    pub preprocessor: Option<Arc<dyn EventPreprocessor>>,
    pub generator: Option<Arc<dyn MoveGenerator>>,
}

/// One flattened rule.
pub struct PlanEntry {
    /// Index into `DecisionPlan::phases`.
    pub phase: usize,
    pub rule: Rule,
    pub condition: CompiledExpr<Arc<dyn Condition>>,
}

/// Outcome of scanning the plan for one event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Decision {
    /// Entry `entry` accepted `event` (the candidate form actually matched).
    Accepted { entry: usize, event: Event },
    /// Entry `entry` rejected `event`.
    Rejected {
        entry: usize,
        event: Event,
        response: ConditionResponse,
    },
    /// No entry accepted or rejected any form of the event.
    Unhandled,
}

/// Compiled, flattened phase/rule tree.
pub struct DecisionPlan {
    phases: Vec<PlanPhase>,
    entries: Vec<PlanEntry>,
    stats: PlanStats,
}

/// Gate results for one decision, filled lazily.
struct GateCache {
    results: SmallVec<[Option<bool>; 8]>,
}

impl DecisionPlan {
    /// Compile a list of top-level phases.
    pub fn compile(phases: &[Phase]) -> Result<Self, BuildError> {
        let mut plan = Self {
            phases: Vec::new(),
            entries: Vec::new(),
            stats: PlanStats::new(),
        };
        let mut seen = FxHashSet::default();
        for phase in phases {
            plan.add_phase(phase, None, &[], &mut seen)?;
        }
        if plan.entries.is_empty() {
            return Err(BuildError::EmptyPlan);
        }
        debug!(
            phases = plan.phases.len(),
            entries = plan.entries.len(),
            "compiled decision plan"
        );
        Ok(plan)
    }

    fn add_phase(
        &mut self,
        phase: &Phase,
        parent: Option<usize>,
        ancestor_gates: &[GateExpr],
        seen: &mut FxHashSet<PhaseId>,
    ) -> Result<(), BuildError> {
        if !seen.insert(phase.id()) {
            return Err(BuildError::DuplicatePhase(phase.id()));
        }

        let mut gates: Vec<GateExpr> = ancestor_gates.to_vec();
        gates.push(phase.gate().clone());

        let index = self.phases.len();
        self.phases.push(PlanPhase {
            id: phase.id(),
            name: phase.name().to_string(),
            depth: ancestor_gates.len(),
            parent,
            gate: Expr::all(gates.iter().cloned()).compile(),
            preprocessor: phase.preprocessor().cloned(),
            generator: phase.generator().cloned(),
        });

        for child in phase.children() {
            match child {
                PhaseNode::Rule(rule) => self.entries.push(PlanEntry {
                    phase: index,
                    rule: rule.clone(),
                    condition: rule.condition().clone().compile(),
                }),
                PhaseNode::Phase(sub) => self.add_phase(sub, Some(index), &gates, seen)?,
            }
        }
        Ok(())
    }

    /// Compiled phases in declaration (pre-order) order.
    #[must_use]
    pub fn phases(&self) -> &[PlanPhase] {
        &self.phases
    }

    /// Entries in evaluation order.
    #[must_use]
    pub fn entries(&self) -> &[PlanEntry] {
        &self.entries
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the plan has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Live counters.
    #[must_use]
    pub fn stats(&self) -> &PlanStats {
        &self.stats
    }

    fn bump(&self, engine: &Engine, counter: Counter) {
        if engine.config().collect_stats {
            self.stats.bump(counter);
        }
    }

    fn gate_open(
        &self,
        engine: &Engine,
        state: &GameState,
        cache: &mut GateCache,
        phase: usize,
    ) -> bool {
        if let Some(open) = cache.results[phase] {
            return open;
        }
        let gate = &self.phases[phase].gate;
        let open = if gate.is_always() && engine.config().skip_trivial_gates {
            self.bump(engine, Counter::TrivialGate);
            true
        } else {
            gate.evaluate(state).verdict == Verdict::Valid
        };
        cache.results[phase] = Some(open);
        open
    }

    fn new_cache(&self) -> GateCache {
        GateCache {
            results: smallvec![None; self.phases.len()],
        }
    }

    /// The deepest phase whose gate is `Valid`, first in declaration order
    /// among equals.
    #[must_use]
    pub fn active_phase(&self, engine: &Engine, state: &GameState) -> Option<&PlanPhase> {
        let mut cache = self.new_cache();
        let mut best: Option<usize> = None;
        for index in 0..self.phases.len() {
            if !self.gate_open(engine, state, &mut cache, index) {
                continue;
            }
            if best.map_or(true, |b| self.phases[index].depth > self.phases[b].depth) {
                best = Some(index);
            }
        }
        best.map(|index| &self.phases[index])
    }

    /// Generator of the active phase, or of its nearest ancestor that has
    /// one.
    #[must_use]
    pub fn generator(&self, engine: &Engine, state: &GameState) -> Option<&Arc<dyn MoveGenerator>> {
        let active = self.active_phase(engine, state)?;
        let mut current = Some(active);
        while let Some(phase) = current {
            if let Some(generator) = &phase.generator {
                return Some(generator);
            }
            current = phase.parent.map(|p| &self.phases[p]);
        }
        None
    }

    /// Candidate forms of `event` after every open phase's preprocessor,
    /// applied in declaration order.
    fn forms(
        &self,
        engine: &Engine,
        state: &GameState,
        event: &Event,
        cache: &mut GateCache,
    ) -> Vec<Event> {
        let mut forms = vec![event.clone()];
        for (index, phase) in self.phases.iter().enumerate() {
            let Some(preprocessor) = &phase.preprocessor else {
                continue;
            };
            if !self.gate_open(engine, state, cache, index) {
                continue;
            }
            forms = forms
                .iter()
                .flat_map(|form| preprocessor.preprocess(engine, state, form))
                .collect();
            trace!(phase = %phase.id, forms = forms.len(), "preprocessed event");
        }
        forms
    }

    /// Scan the plan for `event` without applying any mutator.
    pub fn decide(&self, engine: &Engine, state: &GameState, event: &Event) -> Decision {
        self.bump(engine, Counter::Decision);
        let mut cache = self.new_cache();
        let filter = engine.config().event_kind_filter;

        for form in self.forms(engine, state, event, &mut cache) {
            let kind = form.kind();
            for (index, entry) in self.entries.iter().enumerate() {
                let handles = entry.rule.handles(kind);
                if filter && !handles {
                    self.bump(engine, Counter::KindFilterSkip);
                    continue;
                }
                if !self.gate_open(engine, state, &mut cache, entry.phase) {
                    self.bump(engine, Counter::GateSkip);
                    trace!(rule = entry.rule.name(), "phase gate closed");
                    continue;
                }

                self.bump(engine, Counter::ConditionEvaluation);
                let response = entry.condition.evaluate(engine, state, &form);
                if !handles {
                    continue;
                }
                match response.verdict {
                    Verdict::Ignore => {}
                    Verdict::Valid => {
                        self.bump(engine, Counter::Accepted);
                        debug!(rule = entry.rule.name(), event = %form, "accepted");
                        return Decision::Accepted { entry: index, event: form };
                    }
                    Verdict::Invalid => {
                        self.bump(engine, Counter::Rejected);
                        debug!(
                            rule = entry.rule.name(),
                            event = %form,
                            reason = %response,
                            "rejected"
                        );
                        return Decision::Rejected {
                            entry: index,
                            event: form,
                            response,
                        };
                    }
                }
            }
        }

        self.bump(engine, Counter::Unhandled);
        debug!(event = %event, "unhandled");
        Decision::Unhandled
    }
}

impl std::fmt::Debug for DecisionPlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let entries: Vec<(PhaseId, &str)> = self
            .entries
            .iter()
            .map(|e| (self.phases[e.phase].id, e.rule.name()))
            .collect();
        f.debug_struct("DecisionPlan")
            .field("phases", &self.phases.len())
            .field("entries", &entries)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::builtin::{gate_fn, GameNotEnded};
    use crate::mutator::MutatorChain;

    fn rule(name: &str) -> Rule {
        Rule::when(name, GameNotEnded, MutatorChain::new())
    }

    #[test]
    fn test_flattens_in_declared_order() {
        let phases = vec![
            Phase::new(PhaseId(0), "outer")
                .with_rule(rule("a"))
                .with_phase(Phase::new(PhaseId(1), "inner").with_rule(rule("b")))
                .with_rule(rule("c")),
            Phase::new(PhaseId(2), "second").with_rule(rule("d")),
        ];
        let plan = DecisionPlan::compile(&phases).unwrap();

        let names: Vec<&str> = plan.entries().iter().map(|e| e.rule.name()).collect();
        assert_eq!(names, vec!["a", "b", "c", "d"]);

        let phase_ids: Vec<PhaseId> = plan
            .entries()
            .iter()
            .map(|e| plan.phases()[e.phase].id)
            .collect();
        assert_eq!(phase_ids, vec![PhaseId(0), PhaseId(1), PhaseId(0), PhaseId(2)]);

        assert_eq!(plan.phases()[1].depth, 1);
        assert_eq!(plan.phases()[1].parent, Some(0));
    }

    #[test]
    fn test_nested_gate_includes_ancestors() {
        let closed = gate_fn("closed", |_| ConditionResponse::ignore());
        let phases = vec![Phase::new(PhaseId(0), "outer")
            .gated_by(closed)
            .with_phase(Phase::new(PhaseId(1), "inner").with_rule(rule("x")))];
        let plan = DecisionPlan::compile(&phases).unwrap();

        // inner declares no gate but inherits the outer one
        assert!(!plan.phases()[1].gate.is_always());
        assert!(plan.phases()[1].gate.evaluate(&GameState::new()).is_ignore());
    }

    #[test]
    fn test_ungated_phases_compile_to_always() {
        let phases = vec![Phase::new(PhaseId(0), "outer")
            .with_phase(Phase::new(PhaseId(1), "inner").with_rule(rule("x")))];
        let plan = DecisionPlan::compile(&phases).unwrap();
        assert!(plan.phases().iter().all(|p| p.gate.is_always()));
    }

    #[test]
    fn test_empty_plan_rejected() {
        let phases = vec![Phase::new(PhaseId(0), "nothing")];
        assert_eq!(DecisionPlan::compile(&phases).unwrap_err(), BuildError::EmptyPlan);
    }

    #[test]
    fn test_duplicate_phase_rejected() {
        let phases = vec![
            Phase::new(PhaseId(3), "a").with_rule(rule("x")),
            Phase::new(PhaseId(3), "b").with_rule(rule("y")),
        ];
        assert_eq!(
            DecisionPlan::compile(&phases).unwrap_err(),
            BuildError::DuplicatePhase(PhaseId(3))
        );
    }
}
