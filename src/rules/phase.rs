//! Phases: gated groups of rules and sub-phases.

use std::sync::Arc;

use crate::condition::{GateExpr, StateCondition};
use crate::core::{Event, PhaseId};
use crate::engine::Engine;
use crate::state::GameState;

use super::rule::Rule;

/// Rewrites a raw event into the concrete forms a phase's rules handle.
///
/// Returning an empty list drops the event; returning several expands it
/// (a backgammon "move 5" into each checker that can move 5).
pub trait EventPreprocessor: Send + Sync {
    fn preprocess(&self, engine: &Engine, state: &GameState, event: &Event) -> Vec<Event>;
}

/// Produces candidate events for legal-move generation.
///
/// The engine has no generic notion of what a player could do; each game
/// supplies this hook on the phases where players act. Candidates are
/// validated afterwards, so a generator may over-approximate.
pub trait MoveGenerator: Send + Sync {
    fn candidates(&self, engine: &Engine, state: &GameState) -> Vec<Event>;
}

impl<F> EventPreprocessor for F
where
    F: Fn(&Engine, &GameState, &Event) -> Vec<Event> + Send + Sync,
{
    fn preprocess(&self, engine: &Engine, state: &GameState, event: &Event) -> Vec<Event> {
        self(engine, state, event)
    }
}

impl<F> MoveGenerator for F
where
    F: Fn(&Engine, &GameState) -> Vec<Event> + Send + Sync,
{
    fn candidates(&self, engine: &Engine, state: &GameState) -> Vec<Event> {
        self(engine, state)
    }
}

/// One child of a phase, in declared order.
#[derive(Clone)]
pub enum PhaseNode {
    Rule(Rule),
    Phase(Phase),
}

/// A gated group of rules.
///
/// The phase applies while its gate is `Valid`; nested phases apply while
/// their own gate and every ancestor's gate are `Valid`. Children keep
/// their declaration order, which the decision plan preserves.
#[derive(Clone)]
pub struct Phase {
    id: PhaseId,
    name: String,
    gate: GateExpr,
    children: Vec<PhaseNode>,
    preprocessor: Option<Arc<dyn EventPreprocessor>>,
    generator: Option<Arc<dyn MoveGenerator>>,
}

impl Phase {
    /// Create an always-active phase with no children.
    pub fn new(id: PhaseId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            gate: GateExpr::Always,
            children: Vec::new(),
            preprocessor: None,
            generator: None,
        }
    }

    /// Set the gate expression (builder pattern).
    #[must_use]
    pub fn with_gate(mut self, gate: GateExpr) -> Self {
        self.gate = gate;
        self
    }

    /// Set a single-condition gate (builder pattern).
    #[must_use]
    pub fn gated_by(self, gate: impl StateCondition + 'static) -> Self {
        self.with_gate(GateExpr::gate(gate))
    }

    /// Append a rule (builder pattern).
    #[must_use]
    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.children.push(PhaseNode::Rule(rule));
        self
    }

    /// Append a sub-phase (builder pattern).
    #[must_use]
    pub fn with_phase(mut self, phase: Phase) -> Self {
        self.children.push(PhaseNode::Phase(phase));
        self
    }

    /// Set the event preprocessor (builder pattern).
    #[must_use]
    pub fn with_preprocessor(mut self, preprocessor: impl EventPreprocessor + 'static) -> Self {
        self.preprocessor = Some(Arc::new(preprocessor));
        self
    }

    /// Set the candidate generator (builder pattern).
    #[must_use]
    pub fn with_generator(mut self, generator: impl MoveGenerator + 'static) -> Self {
        self.generator = Some(Arc::new(generator));
        self
    }

    #[must_use]
    pub fn id(&self) -> PhaseId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn gate(&self) -> &GateExpr {
        &self.gate
    }

    #[must_use]
    pub fn children(&self) -> &[PhaseNode] {
        &self.children
    }

    #[must_use]
    pub fn preprocessor(&self) -> Option<&Arc<dyn EventPreprocessor>> {
        self.preprocessor.as_ref()
    }

    #[must_use]
    pub fn generator(&self) -> Option<&Arc<dyn MoveGenerator>> {
        self.generator.as_ref()
    }

    /// Number of rules in this phase and all sub-phases.
    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.children
            .iter()
            .map(|child| match child {
                PhaseNode::Rule(_) => 1,
                PhaseNode::Phase(phase) => phase.rule_count(),
            })
            .sum()
    }
}

impl std::fmt::Debug for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Phase")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("gate", &self.gate)
            .field("children", &self.children)
            .field("preprocessor", &self.preprocessor.is_some())
            .field("generator", &self.generator.is_some())
            .finish()
    }
}

impl std::fmt::Debug for PhaseNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rule(rule) => write!(f, "Rule({:?})", rule.name()),
            Self::Phase(phase) => phase.fmt(f),
        }
    }
}
