//! The engine: a game definition plus its compiled decision plan.
//!
//! ## Key Types
//!
//! - `Engine` - immutable, shareable across threads; all game progress
//!   lives in `GameState` snapshots passed in and returned
//! - `GameDefinition` - artifacts, topology, patterns and seating
//! - `EngineBuilder` - builder-time configuration surface
//!
//! ## Handling events
//!
//! `handle` runs the decision plan on one event. An accepted event returns
//! the mutated state; an explicit rejection is `EngineError::Rejected`; an
//! event no rule cares about returns the state unchanged. Callers feeding
//! untrusted input should call `validate` first and only `handle` legal
//! events.

mod builder;
mod definition;

pub use builder::EngineBuilder;
pub use definition::GameDefinition;

use tracing::warn;

use crate::core::{ArtifactId, Artifacts, EngineConfig, Event};
use crate::error::EngineError;
use crate::hash::StateHash;
use crate::plan::{Decision, DecisionPlan, PlanStatsSnapshot};
use crate::state::GameState;
use crate::topology::{Pattern, TilePath, Topology};

/// A built game engine.
#[derive(Debug)]
pub struct Engine {
    pub(crate) definition: GameDefinition,
    pub(crate) plan: DecisionPlan,
    pub(crate) config: EngineConfig,
}

impl Engine {
    /// Start configuring a new engine.
    #[must_use]
    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    #[must_use]
    pub fn definition(&self) -> &GameDefinition {
        &self.definition
    }

    #[must_use]
    pub fn artifacts(&self) -> &Artifacts {
        self.definition.artifacts()
    }

    #[must_use]
    pub fn topology(&self) -> &Topology {
        self.definition.topology()
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub fn plan(&self) -> &DecisionPlan {
        &self.plan
    }

    /// Movement patterns of `piece`.
    #[must_use]
    pub fn patterns_of(&self, piece: ArtifactId) -> &[Pattern] {
        self.definition.patterns_of(piece)
    }

    /// Resolve the path `piece` would take from `from` to `to`.
    #[must_use]
    pub fn path_for(
        &self,
        piece: ArtifactId,
        from: ArtifactId,
        to: ArtifactId,
    ) -> Option<TilePath> {
        self.definition.path_for(piece, from, to)
    }

    /// Every distinct path the patterns of `piece` resolve from `from` to
    /// `to`, in pattern order.
    #[must_use]
    pub fn paths_for(&self, piece: ArtifactId, from: ArtifactId, to: ArtifactId) -> Vec<TilePath> {
        self.definition.paths_for(piece, from, to)
    }

    /// Every tile `piece` could reach from `from`.
    #[must_use]
    pub fn destinations(&self, piece: ArtifactId, from: ArtifactId) -> Vec<TilePath> {
        self.definition.destinations(piece, from)
    }

    #[must_use]
    pub fn seating(&self) -> &[ArtifactId] {
        self.definition.seating()
    }

    /// The player seated after `player`.
    #[must_use]
    pub fn next_player(&self, player: ArtifactId) -> Option<ArtifactId> {
        self.definition.next_player(player)
    }

    /// Copy of the decision plan's counters.
    #[must_use]
    pub fn stats(&self) -> PlanStatsSnapshot {
        self.plan.stats().snapshot()
    }

    pub fn reset_stats(&self) {
        self.plan.stats().reset();
    }

    /// Scan the decision plan for `event` without mutating anything.
    #[must_use]
    pub fn decide(&self, state: &GameState, event: &Event) -> Decision {
        self.plan.decide(self, state, event)
    }

    /// Apply `event` to `state`.
    ///
    /// Returns the new state if a rule accepted it, the unchanged state if
    /// no rule handled it, and an error if a rule rejected it, the game has
    /// ended, or the accepting mutator found the state inconsistent with the
    /// event.
    pub fn handle(&self, state: &GameState, event: &Event) -> Result<GameState, EngineError> {
        if state.is_ended() {
            return Err(EngineError::GameEnded);
        }
        match self.decide(state, event) {
            Decision::Accepted { entry, event } => {
                let rule = &self.plan.entries()[entry].rule;
                rule.mutator().mutate(self, state, &event).map_err(|error| {
                    if let EngineError::Invariant(message) = &error {
                        warn!(
                            rule = rule.name(),
                            %event,
                            message = message.as_str(),
                            "invariant violated"
                        );
                    }
                    error
                })
            }
            Decision::Rejected {
                event, response, ..
            } => Err(EngineError::Rejected { event, response }),
            Decision::Unhandled => Ok(state.clone()),
        }
    }

    /// Handle `events` in order starting from `initial`.
    pub fn replay<'a>(
        &self,
        initial: &GameState,
        events: impl IntoIterator<Item = &'a Event>,
    ) -> Result<GameState, EngineError> {
        let mut state = initial.clone();
        for event in events {
            state = self.handle(&state, event)?;
        }
        Ok(state)
    }

    /// Like `replay`, also returning the hash of every intermediate state
    /// (initial state first).
    pub fn replay_hashes<'a>(
        &self,
        initial: &GameState,
        events: impl IntoIterator<Item = &'a Event>,
    ) -> Result<(GameState, Vec<StateHash>), EngineError> {
        let mut state = initial.clone();
        let mut hashes = vec![state.hash()];
        for event in events {
            state = self.handle(&state, event)?;
            hashes.push(state.hash());
        }
        Ok((state, hashes))
    }
}
