//! Legal move generation and dry-run validation.
//!
//! `validate` runs the same decision-plan scan as `Engine::handle` but never
//! applies a mutator, so it is safe on untrusted input. `legal_moves` asks
//! the active phase's `MoveGenerator` for candidates and keeps the ones
//! `validate` accepts.
//!
//! ## Example
//!
//! ```
//! use rust_tabletop::games::ring::RingGame;
//!
//! let ring = RingGame::new(2, 24).with_seed(3).build().unwrap();
//!
//! // a turn starts with a roll
//! let moves = ring.engine.legal_moves(&ring.initial);
//! assert_eq!(moves.len(), 1);
//! assert!(ring.engine.validate(&moves[0], &ring.initial).legal);
//! ```

use serde::{Deserialize, Serialize};

use crate::condition::RejectionReason;
use crate::core::{ArtifactId, Event};
use crate::engine::Engine;
use crate::plan::Decision;
use crate::state::GameState;

/// Result of validating one event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveValidation {
    pub legal: bool,
    /// The form of the event the plan matched (after preprocessing), or
    /// the event as given.
    pub event: Event,
    /// Why the event is illegal. `None` when legal.
    pub reason: Option<RejectionReason>,
    /// Human-readable explanation of the rejection. Empty when legal.
    pub explanation: String,
}

impl MoveValidation {
    /// A legal outcome.
    #[must_use]
    pub fn legal(event: Event) -> Self {
        Self {
            legal: true,
            event,
            reason: None,
            explanation: String::new(),
        }
    }

    /// An illegal outcome.
    pub fn illegal(event: Event, reason: RejectionReason, explanation: impl Into<String>) -> Self {
        Self {
            legal: false,
            event,
            reason: Some(reason),
            explanation: explanation.into(),
        }
    }
}

impl Engine {
    /// Dry-run `event` against `state`.
    #[must_use]
    pub fn validate(&self, event: &Event, state: &GameState) -> MoveValidation {
        if state.is_ended() {
            return MoveValidation::illegal(
                event.clone(),
                RejectionReason::GameEnded,
                "the game has ended",
            );
        }
        match self.decide(state, event) {
            Decision::Accepted { event, .. } => MoveValidation::legal(event),
            Decision::Rejected { event, response, .. } => {
                let explanation = response.to_string();
                MoveValidation::illegal(event, response.rejection_reason(), explanation)
            }
            Decision::Unhandled => MoveValidation::illegal(
                event.clone(),
                RejectionReason::WrongPhase,
                "no rule of the current phase handles this event",
            ),
        }
    }

    /// Every legal event in `state`, in generator order.
    ///
    /// Empty once the game has ended, and when the active phase (and its
    /// ancestors) declare no generator.
    #[must_use]
    pub fn legal_moves(&self, state: &GameState) -> Vec<Event> {
        if state.is_ended() {
            return Vec::new();
        }
        let Some(generator) = self.plan().generator(self, state) else {
            return Vec::new();
        };
        generator
            .candidates(self, state)
            .into_iter()
            .filter(|candidate| self.validate(candidate, state).legal)
            .collect()
    }

    /// Legal events that mention `artifact`.
    #[must_use]
    pub fn legal_moves_for(&self, artifact: ArtifactId, state: &GameState) -> Vec<Event> {
        self.legal_moves(state)
            .into_iter()
            .filter(|event| event.references(artifact))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::builtin::{condition_fn, EventIs, GameNotEnded};
    use crate::condition::{ConditionExpr, ConditionResponse};
    use crate::core::{EventKind, PhaseId};
    use crate::mutator::builtin::PassTurn;
    use crate::mutator::MutatorChain;
    use crate::rules::{Phase, Rule};
    use crate::state::ArtifactState;

    fn engine() -> (Engine, GameState, ArtifactId, ArtifactId) {
        let mut builder = Engine::builder();
        let white = builder.add_player("white");
        let black = builder.add_player("black");
        let no_rolls = condition_fn("no rolls", |_, _, event| {
            if event.kind() == EventKind::ROLL {
                ConditionResponse::invalid(RejectionReason::InsufficientResources, "no dice here")
            } else {
                ConditionResponse::ignore()
            }
        });
        let seating = vec![white, black];
        builder.add_phase(
            Phase::new(PhaseId(0), "play")
                .with_rule(Rule::when("no rolls", no_rolls, MutatorChain::new()))
                .with_rule(
                    Rule::new("pass", ConditionExpr::condition(EventIs(EventKind::PASS)), PassTurn)
                        .with_event_kind(EventKind::PASS),
                )
                .with_generator(move |_: &Engine, _: &GameState| -> Vec<Event> {
                    seating
                        .iter()
                        .flat_map(|&p| [Event::pass(p), Event::roll(p)])
                        .collect()
                }),
        );
        let (engine, state) = builder.build().unwrap();
        (engine, state, white, black)
    }

    #[test]
    fn test_validate_outcomes() {
        let (engine, state, white, _) = engine();

        assert!(engine.validate(&Event::pass(white), &state).legal);

        let roll = engine.validate(&Event::roll(white), &state);
        assert!(!roll.legal);
        assert_eq!(roll.reason, Some(RejectionReason::InsufficientResources));
        assert!(roll.explanation.contains("no dice here"));

        let custom = engine.validate(&Event::custom(EventKind::FIRST_CUSTOM, Some(white)), &state);
        assert_eq!(custom.reason, Some(RejectionReason::WrongPhase));
    }

    #[test]
    fn test_validate_is_deterministic() {
        let (engine, state, white, _) = engine();
        let event = Event::roll(white);
        assert_eq!(engine.validate(&event, &state), engine.validate(&event, &state));
    }

    #[test]
    fn test_legal_moves_filters_candidates() {
        let (engine, state, white, black) = engine();
        assert_eq!(
            engine.legal_moves(&state),
            vec![Event::pass(white), Event::pass(black)]
        );
        assert_eq!(engine.legal_moves_for(black, &state), vec![Event::pass(black)]);
    }

    #[test]
    fn test_ended_game_has_no_moves() {
        let (engine, state, white, _) = engine();
        let over = state.with_state(ArtifactState::ended(white, Some(white)));

        assert!(engine.legal_moves(&over).is_empty());
        let validation = engine.validate(&Event::pass(white), &over);
        assert!(!validation.legal);
        assert_eq!(validation.reason, Some(RejectionReason::GameEnded));
    }

    #[test]
    fn test_no_generator_no_moves() {
        let mut builder = Engine::builder();
        builder.add_player("solo");
        let pass = Rule::when("any", GameNotEnded, PassTurn);
        builder.add_phase(Phase::new(PhaseId(0), "play").with_rule(pass));
        let (engine, state) = builder.build().unwrap();
        assert!(engine.legal_moves(&state).is_empty());
    }

    #[test]
    fn test_validation_serializes() {
        let (engine, state, white, _) = engine();
        let validation = engine.validate(&Event::roll(white), &state);
        let json = serde_json::to_string(&validation).unwrap();
        let back: MoveValidation = serde_json::from_str(&json).unwrap();
        assert_eq!(back, validation);
    }
}
