//! Ring race conditions, mutators and move generator.

use std::sync::Arc;

use smallvec::SmallVec;

use crate::condition::builtin::DistanceMatchesDice;
use crate::condition::{Condition, ConditionResponse, RejectionReason};
use crate::core::{ArtifactId, Event, EventKind};
use crate::engine::Engine;
use crate::error::EngineError;
use crate::mutator::builtin::{EndGame, PassTurn};
use crate::mutator::Mutator;
use crate::rules::MoveGenerator;
use crate::state::{ArtifactState, GameState};

use super::game::RingLayout;

/// Every move `player` could try with the current die: each runner to each
/// tile its patterns reach. Over-approximates; validation filters.
fn move_candidates(
    engine: &Engine,
    state: &GameState,
    layout: &RingLayout,
    player: ArtifactId,
) -> Vec<Event> {
    layout
        .runners_of(player)
        .iter()
        .filter_map(|&runner| state.tile_of(runner).map(|tile| (runner, tile)))
        .flat_map(|(runner, from)| {
            engine
                .destinations(runner, from)
                .into_iter()
                .map(move |path| Event::piece_move(player, runner, from, path.target()))
        })
        .collect()
}

/// Candidate generator: roll when the die is blank, otherwise every runner
/// move plus passing.
#[derive(Clone, Debug)]
pub struct RingMoves {
    layout: Arc<RingLayout>,
}

impl RingMoves {
    pub fn new(layout: Arc<RingLayout>) -> Self {
        Self { layout }
    }
}

impl MoveGenerator for RingMoves {
    fn candidates(&self, engine: &Engine, state: &GameState) -> Vec<Event> {
        let Some(player) = state.active_player() else {
            return Vec::new();
        };
        if state.value_of(self.layout.die).is_none() {
            return vec![Event::roll(player)];
        }
        let mut candidates = move_candidates(engine, state, &self.layout, player);
        candidates.push(Event::pass(player));
        candidates
    }
}

/// Passing is only allowed when no runner can use the die.
#[derive(Clone, Debug)]
pub struct NoMoveAvailable {
    layout: Arc<RingLayout>,
}

impl NoMoveAvailable {
    pub fn new(layout: Arc<RingLayout>) -> Self {
        Self { layout }
    }
}

impl Condition for NoMoveAvailable {
    fn evaluate(&self, engine: &Engine, state: &GameState, event: &Event) -> ConditionResponse {
        let (EventKind::PASS, Some(player)) = (event.kind(), event.player()) else {
            return ConditionResponse::ignore();
        };
        let available = move_candidates(engine, state, &self.layout, player)
            .into_iter()
            .find(|candidate| engine.validate(candidate, state).legal);
        match available {
            None => ConditionResponse::valid(),
            Some(candidate) => ConditionResponse::invalid(
                RejectionReason::RuleViolation,
                format!("cannot pass while {candidate} is possible"),
            ),
        }
    }

    fn name(&self) -> &str {
        "NoMoveAvailable"
    }
}

/// Send opponent runners on the destination back home with no progress.
#[derive(Clone, Debug)]
pub struct SendHome {
    layout: Arc<RingLayout>,
}

impl SendHome {
    pub fn new(layout: Arc<RingLayout>) -> Self {
        Self { layout }
    }
}

impl Mutator for SendHome {
    fn mutate(
        &self,
        engine: &Engine,
        state: &GameState,
        event: &Event,
    ) -> Result<GameState, EngineError> {
        let (piece, _, to) = event
            .as_move()
            .ok_or_else(|| EngineError::invariant(format!("SendHome applied to {event}")))?;
        let mut deltas: SmallVec<[ArtifactState; 4]> = SmallVec::new();
        for victim in state.pieces_on(to).filter(|&other| other != piece) {
            let home = engine
                .artifacts()
                .owner(victim)
                .and_then(|owner| self.layout.home_of(owner))
                .ok_or_else(|| EngineError::invariant(format!("{victim} has no home tile")))?;
            deltas.push(ArtifactState::on_tile(victim, home));
            deltas.push(ArtifactState::value(victim, 0));
        }
        Ok(state.advance(deltas))
    }

    fn name(&self) -> &str {
        "SendHome"
    }
}

/// Add the distance of the path the die paid for to the runner's progress.
#[derive(Clone, Debug)]
pub struct RecordProgress {
    die: DistanceMatchesDice,
}

impl RecordProgress {
    pub fn new(die: ArtifactId) -> Self {
        Self {
            die: DistanceMatchesDice::new([die]),
        }
    }
}

impl Mutator for RecordProgress {
    fn mutate(
        &self,
        engine: &Engine,
        state: &GameState,
        event: &Event,
    ) -> Result<GameState, EngineError> {
        let piece = event
            .as_move()
            .map(|(piece, _, _)| piece)
            .ok_or_else(|| EngineError::invariant(format!("RecordProgress applied to {event}")))?;
        let path = self
            .die
            .matching_path(engine, state, event)
            .ok_or_else(|| EngineError::invariant(format!("no path of {event} matches the die")))?;
        let progress = state.value_of(piece).unwrap_or(0) + i64::from(path.distance);
        Ok(state.with_state(ArtifactState::value(piece, progress)))
    }

    fn name(&self) -> &str {
        "RecordProgress"
    }
}

/// End the game if the moved runner reached the goal, otherwise pass the
/// turn.
#[derive(Clone, Debug)]
pub struct FinishOrPass {
    layout: Arc<RingLayout>,
}

impl FinishOrPass {
    pub fn new(layout: Arc<RingLayout>) -> Self {
        Self { layout }
    }
}

impl Mutator for FinishOrPass {
    fn mutate(
        &self,
        engine: &Engine,
        state: &GameState,
        event: &Event,
    ) -> Result<GameState, EngineError> {
        let finished = event
            .as_move()
            .and_then(|(piece, _, _)| state.value_of(piece))
            .is_some_and(|progress| progress >= self.layout.goal);
        if finished {
            EndGame::won_by_event_player(self.layout.board).mutate(engine, state, event)
        } else {
            PassTurn.mutate(engine, state, event)
        }
    }

    fn name(&self) -> &str {
        "FinishOrPass"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::ring::{Ring, RingGame};

    fn tile(layout: &RingLayout, index: usize) -> ArtifactId {
        layout.tile(index).expect("ring has tiles")
    }

    fn rolled(game: RingGame, face: i64) -> (Ring, GameState) {
        let ring = game.build().unwrap();
        let state = ring.initial.with_state(ArtifactState::value(ring.layout.die, face));
        (ring, state)
    }

    #[test]
    fn test_generator_before_roll() {
        let ring = RingGame::new(2, 12).build().unwrap();
        let player = ring.layout.players[0];
        let moves = RingMoves::new(Arc::clone(&ring.layout));
        let candidates = moves.candidates(&ring.engine, &ring.initial);
        assert_eq!(candidates, vec![Event::roll(player)]);
    }

    #[test]
    fn test_move_records_progress_and_passes() {
        let (ring, state) = rolled(RingGame::new(2, 12), 3);
        let layout = &ring.layout;
        let (player, runner) = (layout.players[0], layout.runners[0][0]);

        let next = ring
            .engine
            .handle(&state, &Event::piece_move(player, runner, tile(layout, 0), tile(layout, 3)))
            .unwrap();
        assert_eq!(next.tile_of(runner), Some(tile(layout, 3)));
        assert_eq!(next.value_of(runner), Some(3));
        assert_eq!(next.value_of(layout.die), None);
        assert_eq!(next.active_player(), Some(layout.players[1]));
    }

    #[test]
    fn test_shortcut_sends_opponent_home() {
        let (ring, state) = rolled(RingGame::new(3, 12).with_across_distance(4), 4);
        let layout = &ring.layout;
        let (player, runner) = (layout.players[0], layout.runners[0][0]);
        let victim = layout.runners[1][0];
        let state = state.advance([
            ArtifactState::on_tile(victim, tile(layout, 6)),
            ArtifactState::value(victim, 2),
        ]);

        let across = Event::piece_move(player, runner, tile(layout, 0), tile(layout, 6));
        let next = ring.engine.handle(&state, &across).unwrap();
        assert_eq!(next.tile_of(runner), Some(tile(layout, 6)));
        assert_eq!(next.value_of(runner), Some(4));
        assert_eq!(next.tile_of(victim), Some(layout.homes[1]));
        assert_eq!(next.value_of(victim), Some(0));
    }

    #[test]
    fn test_roll_may_take_long_way_past_shortcut() {
        let (ring, state) = rolled(RingGame::new(3, 12), 6);
        let layout = &ring.layout;
        let (player, runner) = (layout.players[0], layout.runners[0][0]);
        let clockwise = Event::piece_move(player, runner, tile(layout, 0), tile(layout, 6));

        let next = ring.engine.handle(&state, &clockwise).unwrap();
        assert_eq!(next.tile_of(runner), Some(tile(layout, 6)));
        assert_eq!(next.value_of(runner), Some(6));

        let shortcut = ring
            .engine
            .handle(&state.with_state(ArtifactState::value(layout.die, 5)), &clockwise)
            .unwrap();
        assert_eq!(shortcut.value_of(runner), Some(5));
    }

    #[test]
    fn test_pass_only_when_stuck() {
        let (ring, state) = rolled(RingGame::new(2, 12), 2);
        let player = ring.layout.players[0];
        let validation = ring.engine.validate(&Event::pass(player), &state);
        assert!(!validation.legal);
        assert_eq!(validation.reason, Some(RejectionReason::RuleViolation));
    }

    #[test]
    fn test_reaching_goal_ends_game() {
        let (ring, state) = rolled(RingGame::new(2, 12).with_goal(5), 5);
        let layout = &ring.layout;
        let (player, runner) = (layout.players[0], layout.runners[0][0]);

        let next = ring
            .engine
            .handle(&state, &Event::piece_move(player, runner, tile(layout, 0), tile(layout, 5)))
            .unwrap();
        assert!(next.is_ended());
        assert_eq!(next.winner(), Some(player));
        assert!(ring.engine.legal_moves(&next).is_empty());
    }
}
