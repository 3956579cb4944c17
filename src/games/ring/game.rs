//! Ring race setup.

use std::sync::Arc;

use crate::condition::builtin::{
    DestinationNotOwn, DistanceMatchesDice, EventIs, FollowsPattern, HasState, IsActivePlayer,
    LacksState, Ongoing, PieceAtOrigin, PieceOwnedByPlayer,
};
use crate::condition::ConditionExpr;
use crate::core::{ArtifactId, ArtifactKind, EngineConfig, EventKind, PhaseId};
use crate::engine::{Engine, EngineBuilder};
use crate::error::BuildError;
use crate::mutator::builtin::{ClearDice, MovePiece, PassTurn, RollDice};
use crate::mutator::MutatorChain;
use crate::rules::{Phase, Rule};
use crate::state::{ArtifactState, GameState, StateKind};
use crate::topology::Pattern;

use super::rules::{FinishOrPass, NoMoveAvailable, RecordProgress, RingMoves, SendHome};

/// Phase IDs for the ring race.
pub mod phases {
    use crate::core::PhaseId;

    pub const TURN: PhaseId = PhaseId(0);
    pub const ROLL: PhaseId = PhaseId(1);
    pub const MOVE: PhaseId = PhaseId(2);
}

/// Artifact IDs of a built ring race.
#[derive(Clone, Debug)]
pub struct RingLayout {
    /// Holds the game-ended marker.
    pub board: ArtifactId,
    pub die: ArtifactId,
    pub clockwise: ArtifactId,
    pub across: ArtifactId,
    /// Tiles in ring order.
    pub tiles: Vec<ArtifactId>,
    /// Players in seating order.
    pub players: Vec<ArtifactId>,
    /// Runners per player, same order as `players`.
    pub runners: Vec<Vec<ArtifactId>>,
    /// Home tile per player, same order as `players`.
    pub homes: Vec<ArtifactId>,
    /// Distance a runner must travel to win.
    pub goal: i64,
}

impl RingLayout {
    fn seat(&self, player: ArtifactId) -> Option<usize> {
        self.players.iter().position(|&p| p == player)
    }

    /// Runners owned by `player`.
    #[must_use]
    pub fn runners_of(&self, player: ArtifactId) -> &[ArtifactId] {
        self.seat(player).map(|seat| self.runners[seat].as_slice()).unwrap_or_default()
    }

    /// Home tile of `player`.
    #[must_use]
    pub fn home_of(&self, player: ArtifactId) -> Option<ArtifactId> {
        self.seat(player).map(|seat| self.homes[seat])
    }

    /// Tile at ring position `index`, wrapping. `None` on an empty ring.
    #[must_use]
    pub fn tile(&self, index: usize) -> Option<ArtifactId> {
        let wrapped = index.checked_rem(self.tiles.len())?;
        self.tiles.get(wrapped).copied()
    }
}

/// A built ring race.
#[derive(Debug)]
pub struct Ring {
    pub engine: Engine,
    pub initial: GameState,
    pub layout: Arc<RingLayout>,
}

/// Configuration for a ring race.
#[derive(Clone, Debug)]
pub struct RingGame {
    player_count: usize,
    tile_count: usize,
    runners_per_player: usize,
    across_distance: u32,
    goal: Option<i64>,
    seed: u64,
    config: EngineConfig,
}

impl RingGame {
    /// A race for `player_count` players on a ring of `tile_count` tiles.
    ///
    /// The `across` shortcut is only laid on rings of at least four tiles.
    #[must_use]
    pub fn new(player_count: usize, tile_count: usize) -> Self {
        Self {
            player_count,
            tile_count,
            runners_per_player: 1,
            across_distance: 5,
            goal: None,
            seed: 0,
            config: EngineConfig::default(),
        }
    }

    #[must_use]
    pub fn with_runners(mut self, count: usize) -> Self {
        self.runners_per_player = count;
        self
    }

    /// Labeled distance of the `across` shortcut.
    #[must_use]
    pub fn with_across_distance(mut self, distance: u32) -> Self {
        self.across_distance = distance;
        self
    }

    /// Distance needed to win. Defaults to one lap.
    #[must_use]
    pub fn with_goal(mut self, goal: i64) -> Self {
        self.goal = Some(goal);
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    #[must_use]
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Declare the board, players and runners.
    fn declare(&self, builder: &mut EngineBuilder) -> RingLayout {
        let board = builder.add_artifact(ArtifactKind::Other, "board", None);
        let die = builder.add_dice("die");
        let clockwise = builder.add_direction("clockwise");
        let across = builder.add_direction("across");

        let n = self.tile_count;
        let tiles: Vec<ArtifactId> = (0..n).map(|i| builder.add_tile(format!("t{i}"))).collect();
        for i in 0..n {
            builder.relate(tiles[i], tiles[(i + 1) % n], clockwise, 1);
        }
        if n >= 4 {
            let half = n / 2;
            builder.relate(tiles[0], tiles[half], across, self.across_distance);
            builder.relate(tiles[half], tiles[0], across, self.across_distance);
        }

        let mut players = Vec::with_capacity(self.player_count);
        let mut runners = Vec::with_capacity(self.player_count);
        let mut homes = Vec::with_capacity(self.player_count);
        for seat in 0..self.player_count {
            let player = builder.add_player(format!("p{seat}"));
            let home = tiles.get(seat * n / self.player_count.max(1)).copied();
            let mine: Vec<ArtifactId> = (0..self.runners_per_player)
                .map(|r| {
                    let runner = builder.add_piece(format!("p{seat}r{r}"), player, home);
                    // shortcut first: when both ways match the roll, take it
                    builder.add_pattern(runner, Pattern::any_of([across]));
                    builder.add_pattern(runner, Pattern::Repeat(clockwise));
                    builder.set_initial(ArtifactState::value(runner, 0));
                    runner
                })
                .collect();
            players.push(player);
            runners.push(mine);
            homes.push(home.unwrap_or(board));
        }

        RingLayout {
            board,
            die,
            clockwise,
            across,
            tiles,
            players,
            runners,
            homes,
            goal: self.goal.unwrap_or(n as i64),
        }
    }

    fn turn_phase(layout: &Arc<RingLayout>) -> Phase {
        let die = layout.die;

        let roll = Phase::new(phases::ROLL, "roll")
            .gated_by(LacksState {
                artifact: die,
                kind: StateKind::Value,
            })
            .with_rule(
                Rule::new(
                    "roll",
                    ConditionExpr::condition(EventIs(EventKind::ROLL))
                        .and(ConditionExpr::condition(IsActivePlayer)),
                    RollDice::new([die], 6),
                )
                .with_event_kind(EventKind::ROLL),
            );

        let move_condition = ConditionExpr::all([
            ConditionExpr::condition(IsActivePlayer),
            ConditionExpr::condition(PieceOwnedByPlayer),
            ConditionExpr::condition(PieceAtOrigin),
            ConditionExpr::condition(FollowsPattern),
            ConditionExpr::condition(DistanceMatchesDice::new([die])),
            ConditionExpr::condition(DestinationNotOwn),
        ]);
        let move_mutator = MutatorChain::new()
            .then(SendHome::new(Arc::clone(layout)))
            .then(RecordProgress::new(die))
            .then(MovePiece)
            .then(ClearDice::new([die]))
            .then(FinishOrPass::new(Arc::clone(layout)));

        let moving = Phase::new(phases::MOVE, "move")
            .gated_by(HasState {
                artifact: die,
                kind: StateKind::Value,
            })
            .with_rule(
                Rule::new("move", move_condition, move_mutator).with_event_kind(EventKind::MOVE),
            )
            .with_rule(
                Rule::new(
                    "pass",
                    ConditionExpr::condition(IsActivePlayer)
                        .and(ConditionExpr::condition(NoMoveAvailable::new(Arc::clone(layout)))),
                    MutatorChain::new().then(ClearDice::new([die])).then(PassTurn),
                )
                .with_event_kind(EventKind::PASS),
            );

        Phase::new(phases::TURN, "turn")
            .gated_by(Ongoing)
            .with_generator(RingMoves::new(Arc::clone(layout)))
            .with_phase(roll)
            .with_phase(moving)
    }

    /// Build the engine and initial state.
    pub fn build(&self) -> Result<Ring, BuildError> {
        let mut builder = EngineBuilder::new()
            .with_config(self.config.clone())
            .with_seed(self.seed);
        let layout = Arc::new(self.declare(&mut builder));
        builder.add_phase(Self::turn_phase(&layout));

        let (engine, initial) = builder.build()?;
        Ok(Ring {
            engine,
            initial,
            layout,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Event;

    fn tile(layout: &RingLayout, index: usize) -> ArtifactId {
        layout.tile(index).expect("ring has tiles")
    }

    #[test]
    fn test_layout() {
        let ring = RingGame::new(3, 12).with_runners(2).build().unwrap();
        let layout = &ring.layout;

        assert_eq!(layout.tiles.len(), 12);
        assert_eq!(layout.players.len(), 3);
        assert_eq!(layout.homes, vec![tile(layout, 0), tile(layout, 4), tile(layout, 8)]);
        assert_eq!(layout.goal, 12);

        let runner = layout.runners_of(layout.players[1])[1];
        assert_eq!(ring.initial.tile_of(runner), Some(tile(layout, 4)));
        assert_eq!(ring.initial.value_of(runner), Some(0));
        assert_eq!(ring.initial.active_player(), Some(layout.players[0]));
    }

    #[test]
    fn test_tile_wraps_and_empty_ring_has_none() {
        let mut layout = RingGame::new(2, 6).build().unwrap().layout.as_ref().clone();
        assert_eq!(layout.tile(7), Some(layout.tiles[1]));

        layout.tiles.clear();
        assert_eq!(layout.tile(0), None);
        assert_eq!(layout.tile(3), None);
    }

    #[test]
    fn test_phases() {
        let ring = RingGame::new(2, 12).with_seed(1).build().unwrap();
        let engine = &ring.engine;
        let player = ring.layout.players[0];

        let roll_phase = engine.plan().active_phase(engine, &ring.initial).unwrap();
        assert_eq!(roll_phase.id, phases::ROLL);

        let rolled = engine.handle(&ring.initial, &Event::roll(player)).unwrap();
        let face = rolled.value_of(ring.layout.die).unwrap();
        assert!((1..=6).contains(&face));
        assert_eq!(engine.plan().active_phase(engine, &rolled).unwrap().id, phases::MOVE);
    }

    #[test]
    fn test_small_ring_has_no_shortcut() {
        let ring = RingGame::new(2, 3).build().unwrap();
        assert_eq!(ring.engine.topology().len(), 3);
    }
}
