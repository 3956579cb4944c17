//! Generic mutators.

use std::sync::Arc;

use smallvec::SmallVec;

use crate::core::{ArtifactId, Event, GameRng};
use crate::engine::Engine;
use crate::error::EngineError;
use crate::state::{ArtifactState, Delta, Extras, GameState, StateKind};

use super::Mutator;

fn expect_move(
    event: &Event,
    mutator: &str,
) -> Result<(ArtifactId, ArtifactId, ArtifactId), EngineError> {
    event.as_move().ok_or_else(|| {
        EngineError::invariant(format!("{mutator} applied to non-move event {event}"))
    })
}

/// Move the event's piece from origin to destination.
///
/// Fails with an invariant error if the piece is not on the origin tile.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MovePiece;

impl Mutator for MovePiece {
    fn mutate(
        &self,
        engine: &Engine,
        state: &GameState,
        event: &Event,
    ) -> Result<GameState, EngineError> {
        let (piece, from, to) = expect_move(event, "MovePiece")?;
        if state.tile_of(piece) != Some(from) {
            let names = engine.artifacts();
            return Err(EngineError::invariant(format!(
                "{} is on {:?}, not {}",
                names.name(piece),
                state.tile_of(piece).map(|t| names.name(t)),
                names.name(from)
            )));
        }
        Ok(state.advance([ArtifactState::on_tile(piece, to)]))
    }

    fn name(&self) -> &str {
        "MovePiece"
    }
}

/// Take every other piece off the destination tile, either off the board
/// or onto a holding tile (a backgammon bar, a chess capture tray).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RemoveOccupant {
    pub send_to: Option<ArtifactId>,
}

impl RemoveOccupant {
    /// Captured pieces leave the board.
    #[must_use]
    pub const fn off_board() -> Self {
        Self { send_to: None }
    }

    /// Captured pieces go to `tile`.
    #[must_use]
    pub const fn send_to(tile: ArtifactId) -> Self {
        Self { send_to: Some(tile) }
    }
}

impl Mutator for RemoveOccupant {
    fn mutate(
        &self,
        _engine: &Engine,
        state: &GameState,
        event: &Event,
    ) -> Result<GameState, EngineError> {
        let (piece, _, to) = expect_move(event, "RemoveOccupant")?;
        let deltas: SmallVec<[Delta; 2]> = state
            .pieces_on(to)
            .filter(|&other| other != piece)
            .map(|other| match self.send_to {
                Some(tile) => Delta::Set(ArtifactState::on_tile(other, tile)),
                None => Delta::remove(other, StateKind::OnTile),
            })
            .collect();
        Ok(state.advance(deltas))
    }

    fn name(&self) -> &str {
        "RemoveOccupant"
    }
}

/// Set a fixed artifact state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SetState(pub ArtifactState);

impl Mutator for SetState {
    fn mutate(
        &self,
        _engine: &Engine,
        state: &GameState,
        _event: &Event,
    ) -> Result<GameState, EngineError> {
        Ok(state.with_state(self.0.clone()))
    }

    fn name(&self) -> &str {
        "SetState"
    }
}

/// Drop an artifact state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RemoveState {
    pub artifact: ArtifactId,
    pub kind: StateKind,
}

impl Mutator for RemoveState {
    fn mutate(
        &self,
        _engine: &Engine,
        state: &GameState,
        _event: &Event,
    ) -> Result<GameState, EngineError> {
        Ok(state.advance([Delta::remove(self.artifact, self.kind)]))
    }

    fn name(&self) -> &str {
        "RemoveState"
    }
}

/// Mark the next player in seating order active.
///
/// With no active player, the first seat becomes active.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PassTurn;

impl Mutator for PassTurn {
    fn mutate(
        &self,
        engine: &Engine,
        state: &GameState,
        _event: &Event,
    ) -> Result<GameState, EngineError> {
        let current = state.active_player();
        let next = match current {
            Some(player) => engine.next_player(player),
            None => engine.seating().first().copied(),
        }
        .ok_or_else(|| EngineError::invariant("no seating order to pass the turn along"))?;

        let mut deltas: SmallVec<[Delta; 2]> = SmallVec::new();
        if let Some(player) = current {
            deltas.push(Delta::remove(player, StateKind::Active));
        }
        deltas.push(Delta::Set(ArtifactState::active(next)));
        Ok(state.advance(deltas))
    }

    fn name(&self) -> &str {
        "PassTurn"
    }
}

/// Roll each listed die using the RNG state carried by `GameState`, and
/// store the advanced RNG state back.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RollDice {
    pub dice: SmallVec<[ArtifactId; 2]>,
    pub sides: u32,
}

impl RollDice {
    pub fn new(dice: impl IntoIterator<Item = ArtifactId>, sides: u32) -> Self {
        Self {
            dice: dice.into_iter().collect(),
            sides,
        }
    }
}

impl Mutator for RollDice {
    fn mutate(
        &self,
        _engine: &Engine,
        state: &GameState,
        _event: &Event,
    ) -> Result<GameState, EngineError> {
        let rng_state = state
            .rng()
            .ok_or_else(|| EngineError::invariant("dice rolled in a game without RNG state"))?;
        let mut rng = GameRng::from_state(&rng_state);
        let faces: SmallVec<[ArtifactState; 2]> = self
            .dice
            .iter()
            .map(|&die| ArtifactState::value(die, rng.roll(self.sides)))
            .collect();
        Ok(state.advance(faces).with_rng(rng.state()))
    }

    fn name(&self) -> &str {
        "RollDice"
    }
}

/// Remove the first listed die whose value equals the distance of one of
/// the move's paths, trying paths in pattern order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConsumeMatchingDie {
    pub dice: SmallVec<[ArtifactId; 2]>,
}

impl ConsumeMatchingDie {
    pub fn new(dice: impl IntoIterator<Item = ArtifactId>) -> Self {
        Self {
            dice: dice.into_iter().collect(),
        }
    }
}

impl Mutator for ConsumeMatchingDie {
    fn mutate(
        &self,
        engine: &Engine,
        state: &GameState,
        event: &Event,
    ) -> Result<GameState, EngineError> {
        let (piece, from, to) = expect_move(event, "ConsumeMatchingDie")?;
        let die = engine
            .paths_for(piece, from, to)
            .iter()
            .find_map(|path| {
                let distance = i64::from(path.distance);
                self.dice
                    .iter()
                    .copied()
                    .find(|&die| state.value_of(die) == Some(distance))
            })
            .ok_or_else(|| EngineError::invariant(format!("no die matches a path of {event}")))?;
        Ok(state.advance([Delta::remove(die, StateKind::Value)]))
    }

    fn name(&self) -> &str {
        "ConsumeMatchingDie"
    }
}

/// Clear every listed die.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClearDice {
    pub dice: SmallVec<[ArtifactId; 2]>,
}

impl ClearDice {
    pub fn new(dice: impl IntoIterator<Item = ArtifactId>) -> Self {
        Self {
            dice: dice.into_iter().collect(),
        }
    }
}

impl Mutator for ClearDice {
    fn mutate(
        &self,
        _engine: &Engine,
        state: &GameState,
        _event: &Event,
    ) -> Result<GameState, EngineError> {
        Ok(state.advance(self.dice.iter().map(|&die| Delta::remove(die, StateKind::Value))))
    }

    fn name(&self) -> &str {
        "ClearDice"
    }
}

/// Who wins when `EndGame` fires.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Winner {
    /// The player who made the ending event.
    EventPlayer,
    /// A fixed artifact, or `None` for a draw.
    Fixed(Option<ArtifactId>),
}

/// Record the end of the game on `marker`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EndGame {
    pub marker: ArtifactId,
    pub winner: Winner,
}

impl EndGame {
    /// The event's player wins.
    #[must_use]
    pub const fn won_by_event_player(marker: ArtifactId) -> Self {
        Self {
            marker,
            winner: Winner::EventPlayer,
        }
    }

    /// Nobody wins.
    #[must_use]
    pub const fn draw(marker: ArtifactId) -> Self {
        Self {
            marker,
            winner: Winner::Fixed(None),
        }
    }
}

impl Mutator for EndGame {
    fn mutate(
        &self,
        _engine: &Engine,
        state: &GameState,
        event: &Event,
    ) -> Result<GameState, EngineError> {
        let winner = match self.winner {
            Winner::EventPlayer => event.player(),
            Winner::Fixed(winner) => winner,
        };
        Ok(state.with_state(ArtifactState::ended(self.marker, winner)))
    }

    fn name(&self) -> &str {
        "EndGame"
    }
}

/// Replace the extras slot with a fixed value.
#[derive(Clone, Debug)]
pub struct ReplaceExtras(pub Arc<dyn Extras>);

impl Mutator for ReplaceExtras {
    fn mutate(
        &self,
        _engine: &Engine,
        state: &GameState,
        _event: &Event,
    ) -> Result<GameState, EngineError> {
        Ok(state.with_shared_extras(Arc::clone(&self.0)))
    }

    fn name(&self) -> &str {
        "ReplaceExtras"
    }
}

/// Closure-backed mutator for module-specific transitions.
pub struct MutatorFn<F> {
    name: &'static str,
    f: F,
}

/// Wrap a closure as a `Mutator`.
pub fn mutator_fn<F>(name: &'static str, f: F) -> MutatorFn<F>
where
    F: Fn(&Engine, &GameState, &Event) -> Result<GameState, EngineError> + Send + Sync,
{
    MutatorFn { name, f }
}

impl<F> Mutator for MutatorFn<F>
where
    F: Fn(&Engine, &GameState, &Event) -> Result<GameState, EngineError> + Send + Sync,
{
    fn mutate(
        &self,
        engine: &Engine,
        state: &GameState,
        event: &Event,
    ) -> Result<GameState, EngineError> {
        (self.f)(engine, state, event)
    }

    fn name(&self) -> &str {
        self.name
    }
}
