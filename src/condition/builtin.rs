//! Generic conditions every board game needs.
//!
//! None of these know what a king or a capture is. Movement conditions ask
//! the engine for the piece's path and look at the tiles along it; anything
//! game-specific belongs in a module's own `Condition` impls or in
//! [`ConditionFn`] closures.
//!
//! Conditions about moves return `Ignore` for every other event, so they
//! can sit in a shared AND without filtering by kind first.

use smallvec::SmallVec;

use crate::core::{ArtifactId, Event, EventKind};
use crate::engine::Engine;
use crate::state::{GameState, StateKind, StateValue};
use crate::topology::TilePath;

use super::{Condition, ConditionResponse, RejectionReason, StateCondition};

// === Event conditions ===

/// Valid for events of this kind, Ignore for everything else.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EventIs(pub EventKind);

impl Condition for EventIs {
    fn evaluate(&self, _engine: &Engine, _state: &GameState, event: &Event) -> ConditionResponse {
        if event.kind() == self.0 {
            ConditionResponse::valid()
        } else {
            ConditionResponse::ignore()
        }
    }

    fn name(&self) -> &str {
        "EventIs"
    }
}

/// The event's player is the active artifact.
///
/// Ignores events without a player and games that never mark anyone
/// active.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IsActivePlayer;

impl Condition for IsActivePlayer {
    fn evaluate(&self, engine: &Engine, state: &GameState, event: &Event) -> ConditionResponse {
        let (Some(player), Some(active)) = (event.player(), state.active_player()) else {
            return ConditionResponse::ignore();
        };
        let names = engine.artifacts();
        ConditionResponse::check(player == active, RejectionReason::NotOwner, || {
            format!("it is {}'s turn, not {}'s", names.name(active), names.name(player))
        })
    }

    fn name(&self) -> &str {
        "IsActivePlayer"
    }
}

/// The moving piece belongs to the moving player.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PieceOwnedByPlayer;

impl Condition for PieceOwnedByPlayer {
    fn evaluate(&self, engine: &Engine, _state: &GameState, event: &Event) -> ConditionResponse {
        let Event::Move { player, piece, .. } = *event else {
            return ConditionResponse::ignore();
        };
        let names = engine.artifacts();
        ConditionResponse::check(names.owner(piece) == Some(player), RejectionReason::NotOwner, || {
            format!("{} does not belong to {}", names.name(piece), names.name(player))
        })
    }

    fn name(&self) -> &str {
        "PieceOwnedByPlayer"
    }
}

/// The moving piece stands on the tile the event claims it leaves.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PieceAtOrigin;

impl Condition for PieceAtOrigin {
    fn evaluate(&self, engine: &Engine, state: &GameState, event: &Event) -> ConditionResponse {
        let Some((piece, from, _)) = event.as_move() else {
            return ConditionResponse::ignore();
        };
        let names = engine.artifacts();
        ConditionResponse::check(
            state.tile_of(piece) == Some(from),
            RejectionReason::RuleViolation,
            || format!("{} is not on {}", names.name(piece), names.name(from)),
        )
    }

    fn name(&self) -> &str {
        "PieceAtOrigin"
    }
}

fn no_path(
    engine: &Engine,
    piece: ArtifactId,
    from: ArtifactId,
    to: ArtifactId,
) -> ConditionResponse {
    let names = engine.artifacts();
    ConditionResponse::invalid(
        RejectionReason::InvalidPattern,
        format!(
            "{} cannot move from {} to {}",
            names.name(piece),
            names.name(from),
            names.name(to)
        ),
    )
}

fn resolve_move(engine: &Engine, event: &Event) -> Option<Result<TilePath, ConditionResponse>> {
    let (piece, from, to) = event.as_move()?;
    Some(
        engine
            .path_for(piece, from, to)
            .ok_or_else(|| no_path(engine, piece, from, to)),
    )
}

/// Some pattern of the moving piece resolves from origin to destination.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FollowsPattern;

impl Condition for FollowsPattern {
    fn evaluate(&self, engine: &Engine, _state: &GameState, event: &Event) -> ConditionResponse {
        match resolve_move(engine, event) {
            None => ConditionResponse::ignore(),
            Some(Ok(_)) => ConditionResponse::valid(),
            Some(Err(rejected)) => rejected,
        }
    }

    fn name(&self) -> &str {
        "FollowsPattern"
    }
}

/// No piece stands on a tile strictly between origin and destination.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PathUnobstructed;

impl Condition for PathUnobstructed {
    fn evaluate(&self, engine: &Engine, state: &GameState, event: &Event) -> ConditionResponse {
        let path = match resolve_move(engine, event) {
            None => return ConditionResponse::ignore(),
            Some(Ok(path)) => path,
            Some(Err(rejected)) => return rejected,
        };
        match path.intermediate().iter().find(|&&tile| state.occupant(tile).is_some()) {
            None => ConditionResponse::valid(),
            Some(&tile) => ConditionResponse::invalid(
                RejectionReason::PathObstructed,
                format!("path obstructed at {}", engine.artifacts().name(tile)),
            ),
        }
    }

    fn name(&self) -> &str {
        "PathUnobstructed"
    }
}

/// No other piece stands on the destination.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DestinationEmpty;

impl Condition for DestinationEmpty {
    fn evaluate(&self, engine: &Engine, state: &GameState, event: &Event) -> ConditionResponse {
        let Some((piece, _, to)) = event.as_move() else {
            return ConditionResponse::ignore();
        };
        match state.pieces_on(to).find(|&other| other != piece) {
            None => ConditionResponse::valid(),
            Some(other) => {
                let names = engine.artifacts();
                ConditionResponse::invalid(
                    RejectionReason::DestinationOccupied,
                    format!("{} is occupied by {}", names.name(to), names.name(other)),
                )
            }
        }
    }

    fn name(&self) -> &str {
        "DestinationEmpty"
    }
}

/// The destination holds no piece of the moving player. Opponent pieces
/// are allowed (they may be captured by the rule's mutator).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DestinationNotOwn;

impl Condition for DestinationNotOwn {
    fn evaluate(&self, engine: &Engine, state: &GameState, event: &Event) -> ConditionResponse {
        let Event::Move { player, piece, to, .. } = *event else {
            return ConditionResponse::ignore();
        };
        let names = engine.artifacts();
        let own = state
            .pieces_on(to)
            .find(|&other| other != piece && names.owner(other) == Some(player));
        match own {
            None => ConditionResponse::valid(),
            Some(other) => ConditionResponse::invalid(
                RejectionReason::DestinationOccupied,
                format!("{} already holds own piece {}", names.name(to), names.name(other)),
            ),
        }
    }

    fn name(&self) -> &str {
        "DestinationNotOwn"
    }
}

/// Some path of the move has a distance equal to the value currently
/// shown by one of the listed dice.
///
/// Every pattern of the piece is tried, not just the first that resolves,
/// so a roll may take the long way to a tile a shortcut also reaches.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DistanceMatchesDice {
    pub dice: SmallVec<[ArtifactId; 2]>,
}

impl DistanceMatchesDice {
    pub fn new(dice: impl IntoIterator<Item = ArtifactId>) -> Self {
        Self {
            dice: dice.into_iter().collect(),
        }
    }

    fn faces(&self, state: &GameState) -> SmallVec<[i64; 2]> {
        self.dice.iter().filter_map(|&die| state.value_of(die)).collect()
    }

    /// First path of the move, in pattern order, whose distance one of the
    /// dice shows.
    #[must_use]
    pub fn matching_path(
        &self,
        engine: &Engine,
        state: &GameState,
        event: &Event,
    ) -> Option<TilePath> {
        let (piece, from, to) = event.as_move()?;
        let faces = self.faces(state);
        engine
            .paths_for(piece, from, to)
            .into_iter()
            .find(|path| faces.contains(&i64::from(path.distance)))
    }
}

impl Condition for DistanceMatchesDice {
    fn evaluate(&self, engine: &Engine, state: &GameState, event: &Event) -> ConditionResponse {
        let Some((piece, from, to)) = event.as_move() else {
            return ConditionResponse::ignore();
        };
        let paths = engine.paths_for(piece, from, to);
        if paths.is_empty() {
            return no_path(engine, piece, from, to);
        }
        let faces = self.faces(state);
        if faces.is_empty() {
            return ConditionResponse::invalid(
                RejectionReason::InsufficientResources,
                "no dice rolled",
            );
        }
        let distances: SmallVec<[u32; 2]> = paths.iter().map(|path| path.distance).collect();
        let matched = distances.iter().any(|&d| faces.contains(&i64::from(d)));
        ConditionResponse::check(matched, RejectionReason::InvalidPattern, || {
            format!("distances {distances:?} match none of the dice {faces:?}")
        })
    }

    fn name(&self) -> &str {
        "DistanceMatchesDice"
    }
}

/// Rejects every event once the game has ended.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GameNotEnded;

impl Condition for GameNotEnded {
    fn evaluate(&self, _engine: &Engine, state: &GameState, _event: &Event) -> ConditionResponse {
        ConditionResponse::check(!state.is_ended(), RejectionReason::GameEnded, || {
            "the game has ended".to_string()
        })
    }

    fn name(&self) -> &str {
        "GameNotEnded"
    }
}

/// Closure-backed condition for module-specific checks.
pub struct ConditionFn<F> {
    name: &'static str,
    f: F,
}

/// Wrap a closure as a `Condition`.
pub fn condition_fn<F>(name: &'static str, f: F) -> ConditionFn<F>
where
    F: Fn(&Engine, &GameState, &Event) -> ConditionResponse + Send + Sync,
{
    ConditionFn { name, f }
}

impl<F> Condition for ConditionFn<F>
where
    F: Fn(&Engine, &GameState, &Event) -> ConditionResponse + Send + Sync,
{
    fn evaluate(&self, engine: &Engine, state: &GameState, event: &Event) -> ConditionResponse {
        (self.f)(engine, state, event)
    }

    fn name(&self) -> &str {
        self.name
    }
}

// === State conditions (phase gates) ===

/// The artifact carries a state of `kind`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HasState {
    pub artifact: ArtifactId,
    pub kind: StateKind,
}

impl StateCondition for HasState {
    fn evaluate(&self, state: &GameState) -> ConditionResponse {
        ConditionResponse::check(
            state.state_of(self.artifact, self.kind).is_some(),
            RejectionReason::WrongPhase,
            || format!("{} has no {:?} state", self.artifact, self.kind),
        )
    }

    fn name(&self) -> &str {
        "HasState"
    }
}

/// The artifact carries no state of `kind`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LacksState {
    pub artifact: ArtifactId,
    pub kind: StateKind,
}

impl StateCondition for LacksState {
    fn evaluate(&self, state: &GameState) -> ConditionResponse {
        ConditionResponse::check(
            state.state_of(self.artifact, self.kind).is_none(),
            RejectionReason::WrongPhase,
            || format!("{} still has a {:?} state", self.artifact, self.kind),
        )
    }

    fn name(&self) -> &str {
        "LacksState"
    }
}

/// The artifact's numeric value equals `value`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ValueEquals {
    pub artifact: ArtifactId,
    pub value: i64,
}

impl StateCondition for ValueEquals {
    fn evaluate(&self, state: &GameState) -> ConditionResponse {
        let current = state.value_of(self.artifact);
        ConditionResponse::check(current == Some(self.value), RejectionReason::WrongPhase, || {
            format!("{} is {current:?}, not {}", self.artifact, self.value)
        })
    }

    fn name(&self) -> &str {
        "ValueEquals"
    }
}

/// The state has no `Ended` marker.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Ongoing;

impl StateCondition for Ongoing {
    fn evaluate(&self, state: &GameState) -> ConditionResponse {
        ConditionResponse::check(!state.is_ended(), RejectionReason::GameEnded, || {
            "the game has ended".to_string()
        })
    }

    fn name(&self) -> &str {
        "Ongoing"
    }
}

/// The artifact stands on a tile (pieces still in play).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OnBoard(pub ArtifactId);

impl StateCondition for OnBoard {
    fn evaluate(&self, state: &GameState) -> ConditionResponse {
        let on_board = matches!(
            state.state_of(self.0, StateKind::OnTile).map(|s| &s.value),
            Some(StateValue::OnTile { .. })
        );
        ConditionResponse::check(on_board, RejectionReason::WrongPhase, || {
            format!("{} is not on the board", self.0)
        })
    }

    fn name(&self) -> &str {
        "OnBoard"
    }
}

/// Closure-backed phase gate.
pub struct GateFn<F> {
    name: &'static str,
    f: F,
}

/// Wrap a closure as a `StateCondition`.
pub fn gate_fn<F>(name: &'static str, f: F) -> GateFn<F>
where
    F: Fn(&GameState) -> ConditionResponse + Send + Sync,
{
    GateFn { name, f }
}

impl<F> StateCondition for GateFn<F>
where
    F: Fn(&GameState) -> ConditionResponse + Send + Sync,
{
    fn evaluate(&self, state: &GameState) -> ConditionResponse {
        (self.f)(state)
    }

    fn name(&self) -> &str {
        self.name
    }
}
