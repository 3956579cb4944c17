//! Immutable game-state snapshots.

use std::sync::{Arc, OnceLock};

use im::OrdMap;

use crate::core::{ArtifactId, GameRngState};
use crate::hash::{fingerprint, Canonical, CanonicalEncoder, StateHash};

use super::extras::Extras;
use super::value::{ArtifactState, Delta, StateKey, StateKind, StateValue};

/// Full snapshot of a game.
///
/// Uses `im` persistent maps, so cloning is O(1) and `advance` copies only
/// the path to each changed entry. Unchanged artifact states are shared by
/// `Arc` between a snapshot and every snapshot derived from it.
///
/// A snapshot never changes after construction. Every operation that
/// "modifies" a state returns a new one.
///
/// Equality compares artifact states, extras and RNG state by value. The
/// cached fingerprint is not part of equality.
#[derive(Clone, Default)]
pub struct GameState {
    states: OrdMap<StateKey, Arc<ArtifactState>>,
    extras: Option<Arc<dyn Extras>>,
    rng: Option<GameRngState>,
    hash: OnceLock<StateHash>,
}

impl GameState {
    /// Create an empty state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a state holding `states`.
    pub fn from_states(states: impl IntoIterator<Item = ArtifactState>) -> Self {
        Self::new().advance(states)
    }

    fn derive(&self, states: OrdMap<StateKey, Arc<ArtifactState>>) -> Self {
        Self {
            states,
            extras: self.extras.clone(),
            rng: self.rng,
            hash: OnceLock::new(),
        }
    }

    /// Apply deltas in order, returning the new snapshot.
    ///
    /// `Set` replaces the artifact's state of that kind; `Remove` drops it.
    /// Setting a value equal to the current one keeps the existing shared
    /// entry.
    pub fn advance<I>(&self, deltas: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Delta>,
    {
        let mut states = self.states.clone();
        for delta in deltas {
            match delta.into() {
                Delta::Set(state) => {
                    let key = state.key();
                    if states.get(&key).is_some_and(|current| **current == state) {
                        continue;
                    }
                    states.insert(key, Arc::new(state));
                }
                Delta::Remove { artifact, kind } => {
                    states.remove(&StateKey::new(artifact, kind));
                }
            }
        }
        self.derive(states)
    }

    /// Set a single artifact state.
    #[must_use]
    pub fn with_state(&self, state: ArtifactState) -> Self {
        self.advance([Delta::Set(state)])
    }

    /// Replace the extras slot.
    #[must_use]
    pub fn with_extras<E: Extras>(&self, extras: E) -> Self {
        self.with_shared_extras(Arc::new(extras))
    }

    /// Replace the extras slot with an already shared value.
    #[must_use]
    pub fn with_shared_extras(&self, extras: Arc<dyn Extras>) -> Self {
        Self {
            extras: Some(extras),
            ..self.derive(self.states.clone())
        }
    }

    /// Clear the extras slot.
    #[must_use]
    pub fn without_extras(&self) -> Self {
        Self {
            extras: None,
            ..self.derive(self.states.clone())
        }
    }

    /// Replace the RNG state.
    #[must_use]
    pub fn with_rng(&self, rng: GameRngState) -> Self {
        Self {
            rng: Some(rng),
            ..self.derive(self.states.clone())
        }
    }

    /// Seed a fresh RNG.
    #[must_use]
    pub fn with_seed(&self, seed: u64) -> Self {
        self.with_rng(GameRngState::seeded(seed))
    }

    // === Queries ===

    /// The artifact's state of `kind`, if any.
    #[must_use]
    pub fn state_of(&self, artifact: ArtifactId, kind: StateKind) -> Option<&ArtifactState> {
        self.shared_state_of(artifact, kind).map(Arc::as_ref)
    }

    /// The shared handle behind `state_of`. Two snapshots return the same
    /// handle for entries neither changed.
    #[must_use]
    pub fn shared_state_of(
        &self,
        artifact: ArtifactId,
        kind: StateKind,
    ) -> Option<&Arc<ArtifactState>> {
        self.states.get(&StateKey::new(artifact, kind))
    }

    /// Every state of `kind`, ordered by artifact.
    pub fn states_of_kind(&self, kind: StateKind) -> impl Iterator<Item = &ArtifactState> + '_ {
        let first = StateKey::new(ArtifactId(u32::MIN), kind);
        let last = StateKey::new(ArtifactId(u32::MAX), kind);
        self.states
            .range(first..=last)
            .map(|(_, state)| Arc::as_ref(state))
    }

    /// Every state attached to `artifact`.
    pub fn states_of(&self, artifact: ArtifactId) -> impl Iterator<Item = &ArtifactState> + '_ {
        self.iter().filter(move |state| state.artifact == artifact)
    }

    /// Every state, ordered by kind then artifact.
    pub fn iter(&self) -> impl Iterator<Item = &ArtifactState> + '_ {
        self.states.iter().map(|(_, state)| Arc::as_ref(state))
    }

    /// Tile the piece stands on.
    #[must_use]
    pub fn tile_of(&self, piece: ArtifactId) -> Option<ArtifactId> {
        match self.state_of(piece, StateKind::OnTile)?.value {
            StateValue::OnTile { tile } => Some(tile),
            _ => None,
        }
    }

    /// Pieces standing on `tile`.
    pub fn pieces_on(&self, tile: ArtifactId) -> impl Iterator<Item = ArtifactId> + '_ {
        self.states_of_kind(StateKind::OnTile)
            .filter(move |state| matches!(state.value, StateValue::OnTile { tile: t } if t == tile))
            .map(|state| state.artifact)
    }

    /// First piece on `tile`, if any.
    #[must_use]
    pub fn occupant(&self, tile: ArtifactId) -> Option<ArtifactId> {
        self.pieces_on(tile).next()
    }

    /// The artifact's numeric value.
    #[must_use]
    pub fn value_of(&self, artifact: ArtifactId) -> Option<i64> {
        match self.state_of(artifact, StateKind::Value)?.value {
            StateValue::Value { value } => Some(value),
            _ => None,
        }
    }

    /// The active artifact (lowest id if several are marked active).
    #[must_use]
    pub fn active_player(&self) -> Option<ArtifactId> {
        self.states_of_kind(StateKind::Active)
            .next()
            .map(|state| state.artifact)
    }

    /// Whether any artifact carries an `Ended` state.
    #[must_use]
    pub fn is_ended(&self) -> bool {
        self.states_of_kind(StateKind::Ended).next().is_some()
    }

    /// Winner recorded by the first `Ended` state.
    #[must_use]
    pub fn winner(&self) -> Option<ArtifactId> {
        self.states_of_kind(StateKind::Ended)
            .find_map(|state| match state.value {
                StateValue::Ended { winner } => winner,
                _ => None,
            })
    }

    /// Extras slot.
    #[must_use]
    pub fn extras(&self) -> Option<&dyn Extras> {
        self.extras.as_deref()
    }

    /// Extras slot, downcast to the module's concrete type.
    #[must_use]
    pub fn extras_as<E: Extras>(&self) -> Option<&E> {
        self.extras.as_deref()?.as_any().downcast_ref::<E>()
    }

    /// RNG state, if the game uses randomness.
    #[must_use]
    pub fn rng(&self) -> Option<GameRngState> {
        self.rng
    }

    /// Number of artifact states.
    #[must_use]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Check if there are no artifact states.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Canonical fingerprint. Computed once per snapshot.
    pub fn hash(&self) -> StateHash {
        *self.hash.get_or_init(|| fingerprint(self))
    }
}

impl PartialEq for GameState {
    fn eq(&self, other: &Self) -> bool {
        let extras_eq = match (&self.extras, &other.extras) {
            (None, None) => true,
            (Some(a), Some(b)) => Arc::ptr_eq(a, b) || (**a).eq_extras(&**b),
            _ => false,
        };
        extras_eq && self.rng == other.rng && self.states == other.states
    }
}

impl Eq for GameState {}

impl std::fmt::Debug for GameState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameState")
            .field("states", &self.iter().collect::<Vec<_>>())
            .field("extras", &self.extras)
            .field("rng", &self.rng)
            .finish()
    }
}

impl Canonical for GameState {
    fn encode(&self, enc: &mut CanonicalEncoder<'_>) {
        enc.structure("GameState")
            .field("states", &self.states)
            .field("extras", &self.extras)
            .field("rng", &self.rng)
            .finish();
    }
}
