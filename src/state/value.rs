//! Artifact states and deltas.
//!
//! An `ArtifactState` is the current typed value attached to one artifact.
//! An artifact can carry several states at once, but at most one of each
//! `StateKind`: a piece has one position, a die has one face value.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::ArtifactId;
use crate::hash::{Canonical, CanonicalEncoder};

/// Kind of an artifact state. Part of the storage key, so an artifact holds
/// at most one state per kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StateKind {
    /// Piece standing on a tile.
    OnTile,
    /// A single number: a die's face, a player's cash, a counter.
    Value,
    /// Artifact is the active one (usually: whose turn it is).
    Active,
    /// The game is over.
    Ended,
    /// Game-module state, distinguished by a module-chosen tag.
    Custom(u16),
}

/// Payload of an artifact state.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StateValue {
    OnTile { tile: ArtifactId },
    Value { value: i64 },
    Active,
    Ended { winner: Option<ArtifactId> },
    Custom { tag: u16, values: SmallVec<[i64; 4]> },
}

impl StateValue {
    /// The kind this payload is stored under.
    #[must_use]
    pub const fn kind(&self) -> StateKind {
        match self {
            Self::OnTile { .. } => StateKind::OnTile,
            Self::Value { .. } => StateKind::Value,
            Self::Active => StateKind::Active,
            Self::Ended { .. } => StateKind::Ended,
            Self::Custom { tag, .. } => StateKind::Custom(*tag),
        }
    }
}

/// Current state of one artifact. Equality is by value.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArtifactState {
    pub artifact: ArtifactId,
    pub value: StateValue,
}

impl ArtifactState {
    /// Create a state.
    #[must_use]
    pub const fn new(artifact: ArtifactId, value: StateValue) -> Self {
        Self { artifact, value }
    }

    /// Piece `piece` stands on `tile`.
    #[must_use]
    pub const fn on_tile(piece: ArtifactId, tile: ArtifactId) -> Self {
        Self::new(piece, StateValue::OnTile { tile })
    }

    /// Artifact carries a number.
    #[must_use]
    pub const fn value(artifact: ArtifactId, value: i64) -> Self {
        Self::new(artifact, StateValue::Value { value })
    }

    /// Artifact is active.
    #[must_use]
    pub const fn active(artifact: ArtifactId) -> Self {
        Self::new(artifact, StateValue::Active)
    }

    /// Game ended, recorded on `marker` (usually the board artifact).
    #[must_use]
    pub const fn ended(marker: ArtifactId, winner: Option<ArtifactId>) -> Self {
        Self::new(marker, StateValue::Ended { winner })
    }

    /// Module-defined state.
    pub fn custom(artifact: ArtifactId, tag: u16, values: impl IntoIterator<Item = i64>) -> Self {
        Self::new(
            artifact,
            StateValue::Custom {
                tag,
                values: values.into_iter().collect(),
            },
        )
    }

    /// Kind this state is stored under.
    #[must_use]
    pub const fn kind(&self) -> StateKind {
        self.value.kind()
    }

    /// Storage key.
    #[must_use]
    pub const fn key(&self) -> StateKey {
        StateKey {
            kind: self.kind(),
            artifact: self.artifact,
        }
    }
}

/// Storage key: kind first, so every state of one kind is a contiguous range.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StateKey {
    pub kind: StateKind,
    pub artifact: ArtifactId,
}

impl StateKey {
    #[must_use]
    pub const fn new(artifact: ArtifactId, kind: StateKind) -> Self {
        Self { kind, artifact }
    }
}

/// One change applied by `GameState::advance`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Delta {
    /// Replace (not merge) the artifact's state of this kind.
    Set(ArtifactState),
    /// Drop the artifact's state of this kind, if any.
    Remove { artifact: ArtifactId, kind: StateKind },
}

impl Delta {
    /// Create a removal delta.
    #[must_use]
    pub const fn remove(artifact: ArtifactId, kind: StateKind) -> Self {
        Self::Remove { artifact, kind }
    }
}

impl From<ArtifactState> for Delta {
    fn from(state: ArtifactState) -> Self {
        Self::Set(state)
    }
}

impl Canonical for StateKind {
    fn encode(&self, enc: &mut CanonicalEncoder<'_>) {
        match self {
            Self::OnTile => enc.variant("StateKind", "OnTile").finish(),
            Self::Value => enc.variant("StateKind", "Value").finish(),
            Self::Active => enc.variant("StateKind", "Active").finish(),
            Self::Ended => enc.variant("StateKind", "Ended").finish(),
            Self::Custom(tag) => enc.variant("StateKind", "Custom").field("tag", tag).finish(),
        }
    }
}

impl Canonical for StateKey {
    fn encode(&self, enc: &mut CanonicalEncoder<'_>) {
        enc.structure("StateKey")
            .field("kind", &self.kind)
            .field("artifact", &self.artifact)
            .finish();
    }
}

impl Canonical for StateValue {
    fn encode(&self, enc: &mut CanonicalEncoder<'_>) {
        match self {
            Self::OnTile { tile } => {
                enc.variant("StateValue", "OnTile").field("tile", tile).finish();
            }
            Self::Value { value } => {
                enc.variant("StateValue", "Value").field("value", value).finish();
            }
            Self::Active => enc.variant("StateValue", "Active").finish(),
            Self::Ended { winner } => enc
                .variant("StateValue", "Ended")
                .field("winner", winner)
                .finish(),
            Self::Custom { tag, values } => enc
                .variant("StateValue", "Custom")
                .field("tag", tag)
                .field("values", values)
                .finish(),
        }
    }
}

impl Canonical for ArtifactState {
    fn encode(&self, enc: &mut CanonicalEncoder<'_>) {
        enc.structure("ArtifactState")
            .field("artifact", &self.artifact)
            .field("value", &self.value)
            .finish();
    }
}
