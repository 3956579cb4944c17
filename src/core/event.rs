//! Events: the inputs the engine decides on.
//!
//! The engine knows three generic event shapes (move a piece between two
//! tiles, roll dice, pass) plus an open `Custom` shape for everything a game
//! module invents. Every event has an `EventKind` so the decision plan can
//! skip rules that only care about other kinds without running their
//! conditions.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::artifact::ArtifactId;

/// Event category. Kinds below `FIRST_CUSTOM` are reserved for the
/// built-in event shapes; games allocate their own from `FIRST_CUSTOM` up.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EventKind(pub u16);

impl EventKind {
    pub const MOVE: Self = Self(0);
    pub const ROLL: Self = Self(1);
    pub const PASS: Self = Self(2);
    /// First kind available to game modules.
    pub const FIRST_CUSTOM: Self = Self(16);

    /// Create an event kind.
    #[must_use]
    pub const fn new(id: u16) -> Self {
        Self(id)
    }

    /// Get the raw kind value.
    #[must_use]
    pub const fn raw(self) -> u16 {
        self.0
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            Self::MOVE => write!(f, "Move"),
            Self::ROLL => write!(f, "Roll"),
            Self::PASS => write!(f, "Pass"),
            Self(id) => write!(f, "EventKind({id})"),
        }
    }
}

/// A candidate input to the engine.
///
/// ## Example
///
/// ```
/// use rust_tabletop::core::{ArtifactId, Event, EventKind};
///
/// let mv = Event::piece_move(ArtifactId(0), ArtifactId(5), ArtifactId(10), ArtifactId(12));
/// assert_eq!(mv.kind(), EventKind::MOVE);
/// assert!(mv.references(ArtifactId(5)));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Event {
    /// Move `piece` from tile `from` to tile `to`.
    Move {
        player: ArtifactId,
        piece: ArtifactId,
        from: ArtifactId,
        to: ArtifactId,
    },

    /// Roll the game's dice. Values come from the RNG state in `GameState`.
    Roll { player: ArtifactId },

    /// Give up the rest of the turn.
    Pass { player: ArtifactId },

    /// Game-defined event.
    Custom {
        kind: EventKind,
        player: Option<ArtifactId>,
        /// Artifacts the event refers to. Meaning of each index is game-defined.
        artifacts: SmallVec<[ArtifactId; 3]>,
        /// Numeric payload. Meaning of each index is game-defined.
        values: SmallVec<[i64; 2]>,
    },
}

impl Event {
    /// Create a move event.
    #[must_use]
    pub const fn piece_move(
        player: ArtifactId,
        piece: ArtifactId,
        from: ArtifactId,
        to: ArtifactId,
    ) -> Self {
        Self::Move {
            player,
            piece,
            from,
            to,
        }
    }

    /// Create a roll event.
    #[must_use]
    pub const fn roll(player: ArtifactId) -> Self {
        Self::Roll { player }
    }

    /// Create a pass event.
    #[must_use]
    pub const fn pass(player: ArtifactId) -> Self {
        Self::Pass { player }
    }

    /// Create a custom event with no payload.
    #[must_use]
    pub fn custom(kind: EventKind, player: Option<ArtifactId>) -> Self {
        Self::Custom {
            kind,
            player,
            artifacts: SmallVec::new(),
            values: SmallVec::new(),
        }
    }

    /// Add an artifact to a custom event (builder pattern).
    ///
    /// Has no effect on the built-in shapes.
    #[must_use]
    pub fn with_artifact(mut self, artifact: ArtifactId) -> Self {
        if let Self::Custom { artifacts, .. } = &mut self {
            artifacts.push(artifact);
        }
        self
    }

    /// Add a value to a custom event (builder pattern).
    ///
    /// Has no effect on the built-in shapes.
    #[must_use]
    pub fn with_value(mut self, value: i64) -> Self {
        if let Self::Custom { values, .. } = &mut self {
            values.push(value);
        }
        self
    }

    /// The event's category.
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::Move { .. } => EventKind::MOVE,
            Self::Roll { .. } => EventKind::ROLL,
            Self::Pass { .. } => EventKind::PASS,
            Self::Custom { kind, .. } => *kind,
        }
    }

    /// The player performing the event, if any.
    #[must_use]
    pub const fn player(&self) -> Option<ArtifactId> {
        match self {
            Self::Move { player, .. } | Self::Roll { player } | Self::Pass { player } => {
                Some(*player)
            }
            Self::Custom { player, .. } => *player,
        }
    }

    /// `(piece, from, to)` for move events.
    #[must_use]
    pub const fn as_move(&self) -> Option<(ArtifactId, ArtifactId, ArtifactId)> {
        match self {
            Self::Move { piece, from, to, .. } => Some((*piece, *from, *to)),
            _ => None,
        }
    }

    /// Value at `index` of a custom event's payload, or `default`.
    #[must_use]
    pub fn value(&self, index: usize, default: i64) -> i64 {
        match self {
            Self::Custom { values, .. } => values.get(index).copied().unwrap_or(default),
            _ => default,
        }
    }

    /// Every artifact the event mentions, player first.
    #[must_use]
    pub fn artifacts(&self) -> SmallVec<[ArtifactId; 4]> {
        let mut out = SmallVec::new();
        match self {
            Self::Move {
                player,
                piece,
                from,
                to,
            } => out.extend([*player, *piece, *from, *to]),
            Self::Roll { player } | Self::Pass { player } => out.push(*player),
            Self::Custom {
                player, artifacts, ..
            } => {
                out.extend(player.iter().copied());
                out.extend(artifacts.iter().copied());
            }
        }
        out
    }

    /// Check whether the event mentions `artifact` anywhere.
    #[must_use]
    pub fn references(&self, artifact: ArtifactId) -> bool {
        self.artifacts().contains(&artifact)
    }
}

impl std::fmt::Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Move {
                player,
                piece,
                from,
                to,
            } => write!(f, "Move({player}: {piece} {from} -> {to})"),
            Self::Roll { player } => write!(f, "Roll({player})"),
            Self::Pass { player } => write!(f, "Pass({player})"),
            Self::Custom {
                kind,
                player,
                artifacts,
                values,
            } => write!(f, "{kind}({player:?}, {artifacts:?}, {values:?})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        let p = ArtifactId(0);
        assert_eq!(Event::roll(p).kind(), EventKind::ROLL);
        assert_eq!(Event::pass(p).kind(), EventKind::PASS);
        assert_eq!(
            Event::custom(EventKind::new(20), None).kind(),
            EventKind::new(20)
        );
    }

    #[test]
    fn test_move_accessors() {
        let event = Event::piece_move(ArtifactId(0), ArtifactId(1), ArtifactId(2), ArtifactId(3));

        assert_eq!(event.player(), Some(ArtifactId(0)));
        assert_eq!(
            event.as_move(),
            Some((ArtifactId(1), ArtifactId(2), ArtifactId(3)))
        );
        assert!(event.references(ArtifactId(3)));
        assert!(!event.references(ArtifactId(4)));
    }

    #[test]
    fn test_custom_builder() {
        let event = Event::custom(EventKind::FIRST_CUSTOM, Some(ArtifactId(1)))
            .with_artifact(ArtifactId(9))
            .with_value(250);

        assert_eq!(event.value(0, 0), 250);
        assert_eq!(event.value(1, -1), -1);
        assert!(event.references(ArtifactId(9)));
        assert!(event.references(ArtifactId(1)));
        assert_eq!(event.as_move(), None);
    }

    #[test]
    fn test_builder_ignored_on_builtin_shapes() {
        let event = Event::roll(ArtifactId(0)).with_value(6);
        assert_eq!(event, Event::roll(ArtifactId(0)));
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", EventKind::MOVE), "Move");
        assert_eq!(format!("{}", EventKind::new(30)), "EventKind(30)");
    }

    #[test]
    fn test_serialization() {
        let event = Event::piece_move(ArtifactId(0), ArtifactId(1), ArtifactId(2), ArtifactId(3));
        let json = serde_json::to_string(&event).unwrap();
        let deserialized: Event = serde_json::from_str(&json).unwrap();
        assert_eq!(event, deserialized);
    }
}
