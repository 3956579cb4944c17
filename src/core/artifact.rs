//! Artifact identification and registry.
//!
//! Every identity-bearing game object (tile, piece, player, dice, direction)
//! is an artifact with a stable `ArtifactId`. Artifacts are declared once at
//! build time and never change identity afterwards; everything that changes
//! during play lives in `GameState` as an `ArtifactState`.
//!
//! ## Usage
//!
//! ```
//! use rust_tabletop::core::{ArtifactKind, Artifacts};
//!
//! let mut artifacts = Artifacts::new();
//! let white = artifacts.add(ArtifactKind::Player, "white", None);
//! let pawn = artifacts.add(ArtifactKind::Piece, "pawn", Some(white));
//!
//! assert_eq!(artifacts.owner(pawn), Some(white));
//! assert!(artifacts.is_kind(pawn, ArtifactKind::Piece));
//! ```

use serde::{Deserialize, Serialize};

/// Stable identifier for any artifact.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ArtifactId(pub u32);

impl ArtifactId {
    /// Create an artifact ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[must_use]
    pub(crate) const fn index(self) -> usize {
        self.0 as usize
    }
}

impl From<u32> for ArtifactId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Artifact({})", self.0)
    }
}

/// What an artifact is. The engine only uses this for build-time checks
/// and for the query surface; rules never branch on it implicitly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ArtifactKind {
    Tile,
    Piece,
    Player,
    Dice,
    Direction,
    /// Anything else a game module needs identity for (the board, a bank).
    Other,
}

/// A declared artifact.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    pub id: ArtifactId,
    pub kind: ArtifactKind,
    /// Human-readable name (for diagnostics).
    pub name: String,
    /// Owning artifact (usually a player). `None` for shared artifacts.
    pub owner: Option<ArtifactId>,
}

/// Registry of all declared artifacts, indexed by ID.
///
/// IDs are allocated densely in declaration order, so lookup is a `Vec` index.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifacts {
    entries: Vec<Artifact>,
}

impl Artifacts {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a new artifact and return its ID.
    pub fn add(
        &mut self,
        kind: ArtifactKind,
        name: impl Into<String>,
        owner: Option<ArtifactId>,
    ) -> ArtifactId {
        let id = ArtifactId(self.entries.len() as u32);
        self.entries.push(Artifact {
            id,
            kind,
            name: name.into(),
            owner,
        });
        id
    }

    /// Look up an artifact.
    #[must_use]
    pub fn get(&self, id: ArtifactId) -> Option<&Artifact> {
        self.entries.get(id.index())
    }

    /// Check whether an ID was declared.
    #[must_use]
    pub fn contains(&self, id: ArtifactId) -> bool {
        id.index() < self.entries.len()
    }

    /// Kind of an artifact, if declared.
    #[must_use]
    pub fn kind(&self, id: ArtifactId) -> Option<ArtifactKind> {
        self.get(id).map(|a| a.kind)
    }

    /// Check an artifact's kind.
    #[must_use]
    pub fn is_kind(&self, id: ArtifactId, kind: ArtifactKind) -> bool {
        self.kind(id) == Some(kind)
    }

    /// Owner of an artifact, if it has one.
    #[must_use]
    pub fn owner(&self, id: ArtifactId) -> Option<ArtifactId> {
        self.get(id).and_then(|a| a.owner)
    }

    /// Name of an artifact, or `"?"` for undeclared IDs.
    #[must_use]
    pub fn name(&self, id: ArtifactId) -> &str {
        self.get(id).map_or("?", |a| a.name.as_str())
    }

    /// Find an artifact by kind and name.
    #[must_use]
    pub fn find(&self, kind: ArtifactKind, name: &str) -> Option<ArtifactId> {
        self.entries
            .iter()
            .find(|a| a.kind == kind && a.name == name)
            .map(|a| a.id)
    }

    /// Iterate artifacts of one kind in declaration order.
    pub fn of_kind(&self, kind: ArtifactKind) -> impl Iterator<Item = &Artifact> {
        self.entries.iter().filter(move |a| a.kind == kind)
    }

    /// Iterate artifacts owned by `owner`.
    pub fn owned_by(&self, owner: ArtifactId) -> impl Iterator<Item = &Artifact> {
        self.entries.iter().filter(move |a| a.owner == Some(owner))
    }

    /// Number of declared artifacts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if no artifacts are declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate all artifacts.
    pub fn iter(&self) -> impl Iterator<Item = &Artifact> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dense_allocation() {
        let mut artifacts = Artifacts::new();
        let a = artifacts.add(ArtifactKind::Tile, "a1", None);
        let b = artifacts.add(ArtifactKind::Tile, "a2", None);

        assert_eq!(a, ArtifactId(0));
        assert_eq!(b, ArtifactId(1));
        assert_eq!(artifacts.len(), 2);
    }

    #[test]
    fn test_owner_and_kind() {
        let mut artifacts = Artifacts::new();
        let black = artifacts.add(ArtifactKind::Player, "black", None);
        let stone = artifacts.add(ArtifactKind::Piece, "stone", Some(black));

        assert_eq!(artifacts.owner(stone), Some(black));
        assert_eq!(artifacts.owner(black), None);
        assert!(artifacts.is_kind(black, ArtifactKind::Player));
        assert!(!artifacts.is_kind(stone, ArtifactKind::Tile));
        assert_eq!(artifacts.owned_by(black).count(), 1);
    }

    #[test]
    fn test_unknown_artifact() {
        let artifacts = Artifacts::new();

        assert!(!artifacts.contains(ArtifactId(7)));
        assert_eq!(artifacts.kind(ArtifactId(7)), None);
        assert_eq!(artifacts.name(ArtifactId(7)), "?");
    }

    #[test]
    fn test_find_by_name() {
        let mut artifacts = Artifacts::new();
        artifacts.add(ArtifactKind::Direction, "north", None);
        let east = artifacts.add(ArtifactKind::Direction, "east", None);

        assert_eq!(artifacts.find(ArtifactKind::Direction, "east"), Some(east));
        assert_eq!(artifacts.find(ArtifactKind::Tile, "east"), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", ArtifactId(42)), "Artifact(42)");
    }

    #[test]
    fn test_serialization() {
        let id = ArtifactId(123);
        let json = serde_json::to_string(&id).unwrap();
        let deserialized: ArtifactId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, deserialized);
    }
}
