//! Tile relations and the board graph.
//!
//! A board is nothing but tiles joined by directed relations, each labeled
//! with a direction and a distance. A chessboard, a backgammon track and a
//! Go grid differ only in which relations exist.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::ArtifactId;
use crate::hash::{Canonical, CanonicalEncoder};

/// Directed edge `from -> to` labeled with a direction and distance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileRelation {
    pub from: ArtifactId,
    pub to: ArtifactId,
    pub direction: ArtifactId,
    pub distance: u32,
}

impl TileRelation {
    /// Create a relation.
    #[must_use]
    pub const fn new(
        from: ArtifactId,
        to: ArtifactId,
        direction: ArtifactId,
        distance: u32,
    ) -> Self {
        Self {
            from,
            to,
            direction,
            distance,
        }
    }
}

impl Canonical for TileRelation {
    fn encode(&self, enc: &mut CanonicalEncoder<'_>) {
        enc.structure("TileRelation")
            .field("from", &self.from)
            .field("to", &self.to)
            .field("direction", &self.direction)
            .field("distance", &self.distance)
            .finish();
    }
}

/// Board graph: every relation, indexed by source tile.
///
/// Relations keep their declaration order; when a tile has two relations in
/// the same direction the first one declared wins.
#[derive(Clone, Debug, Default)]
pub struct Topology {
    relations: Vec<TileRelation>,
    /// Indices into `relations` by source tile, in declaration order.
    outgoing: FxHashMap<ArtifactId, SmallVec<[u32; 8]>>,
}

impl Topology {
    /// Create an empty topology.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a relation.
    pub fn add(&mut self, relation: TileRelation) {
        let index = self.relations.len() as u32;
        self.relations.push(relation);
        self.outgoing.entry(relation.from).or_default().push(index);
    }

    /// Add a relation from its parts.
    pub fn add_relation(
        &mut self,
        from: ArtifactId,
        to: ArtifactId,
        direction: ArtifactId,
        distance: u32,
    ) {
        self.add(TileRelation::new(from, to, direction, distance));
    }

    /// Add a relation and its reverse under another direction.
    pub fn add_pair(
        &mut self,
        a: ArtifactId,
        b: ArtifactId,
        forward: ArtifactId,
        backward: ArtifactId,
        distance: u32,
    ) {
        self.add(TileRelation::new(a, b, forward, distance));
        self.add(TileRelation::new(b, a, backward, distance));
    }

    /// Relations leaving `tile`, in declaration order.
    pub fn relations_from(&self, tile: ArtifactId) -> impl Iterator<Item = &TileRelation> {
        self.outgoing
            .get(&tile)
            .into_iter()
            .flatten()
            .map(|&i| &self.relations[i as usize])
    }

    /// The relation leaving `tile` in `direction`, if any.
    #[must_use]
    pub fn step(&self, tile: ArtifactId, direction: ArtifactId) -> Option<&TileRelation> {
        self.relations_from(tile).find(|r| r.direction == direction)
    }

    /// Tiles reachable from `tile` in one hop.
    pub fn neighbors(&self, tile: ArtifactId) -> impl Iterator<Item = ArtifactId> + '_ {
        self.relations_from(tile).map(|r| r.to)
    }

    /// Every relation in declaration order.
    #[must_use]
    pub fn relations(&self) -> &[TileRelation] {
        &self.relations
    }

    /// Number of relations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.relations.len()
    }

    /// Check if the topology has no relations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.relations.is_empty()
    }
}
