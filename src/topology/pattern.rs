//! Movement patterns and path resolution.
//!
//! A `Pattern` describes a movement shape without reference to any board.
//! Resolving it against a `Topology`, a source tile and a target tile yields
//! the concrete `TilePath` or `None`. "No path" is an ordinary answer: the
//! resolver never errors on geometrically impossible moves.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::ArtifactId;

use super::graph::{TileRelation, Topology};

/// Abstract movement shape.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Pattern {
    /// Follow one direction for one or more hops (rook, bishop, a
    /// backgammon checker running the track).
    Repeat(ArtifactId),

    /// One hop in any of the listed directions (king, a checkers man).
    AnyOf(SmallVec<[ArtifactId; 8]>),

    /// A fixed sequence of directions, one hop each (knight legs).
    Sequence(SmallVec<[ArtifactId; 4]>),

    /// Whatever any of the piece's other patterns allows.
    Wildcard,

    /// Explicitly cannot move.
    None,
}

impl Pattern {
    /// Create a one-hop pattern over several directions.
    pub fn any_of(directions: impl IntoIterator<Item = ArtifactId>) -> Self {
        Self::AnyOf(directions.into_iter().collect())
    }

    /// Create a fixed-sequence pattern.
    pub fn sequence(directions: impl IntoIterator<Item = ArtifactId>) -> Self {
        Self::Sequence(directions.into_iter().collect())
    }

    /// Directions this pattern mentions directly.
    #[must_use]
    pub fn directions(&self) -> &[ArtifactId] {
        match self {
            Self::Repeat(direction) => std::slice::from_ref(direction),
            Self::AnyOf(directions) => directions.as_slice(),
            Self::Sequence(directions) => directions.as_slice(),
            Self::Wildcard | Self::None => &[],
        }
    }

    /// Resolve this pattern into the path from `from` to `to`.
    ///
    /// `siblings` are all patterns of the moving piece; only `Wildcard`
    /// consults them, trying each non-wildcard sibling in order. A path
    /// never ends where it started, even on cyclic boards.
    #[must_use]
    pub fn resolve(
        &self,
        topology: &Topology,
        from: ArtifactId,
        to: ArtifactId,
        siblings: &[Pattern],
    ) -> Option<TilePath> {
        if from == to {
            return None;
        }
        match self {
            Self::Repeat(direction) => resolve_repeat(topology, from, to, *direction),
            Self::AnyOf(directions) => resolve_any_of(topology, from, to, directions),
            Self::Sequence(directions) => resolve_sequence(topology, from, to, directions),
            Self::Wildcard => siblings
                .iter()
                .filter(|p| !matches!(p, Self::Wildcard))
                .find_map(|p| p.resolve(topology, from, to, siblings)),
            Self::None => None,
        }
    }

    /// Every path this pattern can take from `from`, one per reachable
    /// target tile, in discovery order.
    ///
    /// Each returned path is exactly what [`Pattern::resolve`] returns for
    /// its target.
    #[must_use]
    pub fn destinations(
        &self,
        topology: &Topology,
        from: ArtifactId,
        siblings: &[Pattern],
    ) -> Vec<TilePath> {
        let mut targets: Vec<ArtifactId> = Vec::new();
        self.candidate_targets(topology, from, siblings, &mut targets);

        let mut seen = Vec::with_capacity(targets.len());
        targets
            .into_iter()
            .filter(|t| {
                if seen.contains(t) {
                    false
                } else {
                    seen.push(*t);
                    true
                }
            })
            .filter_map(|t| self.resolve(topology, from, t, siblings))
            .collect()
    }

    fn candidate_targets(
        &self,
        topology: &Topology,
        from: ArtifactId,
        siblings: &[Pattern],
        out: &mut Vec<ArtifactId>,
    ) {
        match self {
            Self::Repeat(direction) => {
                let mut current = from;
                let mut visited = vec![from];
                while let Some(relation) = topology.step(current, *direction) {
                    out.push(relation.to);
                    if visited.contains(&relation.to) {
                        break;
                    }
                    visited.push(relation.to);
                    current = relation.to;
                }
            }
            Self::AnyOf(directions) => {
                out.extend(
                    directions
                        .iter()
                        .filter_map(|d| topology.step(from, *d))
                        .map(|r| r.to),
                );
            }
            Self::Sequence(directions) => {
                if let Some(path) = walk(topology, from, directions) {
                    out.push(path.target());
                }
            }
            Self::Wildcard => {
                for sibling in siblings.iter().filter(|p| !matches!(p, Self::Wildcard)) {
                    sibling.candidate_targets(topology, from, siblings, out);
                }
            }
            Self::None => {}
        }
    }
}

impl Topology {
    /// Every path `pattern` can take from `from`. See [`Pattern::destinations`].
    #[must_use]
    pub fn destinations(
        &self,
        pattern: &Pattern,
        from: ArtifactId,
        siblings: &[Pattern],
    ) -> Vec<TilePath> {
        pattern.destinations(self, from, siblings)
    }
}

/// A concrete resolved path.
///
/// Only resolution builds paths, so `tiles` always holds at least the
/// source and is one longer than `relations` and `directions`. A walk whose
/// summed distance would overflow `u32` does not resolve.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct TilePath {
    tiles: Vec<ArtifactId>,
    relations: Vec<TileRelation>,
    directions: Vec<ArtifactId>,
    /// Sum of the relations' labeled distances.
    pub distance: u32,
}

impl TilePath {
    fn start(from: ArtifactId) -> Self {
        Self {
            tiles: vec![from],
            relations: Vec::new(),
            directions: Vec::new(),
            distance: 0,
        }
    }

    fn push(&mut self, relation: &TileRelation) -> Option<()> {
        self.distance = self.distance.checked_add(relation.distance)?;
        self.tiles.push(relation.to);
        self.relations.push(*relation);
        self.directions.push(relation.direction);
        Some(())
    }

    /// First tile.
    #[must_use]
    pub fn source(&self) -> ArtifactId {
        self.tiles[0]
    }

    /// Last tile.
    #[must_use]
    pub fn target(&self) -> ArtifactId {
        self.relations.last().map_or(self.source(), |relation| relation.to)
    }

    /// Every tile visited, both endpoints included.
    #[must_use]
    pub fn tiles(&self) -> &[ArtifactId] {
        &self.tiles
    }

    /// Relations traversed, in order.
    #[must_use]
    pub fn relations(&self) -> &[TileRelation] {
        &self.relations
    }

    /// Direction of each hop.
    #[must_use]
    pub fn directions(&self) -> &[ArtifactId] {
        &self.directions
    }

    /// Tiles strictly between source and target.
    #[must_use]
    pub fn intermediate(&self) -> &[ArtifactId] {
        match self.tiles.len() {
            0..=2 => &[],
            n => &self.tiles[1..n - 1],
        }
    }

    /// Number of relations traversed.
    #[must_use]
    pub fn hops(&self) -> usize {
        self.relations.len()
    }
}

fn resolve_repeat(
    topology: &Topology,
    from: ArtifactId,
    to: ArtifactId,
    direction: ArtifactId,
) -> Option<TilePath> {
    let mut path = TilePath::start(from);
    let mut current = from;
    loop {
        let relation = topology.step(current, direction)?;
        path.push(relation)?;
        if relation.to == to {
            return Some(path);
        }
        // Back where we started or looping: target unreachable this way.
        if path.tiles[..path.tiles.len() - 1].contains(&relation.to) {
            return None;
        }
        current = relation.to;
    }
}

fn resolve_any_of(
    topology: &Topology,
    from: ArtifactId,
    to: ArtifactId,
    directions: &[ArtifactId],
) -> Option<TilePath> {
    let mut hits = directions
        .iter()
        .filter_map(|d| topology.step(from, *d))
        .filter(|r| r.to == to);

    let relation = hits.next()?;
    if hits.next().is_some() {
        return None;
    }

    let mut path = TilePath::start(from);
    path.push(relation)?;
    Some(path)
}

fn resolve_sequence(
    topology: &Topology,
    from: ArtifactId,
    to: ArtifactId,
    directions: &[ArtifactId],
) -> Option<TilePath> {
    walk(topology, from, directions).filter(|path| path.target() == to)
}

fn walk(topology: &Topology, from: ArtifactId, directions: &[ArtifactId]) -> Option<TilePath> {
    if directions.is_empty() {
        return None;
    }
    let mut path = TilePath::start(from);
    let mut current = from;
    for direction in directions {
        let relation = topology.step(current, *direction)?;
        path.push(relation)?;
        current = relation.to;
    }
    Some(path)
}
