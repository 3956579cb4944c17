//! Static description of a game: what exists and how it is connected.

use rustc_hash::FxHashMap;

use crate::core::{ArtifactId, Artifacts};
use crate::topology::{Pattern, TilePath, Topology};

/// Everything fixed at build time apart from the rules.
#[derive(Clone, Debug, Default)]
pub struct GameDefinition {
    pub(crate) artifacts: Artifacts,
    pub(crate) topology: Topology,
    pub(crate) patterns: FxHashMap<ArtifactId, Vec<Pattern>>,
    pub(crate) seating: Vec<ArtifactId>,
}

impl GameDefinition {
    #[must_use]
    pub fn artifacts(&self) -> &Artifacts {
        &self.artifacts
    }

    #[must_use]
    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    /// Movement patterns of `piece`, in declaration order.
    #[must_use]
    pub fn patterns_of(&self, piece: ArtifactId) -> &[Pattern] {
        self.patterns.get(&piece).map(Vec::as_slice).unwrap_or_default()
    }

    /// Player turn order.
    #[must_use]
    pub fn seating(&self) -> &[ArtifactId] {
        &self.seating
    }

    /// Path of the first pattern of `piece` that resolves from `from` to
    /// `to`.
    #[must_use]
    pub fn path_for(
        &self,
        piece: ArtifactId,
        from: ArtifactId,
        to: ArtifactId,
    ) -> Option<TilePath> {
        let patterns = self.patterns_of(piece);
        patterns
            .iter()
            .find_map(|pattern| pattern.resolve(&self.topology, from, to, patterns))
    }

    /// Paths of every pattern of `piece` that resolves from `from` to `to`,
    /// in declaration order, without duplicates.
    ///
    /// A move can be legal by one pattern and not another (a die showing
    /// the long way round when a shortcut also reaches the tile).
    #[must_use]
    pub fn paths_for(&self, piece: ArtifactId, from: ArtifactId, to: ArtifactId) -> Vec<TilePath> {
        let patterns = self.patterns_of(piece);
        let mut paths: Vec<TilePath> = Vec::new();
        for path in patterns
            .iter()
            .filter_map(|pattern| pattern.resolve(&self.topology, from, to, patterns))
        {
            if !paths.contains(&path) {
                paths.push(path);
            }
        }
        paths
    }

    /// Every tile `piece` could reach from `from` by any of its patterns,
    /// with the path `path_for` would pick.
    #[must_use]
    pub fn destinations(&self, piece: ArtifactId, from: ArtifactId) -> Vec<TilePath> {
        Pattern::Wildcard.destinations(&self.topology, from, self.patterns_of(piece))
    }

    /// The player seated after `player`, wrapping around.
    #[must_use]
    pub fn next_player(&self, player: ArtifactId) -> Option<ArtifactId> {
        let seat = self.seating.iter().position(|&p| p == player)?;
        self.seating.get((seat + 1) % self.seating.len()).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ArtifactKind;

    fn line() -> (GameDefinition, ArtifactId, [ArtifactId; 3]) {
        let mut def = GameDefinition::default();
        let tiles = [
            def.artifacts.add(ArtifactKind::Tile, "t0", None),
            def.artifacts.add(ArtifactKind::Tile, "t1", None),
            def.artifacts.add(ArtifactKind::Tile, "t2", None),
        ];
        let east = def.artifacts.add(ArtifactKind::Direction, "east", None);
        let piece = def.artifacts.add(ArtifactKind::Piece, "rook", None);
        def.topology.add_relation(tiles[0], tiles[1], east, 1);
        def.topology.add_relation(tiles[1], tiles[2], east, 1);
        def.patterns.insert(piece, vec![Pattern::Repeat(east)]);
        (def, piece, tiles)
    }

    #[test]
    fn test_path_for() {
        let (def, piece, tiles) = line();
        let path = def.path_for(piece, tiles[0], tiles[2]).unwrap();
        assert_eq!(path.distance, 2);
        assert!(def.path_for(piece, tiles[2], tiles[0]).is_none());
    }

    #[test]
    fn test_paths_for_lists_each_pattern() {
        let (mut def, piece, tiles) = line();
        let jump = def.artifacts.add(ArtifactKind::Direction, "jump", None);
        def.topology.add_relation(tiles[0], tiles[2], jump, 5);
        let east = def.artifacts.find(ArtifactKind::Direction, "east").unwrap();
        let patterns = vec![Pattern::any_of([jump]), Pattern::Repeat(east), Pattern::Wildcard];
        def.patterns.insert(piece, patterns);

        let distances: Vec<u32> = def
            .paths_for(piece, tiles[0], tiles[2])
            .iter()
            .map(|path| path.distance)
            .collect();
        assert_eq!(distances, vec![5, 2]);
        assert_eq!(def.path_for(piece, tiles[0], tiles[2]).unwrap().distance, 5);
        assert!(def.paths_for(piece, tiles[2], tiles[0]).is_empty());
    }

    #[test]
    fn test_piece_without_patterns_cannot_move() {
        let (def, _, tiles) = line();
        assert!(def.path_for(ArtifactId(99), tiles[0], tiles[1]).is_none());
        assert!(def.destinations(ArtifactId(99), tiles[0]).is_empty());
    }

    #[test]
    fn test_destinations() {
        let (def, piece, tiles) = line();
        let targets: Vec<_> = def
            .destinations(piece, tiles[0])
            .iter()
            .map(TilePath::target)
            .collect();
        assert_eq!(targets, vec![tiles[1], tiles[2]]);
    }

    #[test]
    fn test_next_player_wraps() {
        let mut def = GameDefinition::default();
        def.seating = vec![ArtifactId(1), ArtifactId(2), ArtifactId(3)];
        assert_eq!(def.next_player(ArtifactId(1)), Some(ArtifactId(2)));
        assert_eq!(def.next_player(ArtifactId(3)), Some(ArtifactId(1)));
        assert_eq!(def.next_player(ArtifactId(9)), None);
    }
}
