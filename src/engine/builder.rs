//! Builder-time configuration surface.
//!
//! Declares tiles, directions, relations, players, pieces, dice and phases,
//! then validates everything and compiles the decision plan in one go.
//!
//! ## Example
//!
//! ```
//! use rust_tabletop::condition::builtin::{FollowsPattern, IsActivePlayer};
//! use rust_tabletop::condition::ConditionExpr;
//! use rust_tabletop::core::{EventKind, PhaseId};
//! use rust_tabletop::engine::EngineBuilder;
//! use rust_tabletop::mutator::builtin::MovePiece;
//! use rust_tabletop::rules::{Phase, Rule};
//! use rust_tabletop::topology::Pattern;
//!
//! let mut builder = EngineBuilder::new();
//! let a = builder.add_tile("a");
//! let b = builder.add_tile("b");
//! let east = builder.add_direction("east");
//! builder.relate(a, b, east, 1);
//!
//! let white = builder.add_player("white");
//! let rook = builder.add_piece("rook", white, Some(a));
//! builder.add_pattern(rook, Pattern::Repeat(east));
//!
//! builder.add_phase(
//!     Phase::new(PhaseId(0), "play").with_rule(
//!         Rule::new(
//!             "move",
//!             ConditionExpr::condition(IsActivePlayer)
//!                 .and(ConditionExpr::condition(FollowsPattern)),
//!             MovePiece,
//!         )
//!         .with_event_kind(EventKind::MOVE),
//!     ),
//! );
//!
//! let (engine, state) = builder.build().unwrap();
//! assert_eq!(state.tile_of(rook), Some(a));
//! assert_eq!(state.active_player(), Some(white));
//! assert_eq!(engine.plan().len(), 1);
//! ```

use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

use crate::core::{ArtifactId, ArtifactKind, Artifacts, EngineConfig};
use crate::error::BuildError;
use crate::plan::DecisionPlan;
use crate::rules::Phase;
use crate::state::{ArtifactState, Extras, GameState, StateKind, StateValue};
use crate::topology::{Pattern, TileRelation, Topology};

use super::definition::GameDefinition;
use super::Engine;

/// Collects a game's configuration and builds an `Engine` plus its
/// initial `GameState`.
#[derive(Default)]
pub struct EngineBuilder {
    artifacts: Artifacts,
    topology: Topology,
    patterns: FxHashMap<ArtifactId, Vec<Pattern>>,
    seating: Vec<ArtifactId>,
    phases: Vec<Phase>,
    initial: Vec<ArtifactState>,
    extras: Option<Arc<dyn Extras>>,
    seed: Option<u64>,
    config: EngineConfig,
}

impl EngineBuilder {
    /// Create an empty builder with the default config.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the engine config (builder pattern).
    #[must_use]
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Seed the game's RNG (builder pattern). Games without a seed carry
    /// no RNG state.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the initial extras value (builder pattern).
    #[must_use]
    pub fn with_extras(mut self, extras: impl Extras) -> Self {
        self.extras = Some(Arc::new(extras));
        self
    }

    // === Artifacts ===

    /// Declare an artifact of any kind.
    pub fn add_artifact(
        &mut self,
        kind: ArtifactKind,
        name: impl Into<String>,
        owner: Option<ArtifactId>,
    ) -> ArtifactId {
        self.artifacts.add(kind, name, owner)
    }

    pub fn add_tile(&mut self, name: impl Into<String>) -> ArtifactId {
        self.add_artifact(ArtifactKind::Tile, name, None)
    }

    pub fn add_direction(&mut self, name: impl Into<String>) -> ArtifactId {
        self.add_artifact(ArtifactKind::Direction, name, None)
    }

    pub fn add_dice(&mut self, name: impl Into<String>) -> ArtifactId {
        self.add_artifact(ArtifactKind::Dice, name, None)
    }

    /// Declare a player and seat them after those already declared.
    pub fn add_player(&mut self, name: impl Into<String>) -> ArtifactId {
        let player = self.add_artifact(ArtifactKind::Player, name, None);
        self.seating.push(player);
        player
    }

    /// Declare a piece, optionally placed on a starting tile.
    pub fn add_piece(
        &mut self,
        name: impl Into<String>,
        owner: ArtifactId,
        tile: Option<ArtifactId>,
    ) -> ArtifactId {
        let piece = self.add_artifact(ArtifactKind::Piece, name, Some(owner));
        if let Some(tile) = tile {
            self.initial.push(ArtifactState::on_tile(piece, tile));
        }
        piece
    }

    /// Borrow the artifacts declared so far.
    #[must_use]
    pub fn artifacts(&self) -> &Artifacts {
        &self.artifacts
    }

    // === Topology ===

    /// Declare a relation.
    pub fn relate(
        &mut self,
        from: ArtifactId,
        to: ArtifactId,
        direction: ArtifactId,
        distance: u32,
    ) {
        self.topology.add_relation(from, to, direction, distance);
    }

    /// Declare a relation and its reverse.
    pub fn relate_pair(
        &mut self,
        a: ArtifactId,
        b: ArtifactId,
        forward: ArtifactId,
        backward: ArtifactId,
        distance: u32,
    ) {
        self.topology.add_pair(a, b, forward, backward, distance);
    }

    /// Append a movement pattern to a piece.
    pub fn add_pattern(&mut self, piece: ArtifactId, pattern: Pattern) {
        self.patterns.entry(piece).or_default().push(pattern);
    }

    // === Rules and state ===

    /// Replace the seating order.
    pub fn set_seating(&mut self, seating: Vec<ArtifactId>) {
        self.seating = seating;
    }

    /// Append a top-level phase.
    pub fn add_phase(&mut self, phase: Phase) {
        self.phases.push(phase);
    }

    /// Add an initial artifact state.
    pub fn set_initial(&mut self, state: ArtifactState) {
        self.initial.push(state);
    }

    fn expect_kind(&self, artifact: ArtifactId, expected: ArtifactKind) -> Result<(), BuildError> {
        match self.artifacts.kind(artifact) {
            None => Err(BuildError::UnknownArtifact(artifact)),
            Some(actual) if actual != expected => Err(BuildError::WrongKind {
                artifact,
                expected,
                actual,
            }),
            Some(_) => Ok(()),
        }
    }

    fn validate_relation(&self, relation: &TileRelation) -> Result<(), BuildError> {
        self.expect_kind(relation.from, ArtifactKind::Tile)?;
        self.expect_kind(relation.to, ArtifactKind::Tile)?;
        self.expect_kind(relation.direction, ArtifactKind::Direction)?;
        if self.config.validate_topology {
            if relation.from == relation.to {
                return Err(BuildError::SelfLoop(relation.from));
            }
            if relation.distance == 0 {
                return Err(BuildError::ZeroDistance {
                    from: relation.from,
                    to: relation.to,
                });
            }
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), BuildError> {
        let mut names = FxHashSet::default();
        for artifact in self.artifacts.iter() {
            if !names.insert((artifact.kind, artifact.name.as_str())) {
                return Err(BuildError::DuplicateName {
                    kind: artifact.kind,
                    name: artifact.name.clone(),
                });
            }
            if let Some(owner) = artifact.owner {
                if !self.artifacts.contains(owner) {
                    return Err(BuildError::UnknownArtifact(owner));
                }
            }
        }

        for relation in self.topology.relations() {
            self.validate_relation(relation)?;
        }

        for (&piece, patterns) in &self.patterns {
            self.expect_kind(piece, ArtifactKind::Piece)?;
            for direction in patterns.iter().flat_map(Pattern::directions) {
                self.expect_kind(*direction, ArtifactKind::Direction)?;
            }
        }

        for &player in &self.seating {
            self.expect_kind(player, ArtifactKind::Player)?;
        }

        for state in &self.initial {
            if !self.artifacts.contains(state.artifact) {
                return Err(BuildError::UnknownArtifact(state.artifact));
            }
            if let StateValue::OnTile { tile } = state.value {
                self.expect_kind(tile, ArtifactKind::Tile)?;
            }
        }
        Ok(())
    }

    /// Validate the configuration, compile the decision plan and assemble
    /// the initial state.
    ///
    /// If players are seated and no initial state marks anyone active, the
    /// first seat starts.
    pub fn build(self) -> Result<(Engine, GameState), BuildError> {
        self.validate()?;
        let plan = DecisionPlan::compile(&self.phases)?;

        let mut initial = GameState::from_states(self.initial);
        if initial.active_player().is_none() {
            if let Some(&first) = self.seating.first() {
                initial = initial.with_state(ArtifactState::active(first));
            }
        }
        if let Some(extras) = self.extras {
            initial = initial.with_shared_extras(extras);
        }
        if let Some(seed) = self.seed {
            initial = initial.with_seed(seed);
        }

        debug!(
            artifacts = self.artifacts.len(),
            relations = self.topology.len(),
            entries = plan.len(),
            on_tile = initial.states_of_kind(StateKind::OnTile).count(),
            "built engine"
        );

        let engine = Engine {
            definition: GameDefinition {
                artifacts: self.artifacts,
                topology: self.topology,
                patterns: self.patterns,
                seating: self.seating,
            },
            plan,
            config: self.config,
        };
        Ok((engine, initial))
    }
}
