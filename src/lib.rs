//! # rust-tabletop
//!
//! A board-topology-agnostic rules engine for tabletop games.
//!
//! ## Design Principles
//!
//! 1. **Topology-Agnostic**: No hardcoded grids, tracks or directions.
//!    Boards are tiles joined by labeled, directed relations; pieces move
//!    by abstract patterns resolved against whatever board a game declares.
//!
//! 2. **Immutable Snapshots**: Every transition returns a new `GameState`.
//!    Snapshots share unchanged artifact states, so search code can hold
//!    thousands of branches cheaply.
//!
//! 3. **Configuration Over Convention**: Games declare artifacts, phases,
//!    rules, conditions and mutators through `EngineBuilder`. The core never
//!    depends on a concrete game.
//!
//! ## Architecture
//!
//! - **Decision Plan**: the phase/rule tree is flattened once at build time
//!   into an ordered list of gated entries. Each event is a first-match-wins
//!   scan: the first rule to answer `Valid` or `Invalid` decides.
//!
//! - **Tri-state Conditions**: `Valid`, `Invalid` (with a structured
//!   `RejectionReason`) or `Ignore` ("not my concern"). Composites are a flat
//!   AND/OR/NOT AST compiled to an evaluation list.
//!
//! - **Canonical Hashing**: a deterministic byte encoding of state feeds
//!   SHA-256, so logically equal states hash equal regardless of build order.
//!
//! ## Modules
//!
//! - `core`: Artifact IDs, events, configuration, RNG
//! - `topology`: Tile relations, movement patterns, path resolution
//! - `state`: Persistent game state and state deltas
//! - `condition`: Condition traits, responses and the composite AST
//! - `mutator`: State transitions
//! - `rules`: Rules and phases
//! - `plan`: The compiled decision plan
//! - `engine`: Engine, game definition and builder
//! - `legal`: Legal move generation and validation
//! - `hash`: Canonical encoding and state fingerprints
//! - `games`: Reference games

pub mod condition;
pub mod core;
pub mod engine;
pub mod error;
pub mod games;
pub mod hash;
pub mod legal;
pub mod mutator;
pub mod plan;
pub mod rules;
pub mod state;
pub mod topology;

// Re-export commonly used types
pub use crate::core::{
    Artifact, ArtifactId, ArtifactKind, Artifacts, EngineConfig, Event, EventKind, GameRng,
    GameRngState, PhaseId,
};

pub use crate::topology::{Pattern, TilePath, TileRelation, Topology};

pub use crate::state::{ArtifactState, Delta, Extras, GameState, StateKey, StateKind, StateValue};

pub use crate::condition::{
    Condition, ConditionExpr, ConditionResponse, GateExpr, RejectionReason, StateCondition, Verdict,
};

pub use crate::mutator::{Mutator, MutatorChain};

pub use crate::rules::{EventPreprocessor, MoveGenerator, Phase, Rule};

pub use crate::plan::{Decision, DecisionPlan, PlanStatsSnapshot};

pub use crate::engine::{Engine, EngineBuilder, GameDefinition};

pub use crate::legal::MoveValidation;

pub use crate::hash::{Canonical, StateHash};

pub use crate::error::{BuildError, EngineError};
