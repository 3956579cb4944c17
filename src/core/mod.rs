//! Core engine types: artifacts, events, configuration, RNG.
//!
//! This module contains the fundamental building blocks that are game-agnostic.
//! Games configure these through `EngineBuilder` rather than modifying the core.

pub mod artifact;
pub mod config;
pub mod event;
pub mod rng;

pub use artifact::{Artifact, ArtifactId, ArtifactKind, Artifacts};
pub use config::{EngineConfig, PhaseId};
pub use event::{Event, EventKind};
pub use rng::{GameRng, GameRngState};
