//! Rules and phases: the declarative tree a game is configured with.
//!
//! Games describe their rules as a tree of `Phase`s holding `Rule`s and
//! sub-phases. The engine never walks this tree per event; `EngineBuilder`
//! compiles it once into a `DecisionPlan`.
//!
//! ## Hooks
//!
//! - `EventPreprocessor`: rewrites raw events into concrete candidate forms
//! - `MoveGenerator`: proposes candidate events for legal-move generation

mod phase;
mod rule;

pub use phase::{EventPreprocessor, MoveGenerator, Phase, PhaseNode};
pub use rule::Rule;
