//! Persistent game state.
//!
//! ## ArtifactState
//!
//! The current value of one artifact: a piece's tile, a die's face, a
//! player's turn marker. At most one state per artifact per `StateKind`.
//!
//! ## GameState
//!
//! An immutable snapshot: all artifact states, one module-defined `Extras`
//! value, and the RNG state. Transitions layer `Delta`s over the previous
//! snapshot with `advance`; the previous snapshot stays valid, so search
//! code can branch from any ancestor without copying.
//!
//! ```
//! use rust_tabletop::core::ArtifactId;
//! use rust_tabletop::state::{ArtifactState, GameState};
//!
//! let pawn = ArtifactId(10);
//! let start = GameState::from_states([ArtifactState::on_tile(pawn, ArtifactId(1))]);
//! let moved = start.advance([ArtifactState::on_tile(pawn, ArtifactId(2))]);
//!
//! assert_eq!(start.tile_of(pawn), Some(ArtifactId(1)));
//! assert_eq!(moved.tile_of(pawn), Some(ArtifactId(2)));
//! ```

mod extras;
mod game_state;
mod value;

pub use extras::Extras;
pub use game_state::GameState;
pub use value::{ArtifactState, Delta, StateKey, StateKind, StateValue};
