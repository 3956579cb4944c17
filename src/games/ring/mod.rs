//! "Ring race" game for testing the engine.
//!
//! A minimal dice race that exercises every extension point:
//! - Tiles form a ring joined by a `clockwise` relation of distance 1
//! - Opposite tiles 0 and N/2 are joined by an `across` shortcut whose
//!   labeled distance is shorter than the way round
//! - On your turn: roll one six-sided die, then move one of your runners
//!   exactly that distance, or pass if no runner can
//! - Landing on an opponent's runner sends it home and wipes its progress
//! - The first runner to travel the goal distance wins
//!
//! Supports any number of players to verify N-player generality.

mod game;
mod rules;

pub use game::{Ring, RingGame, RingLayout};
pub use rules::{FinishOrPass, NoMoveAvailable, RecordProgress, RingMoves, SendHome};
