//! Board topology and movement.
//!
//! - [`Topology`]: directed, labeled relations between tiles
//! - [`Pattern`]: board-independent movement shapes
//! - [`TilePath`]: a pattern resolved on a concrete board
//!
//! ## Example
//!
//! ```
//! use rust_tabletop::core::ArtifactId;
//! use rust_tabletop::topology::{Pattern, Topology};
//!
//! let clockwise = ArtifactId(100);
//! let mut ring = Topology::new();
//! for i in 0..8 {
//!     ring.add_relation(ArtifactId(i), ArtifactId((i + 1) % 8), clockwise, 1);
//! }
//!
//! let path = Pattern::Repeat(clockwise)
//!     .resolve(&ring, ArtifactId(6), ArtifactId(1), &[])
//!     .unwrap();
//! assert_eq!(path.distance, 3);
//! ```

mod graph;
mod pattern;

pub use graph::{TileRelation, Topology};
pub use pattern::{Pattern, TilePath};
