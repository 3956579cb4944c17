//! Module-defined aggregate state.
//!
//! Some games need state that doesn't belong to a single artifact: the ko
//! point in Go, the bank's house supply in an economic game. A game module
//! keeps that in one `Extras` value per `GameState`. The slot is replaced
//! whole; the engine never merges two extras values.

use std::any::Any;
use std::fmt::Debug;

use crate::hash::{Canonical, CanonicalEncoder};

/// Aggregate state stored in `GameState::extras`.
///
/// Implemented automatically for any `'static` type that is
/// `Debug + PartialEq + Canonical + Send + Sync`.
pub trait Extras: Any + Debug + Send + Sync {
    fn as_any(&self) -> &dyn Any;

    /// Value equality across the type-erased boundary. Different concrete
    /// types are never equal.
    fn eq_extras(&self, other: &dyn Extras) -> bool;

    /// Write the canonical encoding used in state fingerprints.
    fn encode_extras(&self, enc: &mut CanonicalEncoder<'_>);
}

impl<T> Extras for T
where
    T: Any + Debug + PartialEq + Canonical + Send + Sync,
{
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn eq_extras(&self, other: &dyn Extras) -> bool {
        other
            .as_any()
            .downcast_ref::<T>()
            .is_some_and(|other| other == self)
    }

    fn encode_extras(&self, enc: &mut CanonicalEncoder<'_>) {
        self.encode(enc);
    }
}

impl Canonical for dyn Extras {
    fn encode(&self, enc: &mut CanonicalEncoder<'_>) {
        self.encode_extras(enc);
    }
}
