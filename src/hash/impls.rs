//! `Canonical` for primitives, std/im collections and core identifiers.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::hash::BuildHasher;
use std::sync::Arc;

use crate::core::{ArtifactId, EventKind, GameRngState, PhaseId};

use super::{Canonical, CanonicalEncoder};

impl Canonical for () {
    fn encode(&self, enc: &mut CanonicalEncoder<'_>) {
        enc.unit();
    }
}

impl Canonical for bool {
    fn encode(&self, enc: &mut CanonicalEncoder<'_>) {
        enc.bool(*self);
    }
}

macro_rules! signed {
    ($($t:ty),*) => {$(
        impl Canonical for $t {
            fn encode(&self, enc: &mut CanonicalEncoder<'_>) {
                enc.int(i64::from(*self));
            }
        }
    )*};
}

macro_rules! unsigned {
    ($($t:ty),*) => {$(
        impl Canonical for $t {
            fn encode(&self, enc: &mut CanonicalEncoder<'_>) {
                enc.uint(u64::from(*self));
            }
        }
    )*};
}

signed!(i8, i16, i32, i64);
unsigned!(u8, u16, u32, u64);

impl Canonical for usize {
    fn encode(&self, enc: &mut CanonicalEncoder<'_>) {
        enc.uint(*self as u64);
    }
}

impl Canonical for u128 {
    fn encode(&self, enc: &mut CanonicalEncoder<'_>) {
        enc.wide(*self);
    }
}

impl Canonical for str {
    fn encode(&self, enc: &mut CanonicalEncoder<'_>) {
        enc.str(self);
    }
}

impl Canonical for String {
    fn encode(&self, enc: &mut CanonicalEncoder<'_>) {
        enc.str(self);
    }
}

impl<T: Canonical + ?Sized> Canonical for &T {
    fn encode(&self, enc: &mut CanonicalEncoder<'_>) {
        (**self).encode(enc);
    }
}

impl<T: Canonical + ?Sized> Canonical for Box<T> {
    fn encode(&self, enc: &mut CanonicalEncoder<'_>) {
        (**self).encode(enc);
    }
}

impl<T: Canonical + ?Sized> Canonical for Arc<T> {
    fn encode(&self, enc: &mut CanonicalEncoder<'_>) {
        enc.shared(self);
    }
}

impl<T: Canonical> Canonical for Option<T> {
    fn encode(&self, enc: &mut CanonicalEncoder<'_>) {
        enc.option(self.as_ref());
    }
}

impl<A: Canonical, B: Canonical> Canonical for (A, B) {
    fn encode(&self, enc: &mut CanonicalEncoder<'_>) {
        enc.seq([&self.0 as &dyn Canonical, &self.1 as &dyn Canonical]);
    }
}

impl<T: Canonical> Canonical for [T] {
    fn encode(&self, enc: &mut CanonicalEncoder<'_>) {
        enc.seq(self.iter());
    }
}

impl<T: Canonical> Canonical for Vec<T> {
    fn encode(&self, enc: &mut CanonicalEncoder<'_>) {
        enc.seq(self.iter());
    }
}

impl<A: smallvec::Array> Canonical for smallvec::SmallVec<A>
where
    A::Item: Canonical,
{
    fn encode(&self, enc: &mut CanonicalEncoder<'_>) {
        enc.seq(self.iter());
    }
}

impl<T: Canonical + Clone> Canonical for im::Vector<T> {
    fn encode(&self, enc: &mut CanonicalEncoder<'_>) {
        enc.seq(self.iter());
    }
}

impl<T: Canonical> Canonical for BTreeSet<T> {
    fn encode(&self, enc: &mut CanonicalEncoder<'_>) {
        enc.set(self.iter());
    }
}

impl<T: Canonical, S: BuildHasher> Canonical for HashSet<T, S> {
    fn encode(&self, enc: &mut CanonicalEncoder<'_>) {
        enc.set(self.iter());
    }
}

impl<K: Canonical, V: Canonical> Canonical for BTreeMap<K, V> {
    fn encode(&self, enc: &mut CanonicalEncoder<'_>) {
        enc.ordered_map(self.iter());
    }
}

impl<K: Canonical + Ord + Clone, V: Canonical + Clone> Canonical for im::OrdMap<K, V> {
    fn encode(&self, enc: &mut CanonicalEncoder<'_>) {
        enc.ordered_map(self.iter());
    }
}

impl<K: Canonical, V: Canonical, S: BuildHasher> Canonical for HashMap<K, V, S> {
    fn encode(&self, enc: &mut CanonicalEncoder<'_>) {
        enc.unordered_map(self.iter());
    }
}

impl Canonical for ArtifactId {
    fn encode(&self, enc: &mut CanonicalEncoder<'_>) {
        enc.artifact(*self);
    }
}

impl Canonical for PhaseId {
    fn encode(&self, enc: &mut CanonicalEncoder<'_>) {
        enc.structure("PhaseId").field("id", &self.0).finish();
    }
}

impl Canonical for EventKind {
    fn encode(&self, enc: &mut CanonicalEncoder<'_>) {
        enc.structure("EventKind").field("id", &self.0).finish();
    }
}

impl Canonical for GameRngState {
    fn encode(&self, enc: &mut CanonicalEncoder<'_>) {
        enc.structure("GameRngState")
            .field("seed", &self.seed)
            .field("word_pos", &self.word_pos)
            .finish();
    }
}

#[cfg(test)]
mod tests {
    use rustc_hash::FxHashMap;

    use crate::hash::{canonical_bytes, fingerprint};

    use super::*;

    #[test]
    fn test_hash_map_build_order_irrelevant() {
        let mut a: FxHashMap<String, i64> = FxHashMap::default();
        let mut b: FxHashMap<String, i64> = FxHashMap::default();
        for i in 0..50 {
            a.insert(format!("k{i}"), i);
        }
        for i in (0..50).rev() {
            b.insert(format!("k{i}"), i);
        }

        assert_eq!(fingerprint(&a), fingerprint(&b));
    }

    #[test]
    fn test_ord_map_and_btree_map_agree() {
        let ord: im::OrdMap<u32, i64> = [(1u32, 10i64), (2u32, 20i64)].into_iter().collect();
        let btree: BTreeMap<u32, i64> = [(2, 20), (1, 10)].into_iter().collect();

        assert_eq!(canonical_bytes(&ord), canonical_bytes(&btree));
    }

    #[test]
    fn test_none_and_empty_differ() {
        let none: Option<Vec<i64>> = None;
        let empty: Option<Vec<i64>> = Some(Vec::new());
        assert_ne!(canonical_bytes(&none), canonical_bytes(&empty));
    }

    #[test]
    fn test_string_and_str_agree() {
        assert_eq!(
            canonical_bytes(&String::from("knight")),
            canonical_bytes("knight")
        );
    }

    #[test]
    fn test_rng_state_changes_hash() {
        let a = GameRngState::seeded(1);
        let b = GameRngState::seeded(2);
        assert_ne!(fingerprint(&a), fingerprint(&b));
    }
}
