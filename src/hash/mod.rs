//! Canonical serialization and state fingerprints.
//!
//! A fingerprint depends only on a value's logical content: not on memory
//! addresses, not on the order fields are declared in source, and not on
//! hash-map iteration order. It is used to deduplicate states and to verify
//! that a replay reproduced the same snapshots.
//!
//! Types opt in by implementing [`Canonical`]. The bytes stream straight
//! into a SHA-256 hasher; the object graph is never buffered whole.
//!
//! ## Example
//!
//! ```
//! use rust_tabletop::hash::fingerprint;
//!
//! let a = fingerprint(&vec![1i64, 2, 3]);
//! let b = fingerprint(&vec![1i64, 2, 3]);
//! assert_eq!(a, b);
//! assert_eq!(a.to_hex().len(), 64);
//! ```

mod encoder;
mod impls;

pub use encoder::{tag, ByteSink, CanonicalEncoder, Field, FieldsEncoder};

use sha2::{Digest, Sha256};

/// A value with a canonical byte encoding.
pub trait Canonical {
    fn encode(&self, enc: &mut CanonicalEncoder<'_>);
}

/// SHA-256 digest of a canonical encoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StateHash([u8; 32]);

impl StateHash {
    /// Raw digest bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Full hex string.
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Short hex prefix for logging (first 8 chars).
    #[must_use]
    pub fn short_hex(&self) -> String {
        hex::encode(&self.0[..4])
    }
}

impl std::fmt::Display for StateHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.short_hex())
    }
}

/// Hash a value's canonical encoding.
pub fn fingerprint<T: Canonical + ?Sized>(value: &T) -> StateHash {
    let mut hasher = Sha256::new();
    {
        let mut enc = CanonicalEncoder::new(&mut hasher);
        value.encode(&mut enc);
    }
    StateHash(hasher.finalize().into())
}

/// Canonical encoding as bytes (diagnostics and tests).
pub fn canonical_bytes<T: Canonical + ?Sized>(value: &T) -> Vec<u8> {
    let mut bytes = Vec::new();
    {
        let mut enc = CanonicalEncoder::new(&mut bytes);
        value.encode(&mut enc);
    }
    bytes
}
