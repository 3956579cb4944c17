//! Canonical byte encoder.
//!
//! ## Encoding
//!
//! Every value starts with a one-byte tag naming its primitive kind:
//!
//! | Tag | Layout after the tag |
//! |---|---|
//! | `UNIT` | nothing |
//! | `BOOL` | 1 byte, 0 or 1 |
//! | `INT` | i64 little-endian |
//! | `UINT` | u64 little-endian |
//! | `WIDE` | u128 little-endian |
//! | `STR` | u64 byte length, UTF-8 bytes |
//! | `ARTIFACT` | u32 artifact id |
//! | `NONE` / `SOME` | nothing / the inner value |
//! | `STRUCT` | type name, u64 field count, then each field's name and value |
//! | `VARIANT` | type name, variant name, then the fields as in `STRUCT` |
//! | `SEQ` | u64 count, elements in iteration order |
//! | `SET` | u64 count, element encodings sorted bytewise |
//! | `MAP` | u64 count, key/value pairs in key order |
//! | `CYCLE` | u64 distance back up the in-progress stack |
//!
//! Type, variant and field names are written as bare `STR` payloads. Struct
//! fields are sorted by name.
//!
//! Artifacts encode as their ID only, never their structure, so a state
//! that mentions the same tile a thousand times stays small.

use std::sync::Arc;

use smallvec::SmallVec;

use crate::core::ArtifactId;

use super::Canonical;

/// Tag bytes. Values are part of the fingerprint format; never renumber.
pub mod tag {
    pub const UNIT: u8 = 0x00;
    pub const BOOL: u8 = 0x01;
    pub const INT: u8 = 0x02;
    pub const UINT: u8 = 0x03;
    pub const WIDE: u8 = 0x04;
    pub const STR: u8 = 0x05;
    pub const ARTIFACT: u8 = 0x10;
    pub const NONE: u8 = 0x20;
    pub const SOME: u8 = 0x21;
    pub const STRUCT: u8 = 0x30;
    pub const VARIANT: u8 = 0x31;
    pub const SEQ: u8 = 0x40;
    pub const SET: u8 = 0x41;
    pub const MAP: u8 = 0x42;
    pub const CYCLE: u8 = 0x7F;
}

/// Destination of canonical bytes.
pub trait ByteSink {
    fn write_bytes(&mut self, bytes: &[u8]);
}

impl ByteSink for Vec<u8> {
    fn write_bytes(&mut self, bytes: &[u8]) {
        self.extend_from_slice(bytes);
    }
}

impl ByteSink for sha2::Sha256 {
    fn write_bytes(&mut self, bytes: &[u8]) {
        sha2::Digest::update(self, bytes);
    }
}

/// A named field of a struct or enum variant being encoded.
pub type Field<'v> = (&'static str, &'v dyn Canonical);

/// Streams canonical bytes for a value graph into a `ByteSink`.
///
/// Shared nodes (`Arc`) currently being encoded are tracked by address so
/// that a reference cycle encodes as a `CYCLE` marker instead of recursing.
/// The same node reached twice without a cycle encodes in full both times,
/// so structural sharing never changes a fingerprint.
pub struct CanonicalEncoder<'s> {
    sink: &'s mut dyn ByteSink,
    in_progress: Vec<usize>,
}

impl<'s> CanonicalEncoder<'s> {
    /// Create an encoder writing to `sink`.
    pub fn new(sink: &'s mut dyn ByteSink) -> Self {
        Self {
            sink,
            in_progress: Vec::new(),
        }
    }

    fn raw(&mut self, bytes: &[u8]) {
        self.sink.write_bytes(bytes);
    }

    fn len(&mut self, len: usize) {
        self.raw(&(len as u64).to_le_bytes());
    }

    fn name(&mut self, name: &str) {
        self.len(name.len());
        self.raw(name.as_bytes());
    }

    /// Encode any canonical value.
    pub fn value<T: Canonical + ?Sized>(&mut self, value: &T) {
        value.encode(self);
    }

    pub fn unit(&mut self) {
        self.raw(&[tag::UNIT]);
    }

    pub fn bool(&mut self, value: bool) {
        self.raw(&[tag::BOOL, u8::from(value)]);
    }

    pub fn int(&mut self, value: i64) {
        self.raw(&[tag::INT]);
        self.raw(&value.to_le_bytes());
    }

    pub fn uint(&mut self, value: u64) {
        self.raw(&[tag::UINT]);
        self.raw(&value.to_le_bytes());
    }

    pub fn wide(&mut self, value: u128) {
        self.raw(&[tag::WIDE]);
        self.raw(&value.to_le_bytes());
    }

    pub fn str(&mut self, value: &str) {
        self.raw(&[tag::STR]);
        self.name(value);
    }

    /// Identity-bearing artifact: tag plus stable ID only.
    pub fn artifact(&mut self, id: ArtifactId) {
        self.raw(&[tag::ARTIFACT]);
        self.raw(&id.raw().to_le_bytes());
    }

    pub fn option<T: Canonical + ?Sized>(&mut self, value: Option<&T>) {
        match value {
            None => self.raw(&[tag::NONE]),
            Some(inner) => {
                self.raw(&[tag::SOME]);
                inner.encode(self);
            }
        }
    }

    /// Start encoding a struct. Fields are written in lexicographic name
    /// order whatever order they are added in.
    pub fn structure<'e, 'v>(&'e mut self, type_name: &'static str) -> FieldsEncoder<'e, 's, 'v> {
        FieldsEncoder {
            enc: self,
            type_name,
            variant: None,
            fields: SmallVec::new(),
        }
    }

    /// Start encoding one enum variant with its fields.
    pub fn variant<'e, 'v>(
        &'e mut self,
        type_name: &'static str,
        variant: &'static str,
    ) -> FieldsEncoder<'e, 's, 'v> {
        FieldsEncoder {
            enc: self,
            type_name,
            variant: Some(variant),
            fields: SmallVec::new(),
        }
    }

    /// Encode an ordered collection.
    pub fn seq<'v, T, I>(&mut self, items: I)
    where
        T: Canonical + ?Sized + 'v,
        I: IntoIterator<Item = &'v T>,
    {
        let items: Vec<&'v T> = items.into_iter().collect();
        self.raw(&[tag::SEQ]);
        self.len(items.len());
        for item in items {
            item.encode(self);
        }
    }

    /// Encode an unordered collection.
    ///
    /// Each element is encoded on its own and the encodings are sorted, so
    /// the result does not depend on iteration order.
    pub fn set<'v, T, I>(&mut self, items: I)
    where
        T: Canonical + ?Sized + 'v,
        I: IntoIterator<Item = &'v T>,
    {
        let mut encoded: Vec<Vec<u8>> = items
            .into_iter()
            .map(|item| self.encode_detached(|enc| item.encode(enc)))
            .collect();
        encoded.sort_unstable();

        self.raw(&[tag::SET]);
        self.len(encoded.len());
        for bytes in &encoded {
            self.raw(bytes);
        }
    }

    /// Encode a map whose iteration order is already its key order.
    pub fn ordered_map<'v, K, V, I>(&mut self, entries: I)
    where
        K: Canonical + ?Sized + 'v,
        V: Canonical + ?Sized + 'v,
        I: IntoIterator<Item = (&'v K, &'v V)>,
    {
        let entries: Vec<(&'v K, &'v V)> = entries.into_iter().collect();
        self.raw(&[tag::MAP]);
        self.len(entries.len());
        for (key, value) in entries {
            key.encode(self);
            value.encode(self);
        }
    }

    /// Encode a map with arbitrary iteration order (hash maps).
    ///
    /// Entries are sorted by the canonical encoding of their keys.
    pub fn unordered_map<'v, K, V, I>(&mut self, entries: I)
    where
        K: Canonical + ?Sized + 'v,
        V: Canonical + ?Sized + 'v,
        I: IntoIterator<Item = (&'v K, &'v V)>,
    {
        let mut encoded: Vec<(Vec<u8>, Vec<u8>)> = entries
            .into_iter()
            .map(|(key, value)| {
                (
                    self.encode_detached(|enc| key.encode(enc)),
                    self.encode_detached(|enc| value.encode(enc)),
                )
            })
            .collect();
        encoded.sort_unstable();

        self.raw(&[tag::MAP]);
        self.len(encoded.len());
        for (key, value) in &encoded {
            self.raw(key);
            self.raw(value);
        }
    }

    /// Encode a shared node, emitting a `CYCLE` marker if the node is
    /// already being encoded further up the stack.
    pub fn shared<T: Canonical + ?Sized>(&mut self, node: &Arc<T>) {
        let address = Arc::as_ptr(node).cast::<()>() as usize;
        if let Some(depth) = self.in_progress.iter().rev().position(|&a| a == address) {
            self.raw(&[tag::CYCLE]);
            self.len(depth);
            return;
        }

        self.in_progress.push(address);
        node.encode(self);
        self.in_progress.pop();
    }

    fn encode_detached(&self, f: impl FnOnce(&mut CanonicalEncoder<'_>)) -> Vec<u8> {
        let mut buffer = Vec::new();
        let mut nested = CanonicalEncoder {
            sink: &mut buffer,
            in_progress: self.in_progress.clone(),
        };
        f(&mut nested);
        buffer
    }
}

/// Collects the fields of a struct or variant, then writes them sorted.
///
/// ```
/// use rust_tabletop::hash::{canonical_bytes, Canonical, CanonicalEncoder};
///
/// struct Score { points: i64, bonus: i64 }
///
/// impl Canonical for Score {
///     fn encode(&self, enc: &mut CanonicalEncoder<'_>) {
///         enc.structure("Score")
///             .field("points", &self.points)
///             .field("bonus", &self.bonus)
///             .finish();
///     }
/// }
///
/// assert!(!canonical_bytes(&Score { points: 3, bonus: 1 }).is_empty());
/// ```
pub struct FieldsEncoder<'e, 's, 'v> {
    enc: &'e mut CanonicalEncoder<'s>,
    type_name: &'static str,
    variant: Option<&'static str>,
    fields: SmallVec<[Field<'v>; 6]>,
}

impl<'e, 's, 'v> FieldsEncoder<'e, 's, 'v> {
    /// Add a field.
    #[must_use]
    pub fn field<T: Canonical>(mut self, name: &'static str, value: &'v T) -> Self {
        self.fields.push((name, value));
        self
    }

    /// Write the header and all fields.
    pub fn finish(mut self) {
        self.fields.sort_unstable_by(|a, b| a.0.cmp(b.0));
        match self.variant {
            None => {
                self.enc.raw(&[tag::STRUCT]);
                self.enc.name(self.type_name);
            }
            Some(variant) => {
                self.enc.raw(&[tag::VARIANT]);
                self.enc.name(self.type_name);
                self.enc.name(variant);
            }
        }
        self.enc.len(self.fields.len());
        for (name, value) in &self.fields {
            self.enc.name(name);
            value.encode(self.enc);
        }
    }
}
