//! Reference games built only from the public extension points.

pub mod ring;
