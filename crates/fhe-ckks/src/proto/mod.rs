//! Protobuf definitions and serialization for FHE types.

/// Protobuf for the CKKS encryption scheme.
pub mod ckks;
