//! CKKS protobuf definitions.
//!
//! `generated.rs` mirrors `ckks.proto`; both must be updated together.

#[allow(clippy::all)]
mod generated;

pub use generated::*;
