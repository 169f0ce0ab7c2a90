#![crate_name = "ckks_keygen"]
#![crate_type = "lib"]
#![warn(missing_docs, unused_imports)]

//! Lifecycle of a CKKS key bundle: generate once, persist as text, reload,
//! and check every bundle with a fixed encrypted computation.

mod config;
mod errors;

pub mod cli;
pub mod codec;
pub mod engine;
pub mod lifecycle;
pub mod oracle;
pub mod serializer;

pub use config::{AcceptanceRule, KeyFiles, KeygenConfig, KeygenConfigBuilder};
pub use engine::{CkksEngine, Engine};
pub use errors::{Error, Result};
pub use lifecycle::{Lifecycle, Report};
