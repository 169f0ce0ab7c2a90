#![warn(missing_docs, unused_imports)]

//! The CKKS homomorphic encryption scheme over the reals.

mod ciphertext;
mod encoding;
mod keys;
mod parameters;
mod plaintext;
mod rns;

pub mod ops;
pub mod traits;

pub use ciphertext::Ciphertext;
pub use encoding::Encoder;
pub use keys::{PublicKey, RelinearizationKey, SecretKey};
pub use ops::{add, multiply};
pub use parameters::{CkksParameters, CkksParametersBuilder, ParmsId, CKKS_SCHEME_ID};
pub use plaintext::Plaintext;
