#![crate_name = "fhe_ckks"]
#![crate_type = "lib"]
#![warn(missing_docs, unused_imports)]

//! CKKS approximate homomorphic encryption built on the `fhe-math` RNS
//! polynomial arithmetic.
//!
//! The scheme follows the usual RNS layout: the last prime of the modulus
//! chain is a special prime only used during key switching, and the remaining
//! primes are consumed one by one by rescaling.

mod errors;

pub mod ckks;
pub mod proto;
pub use errors::{Error, ParametersError, Result};
