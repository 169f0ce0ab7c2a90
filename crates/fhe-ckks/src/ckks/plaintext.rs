//! Plaintext type in the CKKS encryption scheme.

use crate::ckks::{CkksParameters, Encoder, ParmsId};
use crate::Result;
use fhe_math::rq::Poly;
use fhe_traits::FheParametrized;
use std::sync::Arc;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// A plaintext object: a scaled polynomial at a given level.
#[derive(Debug, Clone, PartialEq)]
pub struct Plaintext {
    /// The parameters of the underlying CKKS encryption scheme.
    pub(crate) par: Arc<CkksParameters>,
    /// The encoded polynomial, in Ntt representation.
    pub(crate) poly_ntt: Poly,
    /// The scale the values were multiplied by.
    pub(crate) scale: f64,
    /// The level of the plaintext.
    pub(crate) level: usize,
}

impl Zeroize for Plaintext {
    fn zeroize(&mut self) {
        self.poly_ntt.zeroize();
    }
}

impl ZeroizeOnDrop for Plaintext {}

impl Drop for Plaintext {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl FheParametrized for Plaintext {
    type Parameters = CkksParameters;
}

impl Plaintext {
    /// Returns the scale of the plaintext.
    pub const fn scale(&self) -> f64 {
        self.scale
    }

    /// Returns the level of the plaintext.
    pub const fn level(&self) -> usize {
        self.level
    }

    /// Returns the fingerprint of the plaintext level.
    pub fn parms_id(&self) -> ParmsId {
        self.par.parms_ids[self.level]
    }

    /// Decodes the plaintext into its real slot values.
    pub fn decode(&self) -> Result<Vec<f64>> {
        Encoder::new(&self.par).decode(self)
    }
}
