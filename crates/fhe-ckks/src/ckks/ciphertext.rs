//! Ciphertext type in the CKKS encryption scheme.

use crate::ckks::rns::{poly_from_bytes, poly_to_bytes, truncate};
use crate::ckks::{traits::TryConvertFrom, CkksParameters, ParmsId};
use crate::proto::ckks::Ciphertext as CiphertextProto;
use crate::{Error, Result};
use fhe_math::rq::{Poly, Representation};
use fhe_traits::{DeserializeParametrized, FheParametrized, Serialize};
use prost::Message;
use std::sync::Arc;

/// A ciphertext encrypting a plaintext.
#[derive(Debug, Clone, PartialEq)]
pub struct Ciphertext {
    /// The parameters of the underlying CKKS encryption scheme.
    pub(crate) par: Arc<CkksParameters>,

    /// The ciphertext elements, in Ntt representation.
    pub c: Vec<Poly>,

    /// The ciphertext level
    pub(crate) level: usize,

    /// The scale of the encrypted values.
    pub(crate) scale: f64,
}

impl Ciphertext {
    /// Create a ciphertext from a vector of polynomials.
    /// A ciphertext must contain at least two polynomials, and all polynomials
    /// must be in Ntt representation and over the context of `level`.
    pub fn new(
        c: Vec<Poly>,
        level: usize,
        scale: f64,
        par: &Arc<CkksParameters>,
    ) -> Result<Self> {
        if c.len() < 2 {
            return Err(Error::TooFewValues(c.len(), 2));
        }
        let ctx = par.ctx_at_level(level)?;
        for ci in &c {
            if ci.representation() != &Representation::Ntt {
                return Err(Error::DefaultError(
                    "Ciphertext polynomials must be in Ntt representation".to_string(),
                ));
            }
            if ci.ctx() != ctx {
                return Err(Error::MathError(fhe_math::Error::InvalidContext));
            }
        }
        if !scale.is_finite() || scale <= 0.0 {
            return Err(Error::DefaultError(format!("Invalid scale {scale}")));
        }
        Ok(Self {
            par: par.clone(),
            c,
            level,
            scale,
        })
    }

    /// Returns the level of the ciphertext.
    pub const fn level(&self) -> usize {
        self.level
    }

    /// Returns the scale of the ciphertext.
    pub const fn scale(&self) -> f64 {
        self.scale
    }

    /// Overwrites the scale without touching the polynomials.
    pub fn set_scale(&mut self, scale: f64) {
        self.scale = scale
    }

    /// Returns the fingerprint of the ciphertext level.
    pub fn parms_id(&self) -> ParmsId {
        self.par.parms_ids[self.level]
    }

    /// Divides the ciphertext by the last prime of its level, with rounding,
    /// and moves it to the next level. The scale is divided by the same prime.
    pub fn rescale_to_next(&mut self) -> Result<()> {
        if self.level >= self.par.max_level() {
            return Err(Error::DefaultError("No level left to rescale to".to_string()));
        }
        let moduli = self.par.ctx_at_level(self.level)?.moduli();
        let dropped = moduli[moduli.len() - 1];
        for ci in self.c.iter_mut() {
            ci.change_representation(Representation::PowerBasis);
            ci.mod_switch_down_next()?;
            ci.change_representation(Representation::Ntt);
        }
        self.scale /= dropped as f64;
        self.level += 1;
        Ok(())
    }

    /// Drops the last prime of the ciphertext level without scaling.
    pub fn mod_switch_to_next_level(&mut self) -> Result<()> {
        if self.level >= self.par.max_level() {
            return Err(Error::DefaultError("No level left to switch to".to_string()));
        }
        let next_ctx = self.par.ctx_at_level(self.level + 1)?;
        self.c = self
            .c
            .iter()
            .map(|ci| truncate(ci, next_ctx, Representation::Ntt))
            .collect::<Result<Vec<_>>>()?;
        self.level += 1;
        Ok(())
    }

    /// Drops primes until the ciphertext reaches the level of `parms_id`.
    pub fn mod_switch_to(&mut self, parms_id: &ParmsId) -> Result<()> {
        let target = self.par.level_of_parms_id(parms_id)?;
        if target < self.level {
            return Err(Error::LevelMismatch(self.level, target));
        }
        while self.level < target {
            self.mod_switch_to_next_level()?;
        }
        Ok(())
    }
}

impl FheParametrized for Ciphertext {
    type Parameters = CkksParameters;
}

impl Serialize for Ciphertext {
    fn to_bytes(&self) -> Vec<u8> {
        CiphertextProto::from(self).encode_to_vec()
    }
}

impl DeserializeParametrized for Ciphertext {
    fn from_bytes(bytes: &[u8], par: &Arc<CkksParameters>) -> Result<Self> {
        if let Ok(ctp) = Message::decode(bytes) {
            Ciphertext::try_convert_from(&ctp, par)
        } else {
            Err(Error::SerializationError)
        }
    }

    type Error = Error;
}

/// Conversions from and to protobuf.
impl From<&Ciphertext> for CiphertextProto {
    fn from(ct: &Ciphertext) -> Self {
        CiphertextProto {
            c: ct.c.iter().map(poly_to_bytes).collect(),
            level: ct.level as u32,
            scale: ct.scale,
        }
    }
}

impl TryConvertFrom<&CiphertextProto> for Ciphertext {
    fn try_convert_from(value: &CiphertextProto, par: &Arc<CkksParameters>) -> Result<Self> {
        if value.c.len() < 2 {
            return Err(Error::SerializationError);
        }

        if value.level as usize > par.max_level() {
            return Err(Error::SerializationError);
        }

        let ctx = par.ctx_at_level(value.level as usize)?;
        let c = value
            .c
            .iter()
            .map(|cip| poly_from_bytes(cip, par.degree(), ctx, Representation::Ntt))
            .collect::<Result<Vec<_>>>()?;

        Ciphertext::new(c, value.level as usize, value.scale, par)
            .map_err(|_| Error::SerializationError)
    }
}
