//! Public keys for the CKKS encryption scheme

use crate::ckks::traits::TryConvertFrom;
use crate::ckks::{CkksParameters, Ciphertext, ParmsId, Plaintext};
use crate::proto::ckks::{Ciphertext as CiphertextProto, PublicKey as PublicKeyProto};
use crate::{Error, Result};
use fhe_math::rq::{Poly, Representation};
use fhe_traits::{DeserializeParametrized, FheParametrized, Serialize};
use prost::Message;
use rand::{CryptoRng, RngCore};
use std::sync::Arc;
use zeroize::Zeroizing;

use super::SecretKey;

/// Public key for the CKKS encryption scheme: an encryption of zero at the
/// first level.
#[derive(Debug, PartialEq, Clone)]
pub struct PublicKey {
    /// The CKKS parameters
    pub(crate) par: Arc<CkksParameters>,
    /// The public key ciphertext
    pub(crate) c: Ciphertext,
}

impl PublicKey {
    /// Generate a new [`PublicKey`] from a [`SecretKey`].
    pub fn new<R: RngCore + CryptoRng>(sk: &SecretKey, rng: &mut R) -> Result<Self> {
        let ctx = sk.par.ctx_at_level(0)?;
        let s = sk.poly_ntt(ctx)?;

        let a = Poly::random(ctx, Representation::Ntt, rng);
        let e = Zeroizing::new(Poly::small(
            ctx,
            Representation::Ntt,
            sk.par.variance,
            rng,
        )?);
        let mut b = &a * s.as_ref();
        b += e.as_ref();
        let b = -&b;

        Ok(Self {
            par: sk.par.clone(),
            c: Ciphertext::new(vec![b, a], 0, 1.0, &sk.par)?,
        })
    }

    /// Encrypt a plaintext using the public key. The ciphertext inherits the
    /// level and the scale of the plaintext.
    pub fn try_encrypt<R: RngCore + CryptoRng>(
        &self,
        pt: &Plaintext,
        rng: &mut R,
    ) -> Result<Ciphertext> {
        if pt.par != self.par {
            return Err(Error::ParametersMismatch);
        }

        let mut ct = self.c.clone();
        while ct.level != pt.level {
            ct.mod_switch_to_next_level()?;
        }

        let ctx = self.par.ctx_at_level(ct.level)?;
        let u = Zeroizing::new(Poly::small(
            ctx,
            Representation::Ntt,
            self.par.variance,
            rng,
        )?);
        let e1 = Zeroizing::new(Poly::small(
            ctx,
            Representation::Ntt,
            self.par.variance,
            rng,
        )?);
        let e2 = Zeroizing::new(Poly::small(
            ctx,
            Representation::Ntt,
            self.par.variance,
            rng,
        )?);

        let mut c0 = u.as_ref() * &ct.c[0];
        c0 += e1.as_ref();
        c0 += &pt.poly_ntt;
        let mut c1 = u.as_ref() * &ct.c[1];
        c1 += e2.as_ref();

        Ciphertext::new(vec![c0, c1], ct.level, pt.scale, &self.par)
    }
}

impl FheParametrized for PublicKey {
    type Parameters = CkksParameters;
}

impl From<&PublicKey> for PublicKeyProto {
    fn from(pk: &PublicKey) -> Self {
        PublicKeyProto {
            c: Some(CiphertextProto::from(&pk.c)),
            parms_id: pk.par.key_parms_id().as_bytes().to_vec(),
        }
    }
}

impl Serialize for PublicKey {
    fn to_bytes(&self) -> Vec<u8> {
        PublicKeyProto::from(self).encode_to_vec()
    }
}

impl DeserializeParametrized for PublicKey {
    type Error = Error;

    fn from_bytes(bytes: &[u8], par: &Arc<Self::Parameters>) -> Result<Self> {
        let proto: PublicKeyProto =
            Message::decode(bytes).map_err(|_| Error::SerializationError)?;
        if ParmsId::try_from_slice(&proto.parms_id)? != par.key_parms_id() {
            return Err(Error::ParametersMismatch);
        }
        let c = proto.c.as_ref().ok_or(Error::SerializationError)?;
        let c = Ciphertext::try_convert_from(c, par)?;
        if c.level != 0 || c.c.len() != 2 {
            Err(Error::SerializationError)
        } else {
            Ok(Self {
                par: par.clone(),
                c,
            })
        }
    }
}
