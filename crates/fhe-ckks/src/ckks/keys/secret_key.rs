//! Secret keys for the CKKS encryption scheme

use crate::ckks::{CkksParameters, Ciphertext, ParmsId, Plaintext};
use crate::proto::ckks::SecretKey as SecretKeyProto;
use crate::{Error, Result};
use fhe_math::rq::{traits::TryConvertFrom, Context, Poly, Representation};
use fhe_traits::{DeserializeParametrized, FheParametrized, Serialize};
use fhe_util::sample_vec_cbd;
use prost::Message;
use rand::{CryptoRng, RngCore};
use std::sync::Arc;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

/// Secret key for the CKKS encryption scheme.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct SecretKey {
    /// The CKKS parameters
    pub(crate) par: Arc<CkksParameters>,
    /// The secret key coefficients
    pub(crate) coeffs: Box<[i64]>,
}

impl Zeroize for SecretKey {
    fn zeroize(&mut self) {
        self.coeffs.zeroize();
    }
}

impl ZeroizeOnDrop for SecretKey {}

impl Drop for SecretKey {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl SecretKey {
    /// The variance used for secret key sampling; coefficients lie in
    /// `[-2 * VARIANCE, 2 * VARIANCE]`.
    pub const VARIANCE: usize = 1;

    /// Generate a random [`SecretKey`].
    pub fn random<R: RngCore + CryptoRng>(
        par: &Arc<CkksParameters>,
        rng: &mut R,
    ) -> Result<Self> {
        let s_coefficients = sample_vec_cbd(par.degree(), Self::VARIANCE, rng)
            .map_err(|e| Error::DefaultError(e.to_string()))?;
        Self::new(s_coefficients, par)
    }

    /// Generate a [`SecretKey`] from its coefficients.
    pub fn new(coeffs: Vec<i64>, par: &Arc<CkksParameters>) -> Result<Self> {
        if coeffs.len() != par.degree() {
            return Err(Error::DefaultError(format!(
                "Expected {} secret key coefficients, got {}",
                par.degree(),
                coeffs.len()
            )));
        }
        let bound = 2 * Self::VARIANCE as i64;
        if coeffs.iter().any(|c| c.abs() > bound) {
            return Err(Error::DefaultError("Secret key coefficient out of range".to_string()));
        }
        Ok(Self {
            par: par.clone(),
            coeffs: coeffs.into_boxed_slice(),
        })
    }

    /// The secret key as an Ntt polynomial over `ctx`.
    pub(crate) fn poly_ntt(&self, ctx: &Arc<Context>) -> Result<Zeroizing<Poly>> {
        let mut s = Zeroizing::new(Poly::try_convert_from(
            self.coeffs.as_ref(),
            ctx,
            false,
            Representation::PowerBasis,
        )?);
        s.change_representation(Representation::Ntt);
        Ok(s)
    }

    /// Decrypts a ciphertext of any size by evaluating it at the secret key.
    pub fn try_decrypt(&self, ct: &Ciphertext) -> Result<Plaintext> {
        if self.par != ct.par {
            return Err(Error::ParametersMismatch);
        }

        let s = self.poly_ntt(ct.c[0].ctx())?;
        let mut si = s.clone();
        let mut m = Zeroizing::new(ct.c[0].clone());
        for ci in ct.c.iter().skip(1) {
            let mut term = Zeroizing::new(ci.clone());
            *term.as_mut() *= si.as_ref();
            *m.as_mut() += term.as_ref();
            *si.as_mut() *= s.as_ref();
        }

        Ok(Plaintext {
            par: self.par.clone(),
            poly_ntt: m.as_ref().clone(),
            scale: ct.scale,
            level: ct.level,
        })
    }
}

impl FheParametrized for SecretKey {
    type Parameters = CkksParameters;
}

impl Serialize for SecretKey {
    fn to_bytes(&self) -> Vec<u8> {
        SecretKeyProto {
            coeffs: self.coeffs.to_vec(),
            parms_id: self.par.key_parms_id().as_bytes().to_vec(),
        }
        .encode_to_vec()
    }
}

impl DeserializeParametrized for SecretKey {
    type Error = Error;

    fn from_bytes(bytes: &[u8], par: &Arc<Self::Parameters>) -> Result<Self> {
        let mut proto: SecretKeyProto =
            Message::decode(bytes).map_err(|_| Error::SerializationError)?;
        if ParmsId::try_from_slice(&proto.parms_id)? != par.key_parms_id() {
            proto.coeffs.zeroize();
            return Err(Error::ParametersMismatch);
        }
        let coeffs = std::mem::take(&mut proto.coeffs);
        Self::new(coeffs, par).map_err(|_| Error::SerializationError)
    }
}

#[cfg(test)]
mod tests {
    use super::SecretKey;
    use crate::ckks::{CkksParameters, CkksParametersBuilder, Encoder, PublicKey};
    use crate::proto::ckks::SecretKey as SecretKeyProto;
    use crate::Error;
    use fhe_traits::{DeserializeParametrized, Serialize};
    use prost::Message;
    use rand::{thread_rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;
    use std::error::Error as StdError;

    #[test]
    fn keygen() -> Result<(), Box<dyn StdError>> {
        let mut rng = thread_rng();
        let params = CkksParameters::default_arc(4, 16);
        let sk = SecretKey::random(&params, &mut rng)?;
        assert_eq!(sk.par, params);
        assert_eq!(sk.coeffs.len(), 16);
        assert!(sk.coeffs.iter().all(|c| c.abs() <= 2));

        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let sk1 = SecretKey::random(&params, &mut rng)?;
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let sk2 = SecretKey::random(&params, &mut rng)?;
        assert_eq!(sk1, sk2);

        assert!(SecretKey::new(vec![0; 15], &params).is_err());
        assert!(SecretKey::new(vec![3; 16], &params).is_err());
        Ok(())
    }

    #[test]
    fn encrypt_decrypt() -> Result<(), Box<dyn StdError>> {
        let mut rng = thread_rng();
        let params = CkksParameters::default_arc(4, 1024);
        let sk = SecretKey::random(&params, &mut rng)?;
        let pk = PublicKey::new(&sk, &mut rng)?;
        let encoder = Encoder::new(&params);
        let values = (0..params.slots()).map(|i| i as f64 / 7.0).collect::<Vec<_>>();
        for level in 0..=params.max_level() {
            let pt = encoder.encode(&values, 2f64.powi(40), level)?;
            let ct = pk.try_encrypt(&pt, &mut rng)?;
            let decrypted = sk.try_decrypt(&ct)?;
            assert_eq!(decrypted.level(), level);
            for (a, b) in values.iter().zip(encoder.decode(&decrypted)?.iter()) {
                assert!((a - b).abs() < 1e-6, "{a} != {b}");
            }
        }

        let other = CkksParameters::default_arc(4, 32);
        let other_sk = SecretKey::random(&other, &mut rng)?;
        let ct = pk.try_encrypt(&encoder.encode_scalar(1.0, 2f64.powi(40), 0)?, &mut rng)?;
        assert_eq!(other_sk.try_decrypt(&ct), Err(Error::ParametersMismatch));
        Ok(())
    }

    #[test]
    fn serialize() -> Result<(), Box<dyn StdError>> {
        let mut rng = thread_rng();
        let params = CkksParameters::default_arc(4, 16);
        let sk = SecretKey::random(&params, &mut rng)?;
        let bytes = sk.to_bytes();
        assert_eq!(sk, SecretKey::from_bytes(&bytes, &params)?);

        let other = CkksParameters::default_arc(4, 32);
        assert_eq!(
            SecretKey::from_bytes(&bytes, &other),
            Err(Error::ParametersMismatch)
        );

        // Same chain, different error variance.
        let noisier = CkksParametersBuilder::new()
            .set_degree(16)
            .set_moduli(params.moduli())
            .set_variance(params.variance() + 1)
            .build_arc()?;
        assert_eq!(
            SecretKey::from_bytes(&bytes, &noisier),
            Err(Error::ParametersMismatch)
        );

        let mut proto = SecretKeyProto::decode(bytes.as_slice())?;
        proto.coeffs.pop();
        assert_eq!(
            SecretKey::from_bytes(&proto.encode_to_vec(), &params),
            Err(Error::SerializationError)
        );
        proto.parms_id.truncate(3);
        assert_eq!(
            SecretKey::from_bytes(&proto.encode_to_vec(), &params),
            Err(Error::SerializationError)
        );
        Ok(())
    }
}
