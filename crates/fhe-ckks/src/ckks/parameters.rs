//! Create parameters for the CKKS encryption scheme

use crate::proto::ckks::Parameters;
use crate::{Error, ParametersError, Result};
use fhe_math::{
    rq::{traits::TryConvertFrom, Context, Poly, Representation},
    zq::primes::generate_prime,
};
use fhe_traits::{Deserialize, FheParameters, Serialize};
use itertools::Itertools;
use prost::Message;
use sha2::{Digest, Sha256};
use std::fmt::{Debug, Display};
use std::sync::Arc;

/// Scheme identifier written in serialized parameters.
pub const CKKS_SCHEME_ID: u32 = 2;

/// Fingerprint of a parameter level: SHA-256 of the degree, the error
/// variance and the moduli active at that level.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParmsId([u8; 32]);

impl ParmsId {
    fn compute(degree: usize, variance: usize, moduli: &[u64]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update((degree as u64).to_le_bytes());
        hasher.update((variance as u64).to_le_bytes());
        for qi in moduli {
            hasher.update(qi.to_le_bytes());
        }
        Self(hasher.finalize().into())
    }

    /// Returns the fingerprint bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub(crate) fn try_from_slice(bytes: &[u8]) -> Result<Self> {
        let id: [u8; 32] = bytes.try_into().map_err(|_| Error::SerializationError)?;
        Ok(Self(id))
    }
}

impl Display for ParmsId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for b in &self.0[..8] {
            write!(f, "{b:02x}")?;
        }
        Ok(())
    }
}

impl Debug for ParmsId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ParmsId({self})")
    }
}

/// Parameters for the CKKS encryption scheme.
#[derive(PartialEq, Eq)]
pub struct CkksParameters {
    /// Number of coefficients in a polynomial.
    polynomial_degree: usize,

    /// Vector of coprime moduli; the last one is the special prime.
    pub(crate) moduli: Box<[u64]>,

    /// Bit sizes of the moduli.
    moduli_sizes: Box<[usize]>,

    /// Error variance
    pub(crate) variance: usize,

    /// Context of the data polynomials, one per level.
    pub(crate) ctx: Vec<Arc<Context>>,

    /// Key switching contexts: the data moduli of a level followed by the
    /// special prime.
    pub(crate) ks_ctx: Vec<Arc<Context>>,

    /// `P mod q_i` placed in row `i` of an Ntt polynomial over `ks_ctx[0]`.
    pub(crate) ks_factors: Box<[Poly]>,

    pub(crate) parms_ids: Box<[ParmsId]>,

    key_parms_id: ParmsId,
}

impl Debug for CkksParameters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CkksParameters")
            .field("polynomial_degree", &self.polynomial_degree)
            .field("moduli", &self.moduli)
            .field("variance", &self.variance)
            .finish()
    }
}

impl FheParameters for CkksParameters {}

impl CkksParameters {
    /// Returns the underlying polynomial degree
    pub const fn degree(&self) -> usize {
        self.polynomial_degree
    }

    /// Returns the number of complex slots of a plaintext.
    pub const fn slots(&self) -> usize {
        self.polynomial_degree / 2
    }

    /// Returns a reference to the moduli, special prime included.
    pub fn moduli(&self) -> &[u64] {
        &self.moduli
    }

    /// Returns a reference to the moduli sizes
    pub fn moduli_sizes(&self) -> &[usize] {
        &self.moduli_sizes
    }

    /// Returns the special prime used for key switching.
    pub fn special_prime(&self) -> u64 {
        self.moduli[self.moduli.len() - 1]
    }

    /// Returns the error variance
    pub const fn variance(&self) -> usize {
        self.variance
    }

    /// Returns the maximum level allowed by these parameters.
    pub fn max_level(&self) -> usize {
        self.ctx.len() - 1
    }

    /// Returns the context corresponding to the level.
    pub fn ctx_at_level(&self, level: usize) -> Result<&Arc<Context>> {
        self.ctx
            .get(level)
            .ok_or_else(|| Error::DefaultError("No context".to_string()))
    }

    pub(crate) fn ks_ctx_at_level(&self, level: usize) -> Result<&Arc<Context>> {
        self.ks_ctx
            .get(level)
            .ok_or_else(|| Error::DefaultError("No key switching context".to_string()))
    }

    /// Returns the fingerprint of a level.
    pub fn parms_id_at_level(&self, level: usize) -> Result<ParmsId> {
        self.parms_ids
            .get(level)
            .copied()
            .ok_or_else(|| Error::DefaultError("No such level".to_string()))
    }

    /// Returns the level with the given fingerprint.
    pub fn level_of_parms_id(&self, parms_id: &ParmsId) -> Result<usize> {
        self.parms_ids
            .iter()
            .position(|id| id == parms_id)
            .ok_or(Error::ParametersMismatch)
    }

    /// Returns the fingerprint of the full modulus chain, which keys are
    /// bound to.
    pub const fn key_parms_id(&self) -> ParmsId {
        self.key_parms_id
    }

    /// Parameters with a 60-bit first modulus and special prime and 40-bit
    /// moduli in between.
    #[cfg(test)]
    pub fn default_arc(num_moduli: usize, degree: usize) -> Arc<Self> {
        let mut sizes = vec![60; num_moduli];
        for size in sizes.iter_mut().take(num_moduli - 1).skip(1) {
            *size = 40;
        }
        CkksParametersBuilder::new()
            .set_degree(degree)
            .set_moduli_sizes(&sizes)
            .build_arc()
            .unwrap()
    }
}

/// Builder for parameters for the CKKS encryption scheme.
#[derive(Debug)]
pub struct CkksParametersBuilder {
    degree: usize,
    variance: usize,
    moduli: Vec<u64>,
    moduli_sizes: Vec<usize>,
}

impl CkksParametersBuilder {
    /// Creates a new instance of the builder
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            degree: Default::default(),
            variance: 10,
            moduli: Default::default(),
            moduli_sizes: Default::default(),
        }
    }

    /// Sets the polynomial degree. Building fails if the degree is not a
    /// power of two larger or equal to 8.
    pub fn set_degree(&mut self, degree: usize) -> &mut Self {
        self.degree = degree;
        self
    }

    /// Sets the sizes of the moduli, the last one being the special prime.
    /// Only one of `set_moduli_sizes` and `set_moduli` can be specified.
    pub fn set_moduli_sizes(&mut self, sizes: &[usize]) -> &mut Self {
        self.moduli_sizes = sizes.to_owned();
        self
    }

    /// Sets the moduli to use, the last one being the special prime.
    /// Only one of `set_moduli_sizes` and `set_moduli` can be specified.
    pub fn set_moduli(&mut self, moduli: &[u64]) -> &mut Self {
        self.moduli = moduli.to_owned();
        self
    }

    /// Sets the error variance.
    pub fn set_variance(&mut self, variance: usize) -> &mut Self {
        self.variance = variance;
        self
    }

    /// Generate distinct primes of the requested sizes, each congruent to 1
    /// modulo 2 * degree.
    fn generate_moduli(moduli_sizes: &[usize], degree: usize) -> Result<Vec<u64>> {
        let mut moduli = vec![];
        for size in moduli_sizes {
            if *size > 62 || *size < 10 {
                return Err(Error::ParametersError(ParametersError::InvalidModulusSize(
                    *size, 10, 62,
                )));
            }

            let mut upper_bound = 1 << size;
            loop {
                if let Some(prime) = generate_prime(*size, 2 * degree as u64, upper_bound) {
                    if !moduli.contains(&prime) {
                        moduli.push(prime);
                        break;
                    } else {
                        upper_bound = prime;
                    }
                } else {
                    return Err(Error::ParametersError(ParametersError::NotEnoughPrimes(
                        *size, degree,
                    )));
                }
            }
        }

        Ok(moduli)
    }

    /// Build a new `CkksParameters` inside an `Arc`.
    pub fn build_arc(&self) -> Result<Arc<CkksParameters>> {
        self.build().map(Arc::new)
    }

    /// Build a new `CkksParameters`.
    pub fn build(&self) -> Result<CkksParameters> {
        // Check that the degree is a power of 2 (and large enough).
        if self.degree < 8 || !self.degree.is_power_of_two() {
            return Err(Error::ParametersError(ParametersError::InvalidDegree(
                self.degree,
            )));
        }

        // This checks that exactly one of moduli or moduli_sizes is specified.
        if !self.moduli.is_empty() && !self.moduli_sizes.is_empty() {
            return Err(Error::ParametersError(ParametersError::TooManySpecified(
                "Only one of `moduli` and `moduli_sizes` can be specified".to_string(),
            )));
        } else if self.moduli.is_empty() && self.moduli_sizes.is_empty() {
            return Err(Error::ParametersError(ParametersError::TooFewSpecified(
                "One of `moduli` and `moduli_sizes` must be specified".to_string(),
            )));
        }

        let moduli = if !self.moduli.is_empty() {
            self.moduli.clone()
        } else {
            Self::generate_moduli(&self.moduli_sizes, self.degree)?
        };

        if moduli.len() < 2 {
            return Err(Error::ParametersError(ParametersError::TooFewSpecified(
                "At least one data modulus and the special prime are required".to_string(),
            )));
        }
        if !moduli.iter().all_unique() {
            return Err(Error::ParametersError(ParametersError::TooManySpecified(
                "The moduli must be distinct".to_string(),
            )));
        }

        // Recomputes the moduli sizes
        let moduli_sizes = moduli
            .iter()
            .map(|m| 64 - m.leading_zeros() as usize)
            .collect_vec();

        let data_count = moduli.len() - 1;
        let special_prime = moduli[data_count];

        let mut ctx = Vec::with_capacity(data_count);
        let mut ks_ctx = Vec::with_capacity(data_count);
        let mut parms_ids = Vec::with_capacity(data_count);
        for level in 0..data_count {
            let level_moduli = &moduli[..data_count - level];
            ctx.push(Arc::new(Context::new(level_moduli, self.degree)?));
            let ks_moduli = level_moduli
                .iter()
                .copied()
                .chain(std::iter::once(special_prime))
                .collect_vec();
            ks_ctx.push(Arc::new(Context::new(&ks_moduli, self.degree)?));
            parms_ids.push(ParmsId::compute(self.degree, self.variance, level_moduli));
        }

        let ks_factors = (0..data_count)
            .map(|i| {
                let mut data = vec![0u64; moduli.len() * self.degree];
                data[i * self.degree..(i + 1) * self.degree].fill(special_prime % moduli[i]);
                Poly::try_convert_from(data, &ks_ctx[0], false, Representation::Ntt)
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(CkksParameters {
            polynomial_degree: self.degree,
            key_parms_id: ParmsId::compute(self.degree, self.variance, &moduli),
            moduli: moduli.into_boxed_slice(),
            moduli_sizes: moduli_sizes.into_boxed_slice(),
            variance: self.variance,
            ctx,
            ks_ctx,
            ks_factors: ks_factors.into_boxed_slice(),
            parms_ids: parms_ids.into_boxed_slice(),
        })
    }
}

impl Serialize for CkksParameters {
    fn to_bytes(&self) -> Vec<u8> {
        Parameters {
            scheme: CKKS_SCHEME_ID,
            degree: self.polynomial_degree as u32,
            moduli: self.moduli.to_vec(),
            variance: self.variance as u32,
        }
        .encode_to_vec()
    }
}

impl Deserialize for CkksParameters {
    fn try_deserialize(bytes: &[u8]) -> Result<Self> {
        let params: Parameters = Message::decode(bytes).map_err(|_| Error::SerializationError)?;
        if params.scheme != CKKS_SCHEME_ID {
            return Err(Error::ParametersError(ParametersError::UnsupportedScheme(
                params.scheme,
            )));
        }
        CkksParametersBuilder::new()
            .set_degree(params.degree as usize)
            .set_moduli(&params.moduli)
            .set_variance(params.variance as usize)
            .build()
    }
    type Error = Error;
}

#[cfg(test)]
mod tests {
    use super::{CkksParameters, CkksParametersBuilder, ParmsId};
    use crate::proto::ckks::Parameters;
    use crate::{Error, ParametersError};
    use fhe_traits::{Deserialize, Serialize};
    use prost::Message;
    use std::error::Error as StdError;

    #[test]
    fn default() {
        let params = CkksParameters::default_arc(4, 16);
        assert_eq!(params.moduli.len(), 4);
        assert_eq!(params.moduli_sizes(), &[60, 40, 40, 60]);
        assert_eq!(params.degree(), 16);
        assert_eq!(params.slots(), 8);
        assert_eq!(params.max_level(), 2);
        assert_eq!(params.variance(), 10);
    }

    #[test]
    fn contexts_follow_the_chain() -> Result<(), Box<dyn StdError>> {
        let params = CkksParameters::default_arc(4, 16);
        let moduli = params.moduli();
        for level in 0..=params.max_level() {
            let k = 3 - level;
            assert_eq!(params.ctx_at_level(level)?.moduli(), &moduli[..k]);
            let ks = params.ks_ctx_at_level(level)?.moduli().to_vec();
            assert_eq!(&ks[..k], &moduli[..k]);
            assert_eq!(ks[k], params.special_prime());
        }
        assert!(params.ctx_at_level(3).is_err());
        assert_eq!(params.ks_factors.len(), 3);
        Ok(())
    }

    #[test]
    fn parms_ids() -> Result<(), Box<dyn StdError>> {
        let params = CkksParameters::default_arc(4, 16);
        let ids = (0..=params.max_level())
            .map(|level| params.parms_id_at_level(level))
            .collect::<Result<Vec<_>, _>>()?;
        assert_ne!(ids[0], ids[1]);
        assert_ne!(ids[1], ids[2]);
        assert!(!ids.contains(&params.key_parms_id()));
        for (level, id) in ids.iter().enumerate() {
            assert_eq!(params.level_of_parms_id(id)?, level);
        }
        assert_eq!(
            params.level_of_parms_id(&ParmsId([0u8; 32])),
            Err(Error::ParametersMismatch)
        );

        let other = CkksParameters::default_arc(4, 32);
        assert_ne!(other.key_parms_id(), params.key_parms_id());

        let noisier = CkksParametersBuilder::new()
            .set_degree(16)
            .set_moduli(params.moduli())
            .set_variance(params.variance() + 1)
            .build()?;
        assert_ne!(noisier.key_parms_id(), params.key_parms_id());
        assert_ne!(noisier.parms_id_at_level(0)?, params.parms_id_at_level(0)?);
        Ok(())
    }

    #[test]
    fn moduli() -> Result<(), Box<dyn StdError>> {
        let params = CkksParametersBuilder::new()
            .set_degree(8)
            .set_moduli(&[1153, 4611686018326724609])
            .build()?;
        assert_eq!(params.moduli(), &[1153, 4611686018326724609]);
        assert_eq!(params.moduli_sizes(), &[11, 62]);
        assert_eq!(params.special_prime(), 4611686018326724609);
        assert_eq!(params.max_level(), 0);

        let params = CkksParametersBuilder::new()
            .set_degree(8)
            .set_moduli_sizes(&[62, 62, 62, 61, 60, 11])
            .build()?;
        assert_eq!(params.moduli_sizes(), &[62, 62, 62, 61, 60, 11]);
        assert!(params.moduli().iter().all(|q| q % 16 == 1));
        Ok(())
    }

    #[test]
    fn builder_errors() {
        assert_eq!(
            CkksParametersBuilder::new()
                .set_degree(7)
                .set_moduli_sizes(&[60, 60])
                .build()
                .unwrap_err(),
            Error::ParametersError(ParametersError::InvalidDegree(7))
        );
        assert_eq!(
            CkksParametersBuilder::new()
                .set_degree(8)
                .set_moduli_sizes(&[60, 63])
                .build()
                .unwrap_err(),
            Error::ParametersError(ParametersError::InvalidModulusSize(63, 10, 62))
        );
        assert!(matches!(
            CkksParametersBuilder::new().set_degree(8).build(),
            Err(Error::ParametersError(ParametersError::TooFewSpecified(_)))
        ));
        assert!(matches!(
            CkksParametersBuilder::new()
                .set_degree(8)
                .set_moduli_sizes(&[60])
                .build(),
            Err(Error::ParametersError(ParametersError::TooFewSpecified(_)))
        ));
        assert!(matches!(
            CkksParametersBuilder::new()
                .set_degree(8)
                .set_moduli(&[1153, 1153])
                .build(),
            Err(Error::ParametersError(ParametersError::TooManySpecified(_)))
        ));
        assert!(matches!(
            CkksParametersBuilder::new()
                .set_degree(8)
                .set_moduli(&[1153, 4611686018326724609])
                .set_moduli_sizes(&[60, 60])
                .build(),
            Err(Error::ParametersError(ParametersError::TooManySpecified(_)))
        ));
    }

    #[test]
    fn serialize() -> Result<(), Box<dyn StdError>> {
        let params = CkksParametersBuilder::new()
            .set_degree(16)
            .set_moduli_sizes(&[60, 40, 60])
            .set_variance(4)
            .build()?;
        let bytes = params.to_bytes();
        assert_eq!(CkksParameters::try_deserialize(&bytes)?, params);

        assert_eq!(
            CkksParameters::try_deserialize(&[0xff, 0xff]),
            Err(Error::SerializationError)
        );

        let mut message = Parameters::decode(bytes.as_slice())?;
        message.scheme = 1;
        assert_eq!(
            CkksParameters::try_deserialize(&message.encode_to_vec()),
            Err(Error::ParametersError(ParametersError::UnsupportedScheme(1)))
        );
        Ok(())
    }
}
