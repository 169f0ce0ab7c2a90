//! Relinearization for the CKKS encryption scheme
//!
//! Key switching uses the special prime `P` that closes the modulus chain.
//! For every data prime `q_i` the key holds an encryption of `P * s²` that
//! only lives in row `i`, so that a ciphertext component `c₂` can be
//! decomposed into its RNS rows, multiplied by the key, and divided back by
//! `P` with rounding. The digits are bounded by `q_i` and the division by
//! `P` brings the added noise back to a few bits.

use crate::ckks::rns::select_rows;
use crate::ckks::{CkksParameters, Ciphertext, SecretKey};
use crate::{Error, Result};
use fhe_math::rq::{traits::TryConvertFrom, Poly, Representation};
use fhe_traits::FheParametrized;
use rand::{CryptoRng, RngCore};
use std::sync::Arc;
use zeroize::Zeroizing;

/// A relinearization key: a key switching key from `s²` to `s` over the full
/// modulus chain, special prime included.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct RelinearizationKey {
    pub(crate) par: Arc<CkksParameters>,
    /// First component of the key for each data prime.
    pub(crate) c0: Box<[Poly]>,
    /// Second component of the key for each data prime.
    pub(crate) c1: Box<[Poly]>,
}

impl RelinearizationKey {
    /// Generate a [`RelinearizationKey`] from a [`SecretKey`].
    pub fn new<R: RngCore + CryptoRng>(sk: &SecretKey, rng: &mut R) -> Result<Self> {
        let par = &sk.par;
        let ctx = par.ks_ctx_at_level(0)?;
        let s = sk.poly_ntt(ctx)?;
        let s2 = Zeroizing::new(s.as_ref() * s.as_ref());

        let mut c0 = Vec::with_capacity(par.ks_factors.len());
        let mut c1 = Vec::with_capacity(par.ks_factors.len());
        for factor in par.ks_factors.iter() {
            let a = Poly::random(ctx, Representation::Ntt, rng);
            let e = Zeroizing::new(Poly::small(ctx, Representation::Ntt, par.variance, rng)?);
            let mut b = &a * s.as_ref();
            b += e.as_ref();
            let mut b = -&b;
            b += &(factor * s2.as_ref());
            c0.push(b);
            c1.push(a);
        }

        Ok(Self {
            par: par.clone(),
            c0: c0.into_boxed_slice(),
            c1: c1.into_boxed_slice(),
        })
    }

    /// Relinearizes a three-part ciphertext in place.
    pub fn relinearizes(&self, ct: &mut Ciphertext) -> Result<()> {
        if ct.par != self.par {
            return Err(Error::ParametersMismatch);
        }
        if ct.c.len() != 3 {
            return Err(Error::DefaultError(
                "Only supports relinearization of ciphertext with 3 parts".to_string(),
            ));
        }

        let (c0, c1) = self.key_switch(&ct.c[2], ct.level)?;
        ct.c[0] += &c0;
        ct.c[1] += &c1;
        ct.c.truncate(2);
        Ok(())
    }

    /// Returns `(d₀, d₁)` such that `d₀ + d₁·s ≈ c₂·s²` over the context of
    /// `level`.
    pub(crate) fn key_switch(&self, c2: &Poly, level: usize) -> Result<(Poly, Poly)> {
        let ctx = self.par.ctx_at_level(level)?;
        let ks_ctx = self.par.ks_ctx_at_level(level)?;
        let data_count = ctx.moduli().len();
        let special_row = self.par.moduli().len() - 1;
        let rows = (0..data_count)
            .chain(std::iter::once(special_row))
            .collect::<Vec<_>>();

        let mut c2 = c2.clone();
        c2.change_representation(Representation::PowerBasis);
        let coefficients = c2.coefficients();

        let mut d0 = Poly::zero(ks_ctx, Representation::Ntt);
        let mut d1 = Poly::zero(ks_ctx, Representation::Ntt);
        for i in 0..data_count {
            let digit_row = coefficients.row(i);
            let digit = ks_ctx
                .moduli()
                .iter()
                .flat_map(|qj| digit_row.iter().map(move |c| c % qj))
                .collect::<Vec<u64>>();
            let mut digit =
                Poly::try_convert_from(digit, ks_ctx, false, Representation::PowerBasis)?;
            digit.change_representation(Representation::Ntt);

            let k0 = select_rows(&self.c0[i], &rows, ks_ctx, Representation::Ntt)?;
            let k1 = select_rows(&self.c1[i], &rows, ks_ctx, Representation::Ntt)?;
            d0 += &(&digit * &k0);
            d1 += &(&digit * &k1);
        }

        // Divide by the special prime, which is the last modulus of `ks_ctx`.
        for d in [&mut d0, &mut d1] {
            d.change_representation(Representation::PowerBasis);
            d.mod_switch_down_next()?;
            d.change_representation(Representation::Ntt);
        }
        Ok((d0, d1))
    }
}

impl FheParametrized for RelinearizationKey {
    type Parameters = CkksParameters;
}
