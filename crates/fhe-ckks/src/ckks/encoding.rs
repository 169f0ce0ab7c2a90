//! Canonical embedding encoder for the CKKS encryption scheme.
//!
//! Slot `j` holds the evaluation of the plaintext polynomial at `ζ^(5^j)`,
//! where `ζ = exp(iπ/N)` is a primitive `2N`-th root of unity. Writing the
//! odd exponent as `2k + 1` turns the evaluation into a length-`N` DFT of
//! the coefficients twisted by `ζ^n`, which is what `rustfft` computes.

use crate::ckks::{CkksParameters, Plaintext};
use crate::{Error, Result};
use fhe_math::rq::{traits::TryConvertFrom, Poly, Representation};
use num_bigint::BigUint;
use num_traits::ToPrimitive;
use rustfft::{num_complex::Complex64, Fft, FftPlanner};
use std::f64::consts::PI;
use std::fmt::Debug;
use std::sync::Arc;

/// Largest magnitude of an encoded coefficient.
const MAX_COEFFICIENT: f64 = 4611686018427387904.0; // 2^62

/// Generator of the slot orbit.
const GALOIS_GENERATOR: usize = 5;

/// Encoder between real slot values and plaintexts.
pub struct Encoder {
    par: Arc<CkksParameters>,
    /// DFT index of each slot.
    slot_index: Box<[usize]>,
    /// DFT index of the conjugate of each slot.
    conjugate_index: Box<[usize]>,
    /// `ζ^n` for every coefficient index `n`.
    twist: Box<[Complex64]>,
    forward: Arc<dyn Fft<f64>>,
    inverse: Arc<dyn Fft<f64>>,
}

impl Debug for Encoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Encoder").field("par", &self.par).finish()
    }
}

impl Encoder {
    /// Creates an encoder for the given parameters.
    pub fn new(par: &Arc<CkksParameters>) -> Self {
        let n = par.degree();
        let m = 2 * n;

        let mut slot_index = Vec::with_capacity(n / 2);
        let mut conjugate_index = Vec::with_capacity(n / 2);
        let mut e = 1usize;
        for _ in 0..n / 2 {
            slot_index.push((e - 1) / 2);
            conjugate_index.push((m - e - 1) / 2);
            e = (e * GALOIS_GENERATOR) % m;
        }

        let twist = (0..n)
            .map(|i| Complex64::from_polar(1.0, PI * i as f64 / n as f64))
            .collect::<Vec<_>>();

        let mut planner = FftPlanner::<f64>::new();
        Self {
            par: par.clone(),
            slot_index: slot_index.into_boxed_slice(),
            conjugate_index: conjugate_index.into_boxed_slice(),
            twist: twist.into_boxed_slice(),
            forward: planner.plan_fft_forward(n),
            inverse: planner.plan_fft_inverse(n),
        }
    }

    /// Encodes up to `N/2` real values at the given scale and level. Missing
    /// slots are set to zero.
    pub fn encode(&self, values: &[f64], scale: f64, level: usize) -> Result<Plaintext> {
        let slots = self.par.slots();
        if values.len() > slots {
            return Err(Error::TooManyValues(values.len(), slots));
        }

        let n = self.par.degree();
        let mut buffer = vec![Complex64::new(0.0, 0.0); n];
        for (j, v) in values.iter().enumerate() {
            // The conjugate of a real value is itself.
            buffer[self.slot_index[j]] = Complex64::new(*v, 0.0);
            buffer[self.conjugate_index[j]] = Complex64::new(*v, 0.0);
        }
        self.forward.process(&mut buffer);

        let coefficients = buffer
            .iter()
            .zip(self.twist.iter())
            .map(|(a, t)| (*a * t.conj()).re / n as f64);
        self.plaintext_from_coefficients(coefficients, scale, level)
    }

    /// Encodes a single value in every slot as a constant polynomial.
    pub fn encode_scalar(&self, value: f64, scale: f64, level: usize) -> Result<Plaintext> {
        let coefficients =
            std::iter::once(value).chain(std::iter::repeat(0.0).take(self.par.degree() - 1));
        self.plaintext_from_coefficients(coefficients, scale, level)
    }

    /// Decodes a plaintext into its `N/2` real slot values.
    pub fn decode(&self, pt: &Plaintext) -> Result<Vec<f64>> {
        if pt.par != self.par {
            return Err(Error::ParametersMismatch);
        }

        let mut p = pt.poly_ntt.clone();
        p.change_representation(Representation::PowerBasis);
        let q = p.ctx().modulus().clone();
        let half_q: BigUint = &q >> 1usize;

        let mut buffer = Vec::<BigUint>::from(&p)
            .iter()
            .zip(self.twist.iter())
            .map(|(c, t)| {
                let centered = if c > &half_q {
                    -(&q - c).to_f64().unwrap_or(f64::INFINITY)
                } else {
                    c.to_f64().unwrap_or(f64::INFINITY)
                };
                *t * (centered / pt.scale)
            })
            .collect::<Vec<_>>();
        self.inverse.process(&mut buffer);

        Ok(self.slot_index.iter().map(|&k| buffer[k].re).collect())
    }

    fn plaintext_from_coefficients<I: Iterator<Item = f64>>(
        &self,
        coefficients: I,
        scale: f64,
        level: usize,
    ) -> Result<Plaintext> {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(Error::EncodingError(format!("Invalid scale {scale}")));
        }
        let ctx = self.par.ctx_at_level(level)?;
        let bound = ctx
            .modulus()
            .to_f64()
            .map_or(MAX_COEFFICIENT, |q| (q / 2.0).min(MAX_COEFFICIENT));

        let scaled = coefficients
            .map(|c| {
                let x = (c * scale).round();
                if x.is_finite() && x.abs() < bound {
                    Ok(x as i64)
                } else {
                    Err(Error::EncodingError(format!(
                        "Scaled coefficient {x} does not fit the modulus"
                    )))
                }
            })
            .collect::<Result<Vec<i64>>>()?;

        let mut poly_ntt = Poly::try_convert_from(
            scaled.as_slice(),
            ctx,
            false,
            Representation::PowerBasis,
        )?;
        poly_ntt.change_representation(Representation::Ntt);

        Ok(Plaintext {
            par: self.par.clone(),
            poly_ntt,
            scale,
            level,
        })
    }
}
