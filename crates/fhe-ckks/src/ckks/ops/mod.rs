//! Operations over ciphertexts

mod mul;

pub use mul::multiply;

use crate::ckks::Ciphertext;
use crate::{Error, Result};
use itertools::{EitherOrBoth, Itertools};

/// Whether two scales are equal up to the relative precision of an `f64`.
pub fn scales_are_close(a: f64, b: f64) -> bool {
    let magnitude = a.abs().max(b.abs()).max(1.0);
    (a - b).abs() < f64::EPSILON * magnitude
}

/// Adds two ciphertexts at the same level and with close scales.
pub fn add(lhs: &Ciphertext, rhs: &Ciphertext) -> Result<Ciphertext> {
    if lhs.par != rhs.par {
        return Err(Error::ParametersMismatch);
    }
    if lhs.level != rhs.level {
        return Err(Error::LevelMismatch(lhs.level, rhs.level));
    }
    if !scales_are_close(lhs.scale, rhs.scale) {
        return Err(Error::ScaleMismatch(lhs.scale.to_string(), rhs.scale.to_string()));
    }

    let c = lhs
        .c
        .iter()
        .zip_longest(rhs.c.iter())
        .map(|pair| match pair {
            EitherOrBoth::Both(a, b) => a + b,
            EitherOrBoth::Left(a) => a.clone(),
            EitherOrBoth::Right(b) => b.clone(),
        })
        .collect_vec();
    Ciphertext::new(c, lhs.level, lhs.scale, &lhs.par)
}

#[cfg(test)]
mod tests {
    use super::{add, scales_are_close};
    use crate::ckks::{CkksParameters, Encoder, PublicKey, SecretKey};
    use crate::Error;
    use rand::thread_rng;
    use std::error::Error as StdError;

    #[test]
    fn close_scales() {
        assert!(scales_are_close(2f64.powi(40), 2f64.powi(40)));
        assert!(scales_are_close(0.5, 0.5 + f64::EPSILON / 4.0));
        assert!(!scales_are_close(2f64.powi(40), 2f64.powi(40) + 1.0));
        assert!(!scales_are_close(1.0, 2.0));
    }

    #[test]
    fn add_ciphertexts() -> Result<(), Box<dyn StdError>> {
        let mut rng = thread_rng();
        let params = CkksParameters::default_arc(4, 16);
        let sk = SecretKey::random(&params, &mut rng)?;
        let pk = PublicKey::new(&sk, &mut rng)?;
        let encoder = Encoder::new(&params);
        let scale = 2f64.powi(40);

        let a = [1.0, 2.5, -3.0];
        let b = [0.5, -1.0, 10.0];
        let ct_a = pk.try_encrypt(&encoder.encode(&a, scale, 0)?, &mut rng)?;
        let ct_b = pk.try_encrypt(&encoder.encode(&b, scale, 0)?, &mut rng)?;
        let sum = add(&ct_a, &ct_b)?;
        assert_eq!(sum.scale(), scale);
        let decoded = encoder.decode(&sk.try_decrypt(&sum)?)?;
        for i in 0..3 {
            assert!((decoded[i] - (a[i] + b[i])).abs() < 1e-6);
        }

        let mut other_scale = ct_b.clone();
        other_scale.set_scale(scale * 2.0);
        assert!(matches!(
            add(&ct_a, &other_scale),
            Err(Error::ScaleMismatch(_, _))
        ));

        let mut other_level = ct_b.clone();
        other_level.mod_switch_to_next_level()?;
        assert_eq!(
            add(&ct_a, &other_level).unwrap_err(),
            Error::LevelMismatch(0, 1)
        );
        Ok(())
    }
}
