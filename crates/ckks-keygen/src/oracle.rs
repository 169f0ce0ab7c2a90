//! Correctness check of a key bundle.
//!
//! The check evaluates `2.3 * 4.5 + 4.5` homomorphically: both operands are
//! encrypted under the public key, multiplied, relinearized and rescaled, the
//! second operand is switched to the level of the product, and the sum is
//! decrypted with the secret key. A working bundle yields about `14.85`.

use crate::engine::Engine;
use crate::{AcceptanceRule, Error, Result};
use rand::{CryptoRng, RngCore};
use std::fmt::Display;
use std::sync::Arc;

/// Left operand of the product.
pub const FIRST_OPERAND: f64 = 2.3;

/// Right operand of the product, added again to the product.
pub const SECOND_OPERAND: f64 = 4.5;

/// Value of `FIRST_OPERAND * SECOND_OPERAND + SECOND_OPERAND`.
pub const EXPECTED_RESULT: f64 = 14.85;

/// Default accepted deviation from [`EXPECTED_RESULT`].
pub const DEFAULT_TOLERANCE: f64 = 0.1;

/// Runs the check computation and returns the first decoded slot.
pub fn verify<E: Engine, R: RngCore + CryptoRng>(
    engine: &E,
    pk: &E::PublicKey,
    sk: &E::SecretKey,
    ctx: &Arc<E::Parameters>,
    scale: f64,
    rk: &E::RelinKeys,
    rng: &mut R,
) -> Result<f64> {
    let pt1 = engine
        .encode(FIRST_OPERAND, scale, ctx)
        .map_err(Error::engine)?;
    let pt2 = engine
        .encode(SECOND_OPERAND, scale, ctx)
        .map_err(Error::engine)?;
    let c1 = engine.encrypt(&pt1, pk, rng).map_err(Error::engine)?;
    let mut c2 = engine.encrypt(&pt2, pk, rng).map_err(Error::engine)?;

    let mut product = engine.multiply(&c1, &c2).map_err(Error::engine)?;
    engine
        .relinearize(&mut product, rk)
        .map_err(Error::engine)?;
    engine.rescale(&mut product).map_err(Error::engine)?;

    let parms_id = engine.parms_id(&product);
    engine
        .mod_switch_to(&mut c2, &parms_id)
        .map_err(Error::engine)?;
    engine.set_scale(&mut product, scale);
    engine.set_scale(&mut c2, scale);

    let sum = engine.add(&product, &c2).map_err(Error::engine)?;
    let decrypted = engine.decrypt(&sum, sk).map_err(Error::engine)?;
    let slots = engine.decode(&decrypted).map_err(Error::engine)?;
    slots
        .first()
        .copied()
        .ok_or_else(|| Error::Engine("Decoding produced no slot".to_string()))
}

/// Outcome of a correctness check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OracleReport {
    /// The decrypted result.
    pub value: f64,
    /// The expected result.
    pub expected: f64,
    /// The accepted deviation.
    pub tolerance: f64,
    /// The rule deciding acceptance.
    pub rule: AcceptanceRule,
}

impl OracleReport {
    /// Signed deviation of the value from the expected result.
    pub fn deviation(&self) -> f64 {
        self.value - self.expected
    }

    /// Whether the rule accepts the value.
    pub fn passed(&self) -> bool {
        self.rule.accepts(self.value, self.expected, self.tolerance)
    }
}

impl Display for OracleReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "got {:.6}, expected {} within {} ({} rule, deviation {:+.3e})",
            self.value,
            self.expected,
            self.tolerance,
            self.rule,
            self.deviation()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::{verify, OracleReport, EXPECTED_RESULT, FIRST_OPERAND, SECOND_OPERAND};
    use crate::engine::{CkksEngine, Engine};
    use crate::AcceptanceRule;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::error::Error as StdError;

    #[test]
    fn expected_constant() {
        let exact = FIRST_OPERAND * SECOND_OPERAND + SECOND_OPERAND;
        assert!((exact - EXPECTED_RESULT).abs() < 1e-12);
    }

    #[test]
    fn verify_fresh_keys() -> Result<(), Box<dyn StdError>> {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let engine = CkksEngine;
        let ctx = engine.create_context(engine.build_parameters(1024, &[60, 40, 40, 60])?);
        let sk = engine.generate_secret_key(&ctx, &mut rng)?;
        let pk = engine.derive_public_key(&ctx, &sk, &mut rng)?;
        let rk = engine.derive_relin_keys(&ctx, &sk, &mut rng)?;
        let value = verify(&engine, &pk, &sk, &ctx, 2f64.powi(40), &rk, &mut rng)?;
        assert!((value - EXPECTED_RESULT).abs() < 1e-3, "{value}");
        Ok(())
    }

    #[test]
    fn verify_is_stable_across_runs() -> Result<(), Box<dyn StdError>> {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let engine = CkksEngine;
        let ctx = engine.create_context(engine.build_parameters(1024, &[60, 40, 40, 60])?);
        let sk = engine.generate_secret_key(&ctx, &mut rng)?;
        let pk = engine.derive_public_key(&ctx, &sk, &mut rng)?;
        let rk = engine.derive_relin_keys(&ctx, &sk, &mut rng)?;
        let scale = 2f64.powi(40);
        let a = verify(&engine, &pk, &sk, &ctx, scale, &rk, &mut rng)?;
        let b = verify(&engine, &pk, &sk, &ctx, scale, &rk, &mut rng)?;
        assert!((a - b).abs() < 1e-3, "{a} != {b}");
        Ok(())
    }

    #[test]
    fn verify_with_foreign_secret_key() -> Result<(), Box<dyn StdError>> {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let engine = CkksEngine;
        let ctx = engine.create_context(engine.build_parameters(1024, &[60, 40, 40, 60])?);
        let sk = engine.generate_secret_key(&ctx, &mut rng)?;
        let pk = engine.derive_public_key(&ctx, &sk, &mut rng)?;
        let rk = engine.derive_relin_keys(&ctx, &sk, &mut rng)?;
        let other = engine.generate_secret_key(&ctx, &mut rng)?;
        let value = verify(&engine, &pk, &other, &ctx, 2f64.powi(40), &rk, &mut rng)?;
        let report = OracleReport {
            value,
            expected: EXPECTED_RESULT,
            tolerance: 0.1,
            rule: AcceptanceRule::Symmetric,
        };
        assert!(!report.passed(), "{report}");
        Ok(())
    }

    #[test]
    fn report() {
        let mut report = OracleReport {
            value: 14.86,
            expected: EXPECTED_RESULT,
            tolerance: 0.1,
            rule: AcceptanceRule::Symmetric,
        };
        assert!(report.passed());
        assert!((report.deviation() - 0.01).abs() < 1e-9);
        assert!(report.to_string().starts_with("got 14.860000, expected 14.85 within 0.1"));

        report.value = 3.0;
        assert!(!report.passed());
        report.rule = AcceptanceRule::OvershootOnly;
        assert!(report.passed());
        report.value = 15.0;
        assert!(!report.passed());
    }
}
