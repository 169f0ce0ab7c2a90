use crate::ckks::Ciphertext;
use crate::{Error, Result};

/// Multiplies two two-part ciphertexts at the same level. The result has
/// three parts and its scale is the product of the scales; it must be
/// relinearized before further multiplications.
pub fn multiply(lhs: &Ciphertext, rhs: &Ciphertext) -> Result<Ciphertext> {
    if lhs.par != rhs.par {
        return Err(Error::ParametersMismatch);
    }
    if lhs.level != rhs.level {
        return Err(Error::LevelMismatch(lhs.level, rhs.level));
    }
    if lhs.c.len() != 2 || rhs.c.len() != 2 {
        return Err(Error::DefaultError(
            "Multiplication can only be performed on ciphertexts of size 2".to_string(),
        ));
    }

    let scale = lhs.scale * rhs.scale;
    let modulus_bits = lhs.par.ctx_at_level(lhs.level)?.modulus().bits() as usize;
    let scale_bits = scale.log2();
    if !scale_bits.is_finite() || scale_bits >= modulus_bits as f64 {
        return Err(Error::ScaleOutOfBounds(format!("{scale_bits:.2}"), modulus_bits));
    }

    let c0 = &lhs.c[0] * &rhs.c[0];
    let mut c1 = &lhs.c[0] * &rhs.c[1];
    c1 += &(&lhs.c[1] * &rhs.c[0]);
    let c2 = &lhs.c[1] * &rhs.c[1];

    Ciphertext::new(vec![c0, c1, c2], lhs.level, scale, &lhs.par)
}
