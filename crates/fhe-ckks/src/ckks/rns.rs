//! Row-level helpers on RNS polynomials.
//!
//! A polynomial in Ntt or PowerBasis representation stores one row of
//! coefficients per modulus, so dropping or selecting moduli amounts to
//! copying rows into a polynomial over the matching context.

use crate::{Error, Result};
use fhe_math::rq::{traits::TryConvertFrom, Context, Poly, Representation};
use std::sync::Arc;

/// Copies the rows `rows` of `poly` into a polynomial over `ctx`.
///
/// The i-th selected row must be reduced modulo the i-th modulus of `ctx`.
pub(crate) fn select_rows(
    poly: &Poly,
    rows: &[usize],
    ctx: &Arc<Context>,
    representation: Representation,
) -> Result<Poly> {
    if rows.len() != ctx.moduli().len() {
        return Err(Error::DefaultError(format!(
            "Selecting {} rows into a context with {} moduli",
            rows.len(),
            ctx.moduli().len()
        )));
    }
    let coefficients = poly.coefficients();
    let mut flat = Vec::with_capacity(rows.len() * coefficients.ncols());
    for (&row, &qi) in rows.iter().zip(ctx.moduli()) {
        if row >= coefficients.nrows() || poly.ctx().moduli()[row] != qi {
            return Err(Error::DefaultError(format!(
                "Row {row} does not match modulus {qi}"
            )));
        }
        flat.extend(coefficients.row(row).iter());
    }
    Ok(Poly::try_convert_from(flat, ctx, false, representation)?)
}

/// Keeps the first `ctx.moduli().len()` rows of `poly`.
pub(crate) fn truncate(
    poly: &Poly,
    ctx: &Arc<Context>,
    representation: Representation,
) -> Result<Poly> {
    let rows = (0..ctx.moduli().len()).collect::<Vec<_>>();
    select_rows(poly, &rows, ctx, representation)
}

/// Little-endian bytes of the coefficients, row after row.
pub(crate) fn poly_to_bytes(poly: &Poly) -> Vec<u8> {
    poly.coefficients()
        .iter()
        .flat_map(|c| c.to_le_bytes())
        .collect()
}

/// Parses a polynomial written by [`poly_to_bytes`], rejecting any
/// coefficient that is not reduced modulo its row's modulus.
pub(crate) fn poly_from_bytes(
    bytes: &[u8],
    degree: usize,
    ctx: &Arc<Context>,
    representation: Representation,
) -> Result<Poly> {
    let moduli = ctx.moduli();
    if bytes.len() != 8 * degree * moduli.len() {
        return Err(Error::SerializationError);
    }
    let flat = bytes
        .chunks_exact(8)
        .enumerate()
        .map(|(i, chunk)| {
            let mut word = [0u8; 8];
            word.copy_from_slice(chunk);
            let c = u64::from_le_bytes(word);
            if c < moduli[i / degree] {
                Ok(c)
            } else {
                Err(Error::SerializationError)
            }
        })
        .collect::<Result<Vec<u64>>>()?;
    Ok(Poly::try_convert_from(flat, ctx, false, representation)?)
}
