//! Traits used for the CKKS homomorphic encryption scheme.

use crate::ckks::CkksParameters;
use crate::Result;
use std::sync::Arc;

/// Conversions.
///
/// `TryFrom` cannot carry the parameters a conversion is bound to, so this
/// trait takes them explicitly.
pub trait TryConvertFrom<T>
where
    Self: Sized,
{
    /// Attempt to convert the `value` with a specific parameter.
    fn try_convert_from(value: T, par: &Arc<CkksParameters>) -> Result<Self>;
}
