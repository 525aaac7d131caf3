//! numeric utilities shared by solvers and embedders.

use ndarray::ScalarOperand;
use ndarray_linalg::{Lapack, Scalar};
use num_traits::cast::FromPrimitive;
use num_traits::float::Float;

pub mod connectivity;
pub mod matrix;
pub mod orderingf;
pub mod symmetry;

/// The scalar type of embedded data : f32 or f64.  
/// Gathers the constraints needed by lapack kernels (Scalar + Lapack), ndarray (ScalarOperand),
/// floats (Float) and the rayon parallel first stage of Mase (Send + Sync).
pub trait EmbedScalar:
    Float + Scalar<Real = Self> + Lapack + ScalarOperand + FromPrimitive + Default + Send + Sync + 'static
{
}

impl<F> EmbedScalar for F where
    F: Float + Scalar<Real = F> + Lapack + ScalarOperand + FromPrimitive + Default + Send + Sync + 'static
{
}

/// conversion of a f64 constant to F. Never fails for f32 and f64.
pub(crate) fn to_float<F: EmbedScalar>(x: f64) -> F {
    F::from_f64(x).unwrap_or_else(F::nan)
}
