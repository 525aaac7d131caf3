//! Dense matrix helpers : column block stacking, singular vectors scaling and sign normalization,
//! orthonormality check.

use log::log_enabled;

use ndarray::{s, Array2, ArrayView1, ArrayView2, Axis};
use num_traits::float::Float;

use super::EmbedScalar;
use crate::error::EmbedError;

/// Stacks blocks side by side in a pre-allocated (nb_rows, sum of blocks columns) matrix.
/// All blocks must have the same number of rows.
pub fn stack_column_blocks<F: EmbedScalar>(blocks: &[ArrayView2<F>]) -> Result<Array2<F>, EmbedError> {
    if blocks.is_empty() {
        return Err(EmbedError::InvalidInput("no block to stack".into()));
    }
    let nb_rows = blocks[0].nrows();
    if let Some(bad) = blocks.iter().position(|b| b.nrows() != nb_rows) {
        return Err(EmbedError::InvalidInput(format!(
            "block {} has {} rows, expected {}",
            bad,
            blocks[bad].nrows(),
            nb_rows
        )));
    }
    let nb_cols = blocks.iter().map(|b| b.ncols()).sum::<usize>();
    let mut stacked = Array2::<F>::zeros((nb_rows, nb_cols));
    let mut first_col = 0;
    for block in blocks {
        let last_col = first_col + block.ncols();
        stacked.slice_mut(s![.., first_col..last_col]).assign(block);
        first_col = last_col;
    }
    log::trace!("stack_column_blocks : stacked dims ({}, {})", nb_rows, nb_cols);
    Ok(stacked)
} // end of stack_column_blocks

/// returns vectors · diag(sqrt(values)).
/// The number of columns of vectors must be the length of values.
pub fn sqrt_scaled<F: EmbedScalar>(vectors: &ArrayView2<F>, values: &ArrayView1<F>) -> Array2<F> {
    assert_eq!(vectors.ncols(), values.len());
    let sqrt_values = values.mapv(|v| Float::sqrt(Float::max(v, F::zero())));
    vectors * &sqrt_values
} // end of sqrt_scaled

/// Makes the singular triplets deterministic up to numerical noise : for each column j, the entry of largest
/// magnitude of u\[.., j\] is made positive and v\[.., j\] is flipped accordingly so u · diag(s) · v^t is unchanged.
pub fn flip_signs<F: EmbedScalar>(u: &mut Array2<F>, v: &mut Array2<F>) {
    assert_eq!(u.ncols(), v.ncols());
    for j in 0..u.ncols() {
        let mut col = u.column_mut(j);
        let mut max_abs = F::zero();
        let mut sign_neg = false;
        for x in col.iter() {
            if Float::abs(*x) > max_abs {
                max_abs = Float::abs(*x);
                sign_neg = *x < F::zero();
            }
        }
        if sign_neg {
            col.mapv_inplace(|x| -x);
            v.column_mut(j).mapv_inplace(|x| -x);
        }
    }
} // end of flip_signs

/// Checks that u^t · u is the identity up to epsil. In case of failure returns the position of
/// the first coefficient out of tolerance.
pub fn check_orthonormal_columns<F: EmbedScalar>(u: &ArrayView2<F>, epsil: f64) -> Result<(), (usize, usize)> {
    let id: Array2<F> = u.t().dot(u);
    let n = id.dim().0;
    for i in 0..n {
        let diag = id[[i, i]].to_f64().unwrap_or(f64::NAN);
        if !((1. - diag).abs() <= epsil) {
            log::error!("check_orthonormal_columns failed at ({},{}) : {:.3e}", i, i, diag);
            return Err((i, i));
        }
        for j in 0..i {
            let off = id[[i, j]].to_f64().unwrap_or(f64::NAN);
            if !(off.abs() <= epsil) {
                log::error!("check_orthonormal_columns failed at ({},{}) : {:.3e}", i, j, off);
                return Err((i, j));
            }
        }
    }
    Ok(())
} // end of check_orthonormal_columns

/// true if all entries are finite
pub fn all_finite<F: EmbedScalar>(mat: &ArrayView2<F>) -> bool {
    mat.iter().all(|x| Float::is_finite(*x))
}

/// Frobenius norm of a matrix
pub fn frobenius_norm<F: EmbedScalar>(mat: &ArrayView2<F>) -> F {
    let sum = mat.iter().fold(F::zero(), |acc, x| acc + *x * *x);
    Float::sqrt(sum)
}

// debug utility for small matrices
#[allow(unused)]
pub(crate) fn dump<F: EmbedScalar>(a: &ArrayView2<F>) {
    if !log_enabled!(log::Level::Trace) {
        return;
    }
    for row in a.axis_iter(Axis(0)) {
        let line: Vec<String> = row.iter().map(|x| format!("{:.3e}", x)).collect();
        log::trace!("{}", line.join(" "));
    }
} // end of dump

// end of mod tests
