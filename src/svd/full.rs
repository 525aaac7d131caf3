//! Exact decomposition through lapack (gesvd) via ndarray-linalg.

use ndarray::{s, Array1, ArrayView2};
use ndarray_linalg::SVD;

use super::SvdResult;
use crate::error::EmbedError;
use crate::tools::EmbedScalar;

/// full svd of mat, truncated to the rank first singular triplets.
pub(crate) fn full_svd<F: EmbedScalar>(mat: &ArrayView2<F>, rank: usize) -> Result<SvdResult<F>, EmbedError> {
    let (nb_row, nb_col) = mat.dim();
    log::debug!("full_svd : dims ({}, {}), rank {}", nb_row, nb_col, rank);
    assert!(rank <= nb_row.min(nb_col));
    //
    let (u, s, vt) = mat
        .svd(true, true)
        .map_err(|e| EmbedError::Convergence(format!("full svd failed : {}", e)))?;
    let u = u.ok_or_else(|| EmbedError::Convergence("full svd did not return U".into()))?;
    let vt = vt.ok_or_else(|| EmbedError::Convergence("full svd did not return Vt".into()))?;
    //
    Ok(SvdResult::new(
        u.slice(s![.., ..rank]).to_owned(),
        s.slice(s![..rank]).to_owned(),
        vt.slice(s![..rank, ..]).t().to_owned(),
    ))
} // end of full_svd

/// all singular values of mat in decreasing order
pub(crate) fn singular_values<F: EmbedScalar>(mat: &ArrayView2<F>) -> Result<Array1<F>, EmbedError> {
    let (_, s, _) = mat
        .svd(false, false)
        .map_err(|e| EmbedError::Convergence(format!("singular values computation failed : {}", e)))?;
    Ok(s)
} // end of singular_values

// end of mod tests
