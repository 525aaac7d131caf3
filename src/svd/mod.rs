//! Singular value decomposition front end.
//!
//! [select_svd] chooses the rank (given or found by elbow detection), dispatches to one of the solvers
//! and normalizes the signs of the singular vectors so that results are reproducible.

use ndarray::{Array1, Array2, ArrayView2, Axis};

use crate::dimselect::select_dimension_from_matrix;
use crate::error::EmbedError;
use crate::tools::matrix::{all_finite, flip_signs};
use crate::tools::orderingf::{is_non_increasing, sort_decreasing};
use crate::tools::EmbedScalar;

pub(crate) mod full;
pub mod params;
pub(crate) mod randomized;
pub(crate) mod truncated;

use params::{SvdAlgorithm, SvdParams};

/// The rank first singular triplets of a (nb_row, nb_col) matrix.
/// u is (nb_row, rank), s has length rank and is non increasing, v is (nb_col, rank).
#[derive(Debug, Clone)]
pub struct SvdResult<F> {
    u: Array2<F>,
    s: Array1<F>,
    v: Array2<F>,
}

impl<F> SvdResult<F> {
    pub(crate) fn new(u: Array2<F>, s: Array1<F>, v: Array2<F>) -> Self {
        assert_eq!(u.ncols(), s.len());
        assert_eq!(v.ncols(), s.len());
        SvdResult { u, s, v }
    }

    /// left singular vectors
    pub fn get_u(&self) -> &Array2<F> {
        &self.u
    }

    /// singular values, in decreasing order
    pub fn get_s(&self) -> &Array1<F> {
        &self.s
    }

    /// right singular vectors (not transposed)
    pub fn get_v(&self) -> &Array2<F> {
        &self.v
    }

    pub fn rank(&self) -> usize {
        self.s.len()
    }

    pub fn into_parts(self) -> (Array2<F>, Array1<F>, Array2<F>) {
        (self.u, self.s, self.v)
    }
} // end of impl SvdResult

/// Decomposes mat as described by params.
///
/// If params has no n_components the rank is the last elbow of the singular values of mat
/// (this costs a full decomposition). Errors:
/// - [EmbedError::InvalidInput] if mat is empty or has non finite entries.
/// - [EmbedError::InvalidRank] if the rank is larger than min(nb_row, nb_col).
pub fn select_svd<F: EmbedScalar>(mat: &ArrayView2<F>, params: &SvdParams) -> Result<SvdResult<F>, EmbedError> {
    let (nb_row, nb_col) = mat.dim();
    if nb_row == 0 || nb_col == 0 {
        return Err(EmbedError::InvalidInput(format!(
            "cannot decompose a matrix of dims ({}, {})",
            nb_row, nb_col
        )));
    }
    if !all_finite(mat) {
        return Err(EmbedError::InvalidInput("matrix has non finite entries".into()));
    }
    let min_dim = nb_row.min(nb_col);
    let rank = match params.get_n_components() {
        Some(rank) => rank,
        None => {
            let elbows = select_dimension_from_matrix(mat, params.get_n_elbows())?;
            log::info!("select_svd : elbows {:?}", elbows.elbows);
            elbows
                .last_elbow()
                .ok_or_else(|| EmbedError::InvalidInput("no elbow found in spectrum".into()))?
        }
    };
    if rank == 0 || rank > min_dim {
        return Err(EmbedError::InvalidRank {
            rank,
            reason: format!("must be in [1, {}] for a matrix of dims ({}, {})", min_dim, nb_row, nb_col),
        });
    }
    //
    log::debug!(
        "select_svd : dims ({}, {}), rank {}, algorithm {:?}",
        nb_row,
        nb_col,
        rank,
        params.get_algorithm()
    );
    let res = match params.get_algorithm() {
        SvdAlgorithm::Full => full::full_svd(mat, rank)?,
        SvdAlgorithm::Truncated => {
            if rank + 1 >= min_dim {
                log::debug!("select_svd : rank {} too close to dimension {}, using full svd", rank, min_dim);
                full::full_svd(mat, rank)?
            } else {
                full_on_convergence_failure(mat, rank, truncated::lanczos_svd(mat, rank, params.get_seed()))?
            }
        }
        SvdAlgorithm::Randomized => {
            if rank == min_dim {
                full::full_svd(mat, rank)?
            } else {
                randomized::randomized_svd(mat, rank, params.get_n_iter(), params.get_seed())?
            }
        }
    };
    let (u, s, v) = res.into_parts();
    // lapack returns sorted values, sketches may permute nearly equal ones
    let (s, mut u, mut v) = if is_non_increasing(s.as_slice().unwrap_or(&[])) {
        (s, u, v)
    } else {
        let perm = sort_decreasing(&s.to_vec()).1;
        let s = Array1::from_iter(perm.iter().map(|i| s[*i]));
        (s, u.select(Axis(1), &perm), v.select(Axis(1), &perm))
    };
    flip_signs(&mut u, &mut v);
    Ok(SvdResult::new(u, s, v))
} // end of select_svd

// a solver convergence failure is replaced by a full decomposition, other errors are propagated
fn full_on_convergence_failure<F: EmbedScalar>(
    mat: &ArrayView2<F>,
    rank: usize,
    res: Result<SvdResult<F>, EmbedError>,
) -> Result<SvdResult<F>, EmbedError> {
    match res {
        Err(EmbedError::Convergence(msg)) => {
            log::warn!("select_svd : truncated svd failed ({}), falling back to full svd", msg);
            full::full_svd(mat, rank)
        }
        res => res,
    }
} // end of full_on_convergence_failure

//========================================================================================

// end of mod tests
