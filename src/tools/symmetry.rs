//! symmetry checks on square matrices. A graph is considered undirected if its adjacency matrix
//! is symmetric up to a small absolute tolerance.

use ndarray::ArrayView2;
use num_traits::float::Float;

use super::{to_float, EmbedScalar};

/// absolute tolerance on |a_ij - a_ji| for a matrix to be considered symmetric.
pub const SYMMETRY_TOLERANCE: f64 = 1.0E-10;

/// returns true if mat is square and max |mat\[i,j\] - mat\[j,i\]| <= tol
pub fn is_almost_symmetric_tol<F: EmbedScalar>(mat: &ArrayView2<F>, tol: F) -> bool {
    let (nb_row, nb_col) = mat.dim();
    if nb_row != nb_col {
        return false;
    }
    for i in 0..nb_row {
        for j in 0..i {
            if !(Float::abs(mat[[i, j]] - mat[[j, i]]) <= tol) {
                return false;
            }
        }
    }
    true
} // end of is_almost_symmetric_tol

/// symmetry up to [SYMMETRY_TOLERANCE]
pub fn is_almost_symmetric<F: EmbedScalar>(mat: &ArrayView2<F>) -> bool {
    is_almost_symmetric_tol(mat, to_float::<F>(SYMMETRY_TOLERANCE))
}

/// exact symmetry, required for precomputed dissimilarities
pub fn is_symmetric<F: EmbedScalar>(mat: &ArrayView2<F>) -> bool {
    is_almost_symmetric_tol(mat, F::zero())
}

// end of mod tests
