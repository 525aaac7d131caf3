//! Randomized svd.
//!
//! Range finder with power iterations as in *Finding structure with randomness*, Halko, Martinsson, Tropp 2011
//! (algorithms 4.4 and 5.1). Each power iteration is followed by a QR factorization to keep the
//! basis well conditioned.
//!
//! The small matrix B = Q^t · A is decomposed through a QR factorization of B^t so that no lapack call
//! sees a dimension larger than the sketch size on both sides.

use ndarray::{s, Array2, ArrayView2};
use ndarray_linalg::{QR, SVD};

use rand::Rng;
use rand_distr::StandardNormal;
use rand_xoshiro::rand_core::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

use super::SvdResult;
use crate::error::EmbedError;
use crate::tools::{to_float, EmbedScalar};

/// number of columns added to the rank in the random sketch
const OVERSAMPLING: usize = 10;

// orthonormal basis of the range of y
fn orthonormalize<F: EmbedScalar>(y: &Array2<F>) -> Result<Array2<F>, EmbedError> {
    let (q, _) = y.qr()?;
    Ok(q)
}

/// top rank singular triplets of mat, approximated with n_iter power iterations.
/// The gaussian test matrix is drawn from a generator seeded with seed so results are reproducible.
pub(crate) fn randomized_svd<F: EmbedScalar>(
    mat: &ArrayView2<F>,
    rank: usize,
    n_iter: usize,
    seed: u64,
) -> Result<SvdResult<F>, EmbedError> {
    let (nb_row, nb_col) = mat.dim();
    if nb_row < nb_col {
        // work on the transpose, left and right vectors are exchanged back
        log::debug!("randomized_svd : transposing ({}, {})", nb_row, nb_col);
        let (u, s, v) = randomized_svd(&mat.t(), rank, n_iter, seed)?.into_parts();
        return Ok(SvdResult::new(v, s, u));
    }
    let min_dim = nb_col;
    assert!(rank >= 1 && rank <= min_dim);
    let sketch_size = (rank + OVERSAMPLING).min(min_dim);
    log::debug!(
        "randomized_svd : dims ({}, {}), rank {}, sketch size {}, nb iter {}",
        nb_row,
        nb_col,
        rank,
        sketch_size,
        n_iter
    );
    //
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    let omega = Array2::<F>::from_shape_fn((nb_col, sketch_size), |_| {
        to_float::<F>(rng.sample::<f64, _>(StandardNormal))
    });
    let mut q = orthonormalize(&mat.dot(&omega))?;
    for iter in 0..n_iter {
        let z = orthonormalize(&mat.t().dot(&q))?;
        q = orthonormalize(&mat.dot(&z))?;
        log::trace!("randomized_svd : power iteration {} done", iter);
    }
    // B = Q^t A is sketch_size x nb_col. B^t = Q2 · R so B = R^t · Q2^t
    let bt: Array2<F> = mat.t().dot(&q);
    let (q2, r) = bt.qr()?;
    let (ub, sigma, vbt) = r.t().svd(true, true)?;
    let ub = ub.ok_or_else(|| EmbedError::Convergence("sketch svd did not return U".into()))?;
    let vbt = vbt.ok_or_else(|| EmbedError::Convergence("sketch svd did not return Vt".into()))?;
    //
    let u = q.dot(&ub.slice(s![.., ..rank]));
    let v = q2.dot(&vbt.slice(s![..rank, ..]).t());
    let s = sigma.slice(s![..rank]).to_owned();
    Ok(SvdResult::new(u, s, v))
} // end of randomized_svd

#[cfg(test)]
mod tests {

    use super::*;
    use crate::svd::full::full_svd;
    use crate::tools::matrix::check_orthonormal_columns;

    fn log_init_test() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    // matrix with singular values 2^-i
    fn decaying_matrix(nb_row: usize, nb_col: usize) -> Array2<f64> {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(4664397);
        let a: Array2<f64> = Array2::from_shape_fn((nb_row, nb_col), |_| rng.sample(StandardNormal));
        let (u, _, vt) = a.svd(true, true).unwrap();
        let (u, vt) = (u.unwrap(), vt.unwrap());
        let min_dim = nb_row.min(nb_col);
        let mut mat = Array2::<f64>::zeros((nb_row, nb_col));
        for i in 0..min_dim {
            let sigma = 2f64.powi(-(i as i32));
            let col = u.column(i).insert_axis(ndarray::Axis(1)).to_owned();
            let row = vt.row(i).insert_axis(ndarray::Axis(0)).to_owned();
            mat = mat + col.dot(&row) * sigma;
        }
        mat
    }

    #[test]
    fn randomized_matches_full() {
        log_init_test();
        let a = decaying_matrix(50, 30);
        let rank = 4;
        let rand_res = randomized_svd(&a.view(), rank, 5, 0).unwrap();
        let full = full_svd(&a.view(), rank).unwrap();
        for i in 0..rank {
            log::debug!("i {} randomized {:.6e} full {:.6e}", i, rand_res.get_s()[i], full.get_s()[i]);
            assert!((rand_res.get_s()[i] - full.get_s()[i]).abs() < 1.0E-8);
        }
        assert!(check_orthonormal_columns(&rand_res.get_u().view(), 1.0E-8).is_ok());
        assert!(check_orthonormal_columns(&rand_res.get_v().view(), 1.0E-8).is_ok());
    }

    #[test]
    fn randomized_wide_matrix() {
        log_init_test();
        let a = decaying_matrix(20, 45);
        let res = randomized_svd(&a.view(), 3, 5, 0).unwrap();
        assert_eq!(res.get_u().dim(), (20, 3));
        assert_eq!(res.get_v().dim(), (45, 3));
        // U · S · V^t close to the rank 3 truncation
        let approx = (res.get_u() * res.get_s()).dot(&res.get_v().t());
        let full = full_svd(&a.view(), 3).unwrap();
        let best = (full.get_u() * full.get_s()).dot(&full.get_v().t());
        let diff = (&approx - &best).mapv(|x| x * x).sum().sqrt();
        assert!(diff < 1.0E-6);
    }

    #[test]
    fn seed_fixes_result() {
        log_init_test();
        let a = decaying_matrix(30, 30);
        let r1 = randomized_svd(&a.view(), 2, 2, 17).unwrap();
        let r2 = randomized_svd(&a.view(), 2, 2, 17).unwrap();
        assert_eq!(r1.get_u(), r2.get_u());
        assert_eq!(r1.get_s(), r2.get_s());
    }
} // end of mod tests
