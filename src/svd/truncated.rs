//! Truncated svd by Golub-Kahan-Lanczos bidiagonalization with full reorthogonalization.
//!
//! Starting from a unit vector q_1 we build orthonormal bases P (left) and Q (right) and an upper bidiagonal
//! matrix B such that
//!   - A · Q_k = P_k · B_k
//!   - A^t · P_k = Q_k · B_k^t + beta_k · q_{k+1} · e_k^t
//!
//! The svd of the small matrix B_k = X · Σ · Y^t gives Ritz approximations U = P_k · X, V = Q_k · Y and the residual
//! of triplet i is beta_k · |X\[k-1, i\]|. If the rank first triplets are not converged the Krylov dimension is doubled.
//!
//! A Krylov space built from one vector sees one direction per distinct singular value. When the recursion
//! reaches an invariant subspace before the requested dimension (a null alpha or beta), it is restarted from a random
//! vector orthogonal to the current basis and the corresponding coefficient of B is set to 0.
//! So repeated singular values (disjoint identical blocks, bipartite graphs) are recovered with their multiplicity.
//!
//! A failure is reported as [EmbedError::Convergence], the caller then falls back to a full decomposition.

use ndarray::{s, Array1, Array2, ArrayView1, ArrayView2};
use ndarray_linalg::SVD;
use num_traits::float::Float;

use rand::Rng;
use rand_distr::StandardNormal;
use rand_xoshiro::rand_core::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

use super::SvdResult;
use crate::error::EmbedError;
use crate::tools::{to_float, EmbedScalar};

/// relative residual asked for each singular triplet
const CONVERGENCE_TOL: f64 = 1.0E-10;

/// under this norm (relative to the largest singular value estimate) a Krylov vector is considered null.
const INVARIANT_SUBSPACE_TOL: f64 = 1.0E-12;

/// a restart vector keeping less than this fraction of its norm after orthogonalization is rejected
const RESTART_TOL: f64 = 1.0E-8;

/// minimal Krylov dimension
const MIN_KRYLOV_DIM: usize = 20;

/// number of times the Krylov dimension can be doubled
const MAX_GROWTH: usize = 4;

// result of a bidiagonalization of length krylov_dim
struct Bidiagonalization<F> {
    p: Array2<F>,
    q: Array2<F>,
    // diagonal of B, a 0 marks a restart of the left recursion
    alphas: Vec<F>,
    // upper diagonal of B, a 0 marks a restart of the right recursion. The last one is the residual coefficient
    betas: Vec<F>,
    nb_restart: usize,
}

// orthogonalize w against the nb first columns of basis, twice to keep orthogonality
fn reorthogonalize<F: EmbedScalar>(w: &mut Array1<F>, basis: &Array2<F>, nb: usize) {
    if nb == 0 {
        return;
    }
    let basis = basis.slice(s![.., ..nb]);
    for _ in 0..2 {
        let coeffs = basis.t().dot(w);
        let proj = basis.dot(&coeffs);
        *w -= &proj;
    }
}

fn norm<F: EmbedScalar>(w: &ArrayView1<F>) -> F {
    Float::sqrt(w.dot(w))
}

fn gaussian_unit_vector<F: EmbedScalar>(rng: &mut Xoshiro256PlusPlus, dim: usize) -> Array1<F> {
    let v = Array1::<F>::from_shape_fn(dim, |_| to_float::<F>(rng.sample::<f64, _>(StandardNormal)));
    let v_norm = norm(&v.view());
    v / v_norm
}

// a random unit vector orthogonal to the nb first columns of basis, None if they span the whole space
fn restart_vector<F: EmbedScalar>(rng: &mut Xoshiro256PlusPlus, basis: &Array2<F>, nb: usize) -> Option<Array1<F>> {
    if nb >= basis.nrows() {
        return None;
    }
    let mut w = gaussian_unit_vector::<F>(rng, basis.nrows());
    reorthogonalize(&mut w, basis, nb);
    let w_norm = norm(&w.view());
    if w_norm <= to_float::<F>(RESTART_TOL) {
        return None;
    }
    Some(w / w_norm)
}

fn bidiagonalize<F: EmbedScalar>(
    mat: &ArrayView2<F>,
    start: &Array1<F>,
    krylov_dim: usize,
    rng: &mut Xoshiro256PlusPlus,
) -> Result<Bidiagonalization<F>, EmbedError> {
    let (nb_row, nb_col) = mat.dim();
    let mut p = Array2::<F>::zeros((nb_row, krylov_dim));
    let mut q = Array2::<F>::zeros((nb_col, krylov_dim + 1));
    let mut alphas = Vec::<F>::with_capacity(krylov_dim);
    let mut betas = Vec::<F>::with_capacity(krylov_dim);
    let mut nb_restart = 0;
    let mut scale = F::zero();
    let null_tol = to_float::<F>(INVARIANT_SUBSPACE_TOL);
    //
    q.column_mut(0).assign(start);
    for j in 0..krylov_dim {
        // p_j = A q_j - beta_{j-1} p_{j-1}
        let mut w = mat.dot(&q.column(j));
        if j > 0 {
            w.scaled_add(-betas[j - 1], &p.column(j - 1));
        }
        reorthogonalize(&mut w, &p, j);
        let alpha = norm(&w.view());
        scale = Float::max(scale, alpha);
        if alpha <= scale * null_tol {
            // A q_j lies in span(p_0..p_{j-1}), continue from a new left direction
            log::debug!("lanczos : invariant subspace at step {} (alpha), restarting", j);
            let restart = restart_vector::<F>(rng, &p, j)
                .ok_or_else(|| EmbedError::Convergence(format!("cannot restart left recursion at step {}", j)))?;
            p.column_mut(j).assign(&restart);
            alphas.push(F::zero());
            nb_restart += 1;
        } else {
            p.column_mut(j).assign(&(w / alpha));
            alphas.push(alpha);
        }
        // q_{j+1} = A^t p_j - alpha_j q_j
        let mut z = mat.t().dot(&p.column(j));
        z.scaled_add(-alphas[j], &q.column(j));
        reorthogonalize(&mut z, &q, j + 1);
        let beta = norm(&z.view());
        scale = Float::max(scale, beta);
        if j + 1 == krylov_dim {
            // residual coefficient, q_{k+1} is not needed
            betas.push(beta);
            break;
        }
        if beta <= scale * null_tol {
            log::debug!("lanczos : invariant subspace at step {} (beta), restarting", j);
            let restart = restart_vector::<F>(rng, &q, j + 1)
                .ok_or_else(|| EmbedError::Convergence(format!("cannot restart right recursion at step {}", j)))?;
            q.column_mut(j + 1).assign(&restart);
            betas.push(F::zero());
            nb_restart += 1;
        } else {
            q.column_mut(j + 1).assign(&(z / beta));
            betas.push(beta);
        }
    }
    Ok(Bidiagonalization {
        p,
        q,
        alphas,
        betas,
        nb_restart,
    })
} // end of bidiagonalize

/// top rank singular triplets of mat by Lanczos bidiagonalization.
/// Requires rank < min(nb_row, nb_col).
pub(crate) fn lanczos_svd<F: EmbedScalar>(
    mat: &ArrayView2<F>,
    rank: usize,
    seed: u64,
) -> Result<SvdResult<F>, EmbedError> {
    let (nb_row, nb_col) = mat.dim();
    let min_dim = nb_row.min(nb_col);
    assert!(rank >= 1 && rank < min_dim);
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    let start = gaussian_unit_vector::<F>(&mut rng, nb_col);
    //
    let mut krylov_dim = (2 * rank + 1).max(MIN_KRYLOV_DIM).min(min_dim);
    for growth in 0..=MAX_GROWTH {
        log::debug!("lanczos_svd : rank {}, krylov dimension {}", rank, krylov_dim);
        let bidiag = bidiagonalize(mat, &start, krylov_dim, &mut rng)?;
        let k = bidiag.alphas.len();
        if bidiag.nb_restart > 0 {
            log::debug!("lanczos_svd : {} restarts", bidiag.nb_restart);
        }
        // B is k x k upper bidiagonal
        let mut b = Array2::<F>::zeros((k, k));
        for j in 0..k {
            b[[j, j]] = bidiag.alphas[j];
            if j + 1 < k {
                b[[j, j + 1]] = bidiag.betas[j];
            }
        }
        let (x, sigma, yt) = b
            .svd(true, true)
            .map_err(|e| EmbedError::Convergence(format!("bidiagonal svd failed : {}", e)))?;
        let x = x.ok_or_else(|| EmbedError::Convergence("bidiagonal svd did not return U".into()))?;
        let yt = yt.ok_or_else(|| EmbedError::Convergence("bidiagonal svd did not return Vt".into()))?;
        // residuals
        let last_beta = bidiag.betas[k - 1];
        let tol = sigma[0] * to_float::<F>(CONVERGENCE_TOL);
        let nb_converged = (0..rank)
            .filter(|i| Float::abs(last_beta * x[[k - 1, *i]]) <= tol)
            .count();
        log::debug!("lanczos_svd : {} triplets converged out of {}", nb_converged, rank);
        if nb_converged == rank {
            let u = bidiag.p.dot(&x.slice(s![.., ..rank]));
            let v = bidiag.q.slice(s![.., ..k]).dot(&yt.slice(s![..rank, ..]).t());
            let s = sigma.slice(s![..rank]).to_owned();
            return Ok(SvdResult::new(u, s, v));
        }
        if krylov_dim == min_dim || growth == MAX_GROWTH {
            break;
        }
        krylov_dim = (2 * krylov_dim).min(min_dim);
    }
    Err(EmbedError::Convergence(format!(
        "lanczos did not converge for rank {} with krylov dimension {}",
        rank, krylov_dim
    )))
} // end of lanczos_svd

#[cfg(test)]
mod tests {

    use super::*;
    use crate::svd::full::full_svd;
    use crate::tools::matrix::check_orthonormal_columns;
    use ndarray::Array2;

    fn log_init_test() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    // nb_blocks disjoint complete graphs on block_size vertices
    fn disjoint_cliques(nb_blocks: usize, block_size: usize) -> Array2<f64> {
        let n = nb_blocks * block_size;
        Array2::from_shape_fn((n, n), |(i, j)| {
            if i != j && i / block_size == j / block_size {
                1.
            } else {
                0.
            }
        })
    }

    fn path_graph(n: usize) -> Array2<f64> {
        Array2::from_shape_fn((n, n), |(i, j)| if i + 1 == j || j + 1 == i { 1. } else { 0. })
    }

    // checks values against full svd and compares the spanned subspaces through their projectors
    fn check_against_full(a: &Array2<f64>, rank: usize, seed: u64) {
        let lanczos = lanczos_svd(&a.view(), rank, seed).unwrap();
        let full = full_svd(&a.view(), rank).unwrap();
        log::debug!("lanczos {:?} full {:?}", lanczos.get_s(), full.get_s());
        for i in 0..rank {
            assert!((lanczos.get_s()[i] - full.get_s()[i]).abs() < 1.0E-8 * full.get_s()[0]);
        }
        assert!(check_orthonormal_columns(&lanczos.get_u().view(), 1.0E-8).is_ok());
        assert!(check_orthonormal_columns(&lanczos.get_v().view(), 1.0E-8).is_ok());
        let p_lanczos = lanczos.get_u().dot(&lanczos.get_u().t());
        let p_full = full.get_u().dot(&full.get_u().t());
        assert!((&p_lanczos - &p_full).iter().all(|x| x.abs() < 1.0E-6));
    }

    #[test]
    fn lanczos_matches_full() {
        log_init_test();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(4664397);
        let a: Array2<f64> = Array2::from_shape_fn((60, 40), |_| rng.sample(StandardNormal));
        let rank = 5;
        let lanczos = lanczos_svd(&a.view(), rank, 0).unwrap();
        let full = full_svd(&a.view(), rank).unwrap();
        for i in 0..rank {
            log::debug!("i {} lanczos {:.6e} full {:.6e}", i, lanczos.get_s()[i], full.get_s()[i]);
            assert!((lanczos.get_s()[i] - full.get_s()[i]).abs() < 1.0E-8 * full.get_s()[0]);
        }
        assert!(check_orthonormal_columns(&lanczos.get_u().view(), 1.0E-8).is_ok());
        assert!(check_orthonormal_columns(&lanczos.get_v().view(), 1.0E-8).is_ok());
        // singular vectors are equal up to sign
        for i in 0..rank {
            let dot = lanczos.get_u().column(i).dot(&full.get_u().column(i));
            assert!((dot.abs() - 1.).abs() < 1.0E-6);
        }
    }

    #[test]
    fn lanczos_low_rank_exact() {
        log_init_test();
        // rank 2 matrix : the left Krylov space is exhausted after 2 steps
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(4664397);
        let x: Array2<f64> = Array2::from_shape_fn((30, 2), |_| rng.sample(StandardNormal));
        let a = x.dot(&x.t());
        let res = lanczos_svd(&a.view(), 2, 1).unwrap();
        let full = full_svd(&a.view(), 2).unwrap();
        assert!((res.get_s()[0] - full.get_s()[0]).abs() < 1.0E-8 * full.get_s()[0]);
        assert!((res.get_s()[1] - full.get_s()[1]).abs() < 1.0E-8 * full.get_s()[0]);
        // asking more than the rank restarts in the null space and gives a null value
        let res = lanczos_svd(&a.view(), 3, 1).unwrap();
        assert_eq!(res.rank(), 3);
        assert!(res.get_s()[2].abs() < 1.0E-8 * full.get_s()[0]);
        assert!(check_orthonormal_columns(&res.get_u().view(), 1.0E-8).is_ok());
    }

    #[test]
    fn repeated_values_of_disjoint_cliques() {
        log_init_test();
        // singular values 14, 14, 1, ...
        let a = disjoint_cliques(2, 15);
        for seed in 0..3 {
            check_against_full(&a, 2, seed);
        }
        let res = lanczos_svd(&a.view(), 2, 0).unwrap();
        assert!((res.get_s()[1] - 14.).abs() < 1.0E-8);
    }

    #[test]
    fn paired_values_of_path_graph() {
        log_init_test();
        // spectrum symmetric around 0, singular values come in pairs
        let a = path_graph(30);
        check_against_full(&a, 4, 0);
    }

    #[test]
    fn restart_vector_is_orthogonal() {
        log_init_test();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(17);
        let mut basis = Array2::<f64>::zeros((5, 3));
        basis[[0, 0]] = 1.;
        basis[[2, 1]] = 1.;
        basis[[4, 2]] = 1.;
        let w = restart_vector::<f64>(&mut rng, &basis, 3).unwrap();
        assert!((w.dot(&w) - 1.).abs() < 1.0E-12);
        assert!(basis.t().dot(&w).iter().all(|x| x.abs() < 1.0E-12));
        // a full basis leaves no direction
        let identity = Array2::<f64>::eye(4);
        assert!(restart_vector::<f64>(&mut rng, &identity, 4).is_none());
    }
} // end of mod tests
