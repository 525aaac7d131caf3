//! Adjacency spectral embedding of one graph.
//!
//! With A = U · Σ · V^t the rank d truncated svd of the adjacency matrix, latent positions are
//! X = U · Σ^(1/2) for nodes as sources and Y = V · Σ^(1/2) for nodes as targets, so that A ≈ X · Y^t.
//! If A is symmetric (up to [SYMMETRY_TOLERANCE](crate::tools::symmetry::SYMMETRY_TOLERANCE)) only X is kept.
//!
//! Reference : *A consistent adjacency spectral embedding for stochastic blockmodel graphs*,
//! D. Sussman, M. Tang, D. Fishkind, C. Priebe. JASA 2012.

use ndarray::{Array1, Array2, ArrayView2};
use serde::{Deserialize, Serialize};

use std::time::SystemTime;
use cpu_time::ProcessTime;

use crate::embedding::{Estimator, EmbedderT, FittedT, LatentPositions};
use crate::error::EmbedError;
use crate::svd::params::{SvdAlgorithm, SvdParams};
use crate::svd::select_svd;
use crate::tools::connectivity::warn_if_disconnected;
use crate::tools::matrix::sqrt_scaled;
use crate::tools::symmetry::is_almost_symmetric;
use crate::tools::EmbedScalar;

/// Parameters of the embedding.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AseParams {
    /// rank, elbows, solver
    svd: SvdParams,
    /// if true a warning is emitted when the graph is not connected
    check_lcc: bool,
} // end of AseParams

impl AseParams {
    pub fn new(
        n_components: Option<usize>,
        n_elbows: usize,
        algorithm: SvdAlgorithm,
        n_iter: usize,
        check_lcc: bool,
    ) -> Result<Self, EmbedError> {
        let svd = SvdParams::new(n_components, n_elbows, algorithm, n_iter)?;
        Ok(AseParams { svd, check_lcc })
    }

    pub fn from_svd_params(svd: SvdParams, check_lcc: bool) -> Self {
        AseParams { svd, check_lcc }
    }

    pub fn get_svd_params(&self) -> &SvdParams {
        &self.svd
    }

    pub fn get_check_lcc(&self) -> bool {
        self.check_lcc
    }

    /// embeds the graph with adjacency matrix mat
    pub fn embed<F: EmbedScalar>(&self, mat: &ArrayView2<F>) -> Result<AseFit<F>, EmbedError> {
        let (nb_row, nb_col) = mat.dim();
        if nb_row != nb_col {
            log::error!("adjacency matrix must be square, got ({}, {})", nb_row, nb_col);
            return Err(EmbedError::InvalidInput(format!(
                "adjacency matrix must be square, got ({}, {})",
                nb_row, nb_col
            )));
        }
        let cpu_start = ProcessTime::now();
        let sys_start = SystemTime::now();
        //
        if self.check_lcc {
            warn_if_disconnected(mat, 0);
        }
        let svd_res = select_svd(mat, &self.svd)?;
        let (u, s, v) = svd_res.into_parts();
        let left = sqrt_scaled(&u.view(), &s.view());
        let right = if is_almost_symmetric(mat) {
            None
        } else {
            Some(sqrt_scaled(&v.view(), &s.view()))
        };
        log::info!(
            "ase embedding, {} nodes, dimension {}, directed : {}, sys time(ms) {:?} cpu time(ms) {:?}",
            nb_row,
            s.len(),
            right.is_some(),
            sys_start.elapsed().map(|t| t.as_millis()).unwrap_or(0),
            cpu_start.elapsed().as_millis()
        );
        Ok(AseFit {
            n_components: s.len(),
            singular_values: s,
            latent: LatentPositions::new(left, right),
        })
    } // end of embed
} // end of impl AseParams

impl Default for AseParams {
    fn default() -> Self {
        AseParams {
            svd: SvdParams::default(),
            check_lcc: true,
        }
    }
}

/// The result of an adjacency spectral embedding.
#[derive(Debug, Clone)]
pub struct AseFit<F> {
    n_components: usize,
    singular_values: Array1<F>,
    latent: LatentPositions<F>,
} // end of AseFit

impl<F> AseFit<F> {
    pub fn get_n_components(&self) -> usize {
        self.n_components
    }

    /// the d first singular values of the adjacency matrix
    pub fn get_singular_values(&self) -> &Array1<F> {
        &self.singular_values
    }

    pub fn get_latent(&self) -> &LatentPositions<F> {
        &self.latent
    }

    pub fn get_latent_left(&self) -> &Array2<F> {
        self.latent.get_left()
    }

    /// None if the graph is undirected
    pub fn get_latent_right(&self) -> Option<&Array2<F>> {
        self.latent.get_right()
    }
} // end of impl AseFit

impl<F: EmbedScalar> FittedT<F> for AseFit<F> {
    type Output = LatentPositions<F>;

    fn n_components(&self) -> usize {
        self.n_components
    }

    fn fitted_output(&self) -> LatentPositions<F> {
        self.latent.clone()
    }
}

impl<F: EmbedScalar> EmbedderT<F> for AseParams {
    type Input = Array2<F>;
    type Fitted = AseFit<F>;

    fn fit(&self, input: &Array2<F>) -> Result<AseFit<F>, EmbedError> {
        self.embed(&input.view())
    }
}

/// stateful adjacency spectral embedder
pub type AdjacencySpectralEmbed<F> = Estimator<F, AseParams>;

//========================================================================================

#[cfg(test)]
mod tests {

    use super::*;
    use crate::graphs::sbm::sample_sbm;
    use crate::tools::matrix::check_orthonormal_columns;
    use ndarray::array;

    fn log_init_test() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn undirected_has_no_right_latent() {
        log_init_test();
        let a = sample_sbm(30, 0.8, 0.1, false, 7);
        let params = AseParams::new(Some(2), 2, SvdAlgorithm::Truncated, 5, true).unwrap();
        let fit = params.embed(&a.view()).unwrap();
        assert_eq!(fit.get_latent_left().dim(), (30, 2));
        assert!(fit.get_latent_right().is_none());
        assert!(fit.get_latent().is_symmetric());
    }

    #[test]
    fn asymmetric_5x5() {
        log_init_test();
        let a: Array2<f64> = array![
            [0., 1., 0., 0., 1.],
            [0., 0., 1., 1., 0.],
            [1., 0., 0., 1., 0.],
            [0., 0., 0., 0., 1.],
            [1., 1., 0., 0., 0.]
        ];
        let params = AseParams::new(Some(3), 2, SvdAlgorithm::Full, 5, true).unwrap();
        let fit = params.embed(&a.view()).unwrap();
        let left = fit.get_latent_left();
        let right = fit.get_latent_right().unwrap();
        assert_eq!(left.dim(), (5, 3));
        assert_eq!(right.dim(), (5, 3));
        // recover U from X = U · Σ^(1/2)
        let sqrt_s = fit.get_singular_values().mapv(|x| x.sqrt());
        let u = left / &sqrt_s;
        assert!(check_orthonormal_columns(&u.view(), 1.0E-10).is_ok());
        let v = right / &sqrt_s;
        assert!(check_orthonormal_columns(&v.view(), 1.0E-10).is_ok());
    }

    #[test]
    fn latent_product_approximates_low_rank() {
        log_init_test();
        // exact rank 2 directed matrix
        let x: Array2<f64> = array![[1., 0.], [1., 0.], [0., 1.], [0., 1.], [1., 1.]];
        let y = array![[2., 0.], [0., 1.], [1., 1.], [0., 3.], [1., 0.]];
        let a = x.dot(&y.t());
        let params = AseParams::new(Some(2), 2, SvdAlgorithm::Randomized, 5, false).unwrap();
        let fit = params.embed(&a.view()).unwrap();
        let back = fit.get_latent_left().dot(&fit.get_latent_right().unwrap().t());
        let err = (&back - &a).mapv(|x| x * x).sum().sqrt();
        assert!(err < 1.0E-8);
    }

    #[test]
    fn rejects_rectangular() {
        log_init_test();
        let a = Array2::<f64>::ones((3, 4));
        let res = AseParams::default().embed(&a.view());
        assert!(matches!(res, Err(EmbedError::InvalidInput(_))));
    }

    #[test]
    fn estimator_needs_fit() {
        log_init_test();
        let mut ase = AdjacencySpectralEmbed::<f64>::new(AseParams::default());
        assert!(matches!(ase.fitted(), Err(EmbedError::NotFitted(_))));
        let a = sample_sbm(40, 0.7, 0.05, false, 3);
        let latent = ase.fit_transform(&a).unwrap();
        let d = ase.fitted().unwrap().get_n_components();
        assert!(d >= 1);
        assert_eq!(latent.get_left().dim(), (40, d));
    }
} // end of mod tests
