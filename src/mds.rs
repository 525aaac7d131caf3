//! Classical multidimensional scaling.
//!
//! With D the (n, n) dissimilarity matrix and J = I - 1/n · 1 · 1^t the centering matrix,
//! the doubly centered matrix B = -1/2 · J · D² · J (D² entrywise square) is decomposed as U · Σ · U^t
//! and the embedded coordinates are U · Σ^(1/2).

use ndarray::{Array1, Array2, ArrayD, ArrayView2, Axis, Ix2};
use num_traits::float::Float;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::embedding::{EmbedderT, Estimator, FittedT};
use crate::error::EmbedError;
use crate::svd::params::{SvdAlgorithm, SvdParams, DEFAULT_NB_ELBOWS, DEFAULT_NB_ITER};
use crate::svd::select_svd;
use crate::tools::matrix::{all_finite, sqrt_scaled};
use crate::tools::symmetry::is_symmetric;
use crate::tools::{to_float, EmbedScalar};

/// How the input is interpreted
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Dissimilarity {
    /// input is an array of samples (first axis), dissimilarities are euclidean distances between samples,
    /// i.e Frobenius distances when samples are matrices.
    Euclidean,
    /// input is a symmetric (n, n) dissimilarity matrix
    Precomputed,
}

impl Default for Dissimilarity {
    fn default() -> Self {
        Dissimilarity::Euclidean
    }
}

impl FromStr for Dissimilarity {
    type Err = EmbedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "euclidean" => Ok(Dissimilarity::Euclidean),
            "precomputed" => Ok(Dissimilarity::Precomputed),
            _ => Err(EmbedError::InvalidInput(format!(
                "unknown dissimilarity {}, must be euclidean or precomputed",
                s
            ))),
        }
    }
} // end of impl FromStr for Dissimilarity

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MdsParams {
    /// None : dimension chosen by elbow search
    n_components: Option<usize>,
    n_elbows: usize,
    dissimilarity: Dissimilarity,
} // end of MdsParams

impl MdsParams {
    pub fn new(n_components: Option<usize>, n_elbows: usize, dissimilarity: Dissimilarity) -> Result<Self, EmbedError> {
        // validates the rank and n_elbows
        SvdParams::new(n_components, n_elbows, SvdAlgorithm::Full, DEFAULT_NB_ITER)?;
        Ok(MdsParams {
            n_components,
            n_elbows,
            dissimilarity,
        })
    }

    pub fn get_n_components(&self) -> Option<usize> {
        self.n_components
    }

    pub fn get_n_elbows(&self) -> usize {
        self.n_elbows
    }

    pub fn get_dissimilarity(&self) -> Dissimilarity {
        self.dissimilarity
    }

    // exact solver for one component, randomized otherwise
    fn svd_params(&self) -> Result<SvdParams, EmbedError> {
        let algorithm = match self.n_components {
            Some(1) => SvdAlgorithm::Full,
            _ => SvdAlgorithm::Randomized,
        };
        SvdParams::new(self.n_components, self.n_elbows, algorithm, DEFAULT_NB_ITER)
    }

    /// embeds the samples (or the precomputed dissimilarities) of data
    pub fn embed<F: EmbedScalar>(&self, data: &ArrayD<F>) -> Result<MdsFit<F>, EmbedError> {
        let dissimilarity_matrix = match self.dissimilarity {
            Dissimilarity::Precomputed => {
                let mat = data.view().into_dimensionality::<Ix2>().map_err(|_| {
                    EmbedError::InvalidInput(format!(
                        "precomputed dissimilarity must be a 2 dimensional array, got shape {:?}",
                        data.shape()
                    ))
                })?;
                if !all_finite(&mat) {
                    return Err(EmbedError::InvalidInput("dissimilarity has non finite entries".into()));
                }
                if !is_symmetric(&mat) {
                    log::error!("precomputed dissimilarity of shape {:?} is not symmetric", mat.dim());
                    return Err(EmbedError::InvalidInput("precomputed dissimilarity must be symmetric".into()));
                }
                mat.to_owned()
            }
            Dissimilarity::Euclidean => euclidean_dissimilarity(data)?,
        };
        let nb_samples = dissimilarity_matrix.nrows();
        if let Some(d) = self.n_components {
            if d > nb_samples {
                return Err(EmbedError::InvalidRank {
                    rank: d,
                    reason: format!("larger than the number of samples {}", nb_samples),
                });
            }
        }
        let centered = double_center(&dissimilarity_matrix.view());
        let (u, s, _) = select_svd(&centered.view(), &self.svd_params()?)?.into_parts();
        log::debug!("mds : {} samples, dimension {}", nb_samples, s.len());
        Ok(MdsFit {
            n_components: s.len(),
            singular_values: s.mapv(|x| Float::sqrt(Float::max(x, F::zero()))),
            embedding: sqrt_scaled(&u.view(), &s.view()),
            components: u,
            dissimilarity_matrix,
        })
    } // end of embed
} // end of impl MdsParams

impl Default for MdsParams {
    fn default() -> Self {
        MdsParams {
            n_components: None,
            n_elbows: DEFAULT_NB_ELBOWS,
            dissimilarity: Dissimilarity::default(),
        }
    }
}

/// pairwise euclidean distances between the samples of data, indexed by the first axis.
/// Samples of dimension > 1 are flattened, so matrices are compared with the Frobenius norm.
pub fn euclidean_dissimilarity<F: EmbedScalar>(data: &ArrayD<F>) -> Result<Array2<F>, EmbedError> {
    if data.ndim() < 2 {
        return Err(EmbedError::InvalidInput(format!(
            "samples array must have at least 2 dimensions, got shape {:?}",
            data.shape()
        )));
    }
    let nb_samples = data.shape()[0];
    let sample_size: usize = data.shape()[1..].iter().product();
    if nb_samples == 0 || sample_size == 0 {
        return Err(EmbedError::InvalidInput(format!("empty samples array, shape {:?}", data.shape())));
    }
    let flat = Array2::from_shape_vec((nb_samples, sample_size), data.iter().copied().collect())
        .map_err(|e| EmbedError::InvalidInput(format!("cannot flatten samples : {}", e)))?;
    if !all_finite(&flat.view()) {
        return Err(EmbedError::InvalidInput("samples have non finite entries".into()));
    }
    let mut dist = Array2::<F>::zeros((nb_samples, nb_samples));
    for i in 0..nb_samples {
        for j in 0..i {
            let diff = &flat.row(i) - &flat.row(j);
            let d = Float::sqrt(diff.dot(&diff));
            dist[[i, j]] = d;
            dist[[j, i]] = d;
        }
    }
    Ok(dist)
} // end of euclidean_dissimilarity

/// B = -1/2 · J · D² · J
pub fn double_center<F: EmbedScalar>(dissimilarity: &ArrayView2<F>) -> Array2<F> {
    let squared = dissimilarity.mapv(|x| x * x);
    let n = to_float::<F>(squared.nrows() as f64);
    let half = to_float::<F>(0.5);
    let row_means: Array1<F> = squared.sum_axis(Axis(1)) / n;
    let col_means: Array1<F> = squared.sum_axis(Axis(0)) / n;
    let mean = row_means.sum() / n;
    let mut centered = squared;
    for ((i, j), b) in centered.indexed_iter_mut() {
        *b = -half * (*b - row_means[i] - col_means[j] + mean);
    }
    centered
} // end of double_center

//========================================================================================

/// The result of a classical mds
#[derive(Debug, Clone)]
pub struct MdsFit<F> {
    n_components: usize,
    /// (n, d) eigenvectors of the centered matrix
    components: Array2<F>,
    /// square roots of the d first singular values of the centered matrix
    singular_values: Array1<F>,
    /// (n, d) embedded coordinates
    embedding: Array2<F>,
    dissimilarity_matrix: Array2<F>,
} // end of MdsFit

impl<F> MdsFit<F> {
    pub fn get_n_components(&self) -> usize {
        self.n_components
    }

    pub fn get_components(&self) -> &Array2<F> {
        &self.components
    }

    pub fn get_singular_values(&self) -> &Array1<F> {
        &self.singular_values
    }

    pub fn get_embedding(&self) -> &Array2<F> {
        &self.embedding
    }

    pub fn get_dissimilarity_matrix(&self) -> &Array2<F> {
        &self.dissimilarity_matrix
    }
} // end of impl MdsFit

impl<F: EmbedScalar> FittedT<F> for MdsFit<F> {
    type Output = Array2<F>;

    fn n_components(&self) -> usize {
        self.n_components
    }

    fn fitted_output(&self) -> Array2<F> {
        self.embedding.clone()
    }
}

impl<F: EmbedScalar> EmbedderT<F> for MdsParams {
    type Input = ArrayD<F>;
    type Fitted = MdsFit<F>;

    fn fit(&self, data: &ArrayD<F>) -> Result<MdsFit<F>, EmbedError> {
        self.embed(data)
    }
}

/// stateful classical mds
pub type ClassicalMds<F> = Estimator<F, MdsParams>;

//========================================================================================

#[cfg(test)]
mod tests {

    use super::*;
    use crate::tools::matrix::frobenius_norm;
    use ndarray::{array, Array3};

    fn log_init_test() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    // 6 points of the plane, not collinear
    fn plane_points() -> Array2<f64> {
        array![[0., 0.], [3., 0.], [0., 4.], [1., 1.], [5., 2.], [-2., 3.]]
    }

    #[test]
    fn recovers_plane_distances() {
        log_init_test();
        let points = plane_points();
        let params = MdsParams::new(Some(2), 2, Dissimilarity::Euclidean).unwrap();
        let fit = params.embed(&points.clone().into_dyn()).unwrap();
        let embedded = fit.get_embedding();
        assert_eq!(embedded.dim(), (6, 2));
        let dist = euclidean_dissimilarity(&embedded.clone().into_dyn()).unwrap();
        let err = frobenius_norm(&(&dist - fit.get_dissimilarity_matrix()).view());
        assert!(err < 1.0E-8);
        assert_eq!(fit.get_components().dim(), (6, 2));
        assert_eq!(fit.get_singular_values().len(), 2);
    }

    #[test]
    fn precomputed_matches_euclidean() {
        log_init_test();
        let points = plane_points();
        let dist = euclidean_dissimilarity(&points.clone().into_dyn()).unwrap();
        let params = MdsParams::new(Some(1), 2, Dissimilarity::Precomputed).unwrap();
        let from_dist = params.embed(&dist.clone().into_dyn()).unwrap();
        let params = MdsParams::new(Some(1), 2, Dissimilarity::Euclidean).unwrap();
        let from_points = params.embed(&points.into_dyn()).unwrap();
        assert!((from_dist.get_singular_values()[0] - from_points.get_singular_values()[0]).abs() < 1.0E-10);
    }

    #[test]
    fn frobenius_distances_of_matrices() {
        log_init_test();
        let mut samples = Array3::<f64>::zeros((3, 2, 2));
        samples[[1, 0, 0]] = 3.;
        samples[[2, 1, 1]] = 4.;
        let fit = MdsParams::new(Some(2), 2, Dissimilarity::Euclidean)
            .unwrap()
            .embed(&samples.into_dyn())
            .unwrap();
        let d = fit.get_dissimilarity_matrix();
        assert!((d[[0, 1]] - 3.).abs() < 1.0E-12);
        assert!((d[[1, 2]] - 5.).abs() < 1.0E-12);
        assert_eq!(d[[1, 1]], 0.);
    }

    #[test]
    fn centered_matrix_of_line() {
        log_init_test();
        // points 0, 1, 2 on a line : B is the gram matrix of centered coordinates -1, 0, 1
        let d = array![[0., 1., 2.], [1., 0., 1.], [2., 1., 0.]];
        let b = double_center(&d.view());
        let expected = array![[1., 0., -1.], [0., 0., 0.], [-1., 0., 1.]];
        assert!(frobenius_norm(&(&b - &expected).view()) < 1.0E-12);
    }

    #[test]
    fn bad_inputs() {
        log_init_test();
        let asym = array![[0., 1.], [2., 0.]];
        let params = MdsParams::new(Some(1), 2, Dissimilarity::Precomputed).unwrap();
        assert!(matches!(params.embed(&asym.into_dyn()), Err(EmbedError::InvalidInput(_))));
        let cube = Array3::<f64>::zeros((2, 2, 2));
        assert!(matches!(params.embed(&cube.into_dyn()), Err(EmbedError::InvalidInput(_))));
        let params = MdsParams::new(Some(7), 2, Dissimilarity::Euclidean).unwrap();
        let res = params.embed(&plane_points().into_dyn());
        assert!(matches!(res, Err(EmbedError::InvalidRank { rank: 7, .. })));
        assert!(matches!(
            MdsParams::new(Some(0), 2, Dissimilarity::Euclidean),
            Err(EmbedError::InvalidRank { .. })
        ));
        assert!("cosine".parse::<Dissimilarity>().is_err());
        assert_eq!("Precomputed".parse::<Dissimilarity>().unwrap(), Dissimilarity::Precomputed);
    }

    #[test]
    fn estimator_fit_transform() {
        log_init_test();
        let mut mds = ClassicalMds::<f64>::new(MdsParams::new(Some(2), 2, Dissimilarity::Euclidean).unwrap());
        assert!(matches!(mds.fitted(), Err(EmbedError::NotFitted(_))));
        let embedded = mds.fit_transform(&plane_points().into_dyn()).unwrap();
        assert_eq!(embedded.dim(), (6, 2));
        assert_eq!(mds.fitted().unwrap().n_components(), 2);
    }
} // end of mod tests
