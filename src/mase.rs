//! Multiple adjacency spectral embedding (MASE).
//!
//! Joint embedding of K graphs on the same vertex set, modelled as G_i ≈ U · R_i · V^t with U, V shared by
//! all graphs and a score matrix R_i specific to each graph.
//!
//! Reference : *Inference for multiple heterogeneous networks with a common invariant subspace*,
//! J. Arroyo, A. Athreya, J. Cape, G. Chen, C. Priebe, J. Vogelstein. JMLR 2021.
//!
//! Steps:
//! 1. each graph is decomposed at rank ⌈log2(n)⌉ (or n_components if larger), in parallel.
//! 2. if n_components is not given, the dimension is the largest of the last elbows of the K spectra.
//! 3. the d first left singular vectors of each graph (scaled by sqrt of the singular values if asked)
//!    are stacked side by side in a (n, K·d) matrix, right singular vectors likewise for directed graphs.
//! 4. the svd of the stacked matrix gives the shared basis U (resp. V).
//! 5. R_i = U^t · G_i · V, with V = U for undirected graphs.

use ndarray::{s, Array1, Array2, Array3, ArrayView2, Axis};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use cpu_time::ProcessTime;
use std::time::SystemTime;

use crate::dimselect::select_elbows;
use crate::embedding::{EmbedderT, Estimator, FittedT, TransformT};
use crate::error::EmbedError;
use crate::graphs::GraphCollection;
use crate::svd::params::{SvdAlgorithm, SvdParams};
use crate::svd::{select_svd, SvdResult};
use crate::tools::connectivity::warn_if_disconnected;
use crate::tools::matrix::{sqrt_scaled, stack_column_blocks};
use crate::tools::EmbedScalar;

/// Parameters of the joint embedding
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaseParams {
    /// rank, elbows, solver. Used for both stages.
    svd: SvdParams,
    /// if true each graph basis is scaled by the square root of its singular values before stacking
    scaled: bool,
    /// if true a warning is emitted for each graph that is not connected
    check_lcc: bool,
} // end of MaseParams

/// rank of the first stage decompositions, ⌈log2(n)⌉ raised to n_components
fn first_stage_rank(nb_vertices: usize, n_components: Option<usize>) -> usize {
    let mut rank = 0usize;
    while (1usize << rank) < nb_vertices {
        rank += 1;
    }
    let rank = rank.max(1).min(nb_vertices);
    match n_components {
        Some(d) => rank.max(d),
        None => rank,
    }
} // end of first_stage_rank

impl MaseParams {
    pub fn new(
        n_components: Option<usize>,
        n_elbows: usize,
        algorithm: SvdAlgorithm,
        n_iter: usize,
        scaled: bool,
        check_lcc: bool,
    ) -> Result<Self, EmbedError> {
        let svd = SvdParams::new(n_components, n_elbows, algorithm, n_iter)?;
        Ok(MaseParams { svd, scaled, check_lcc })
    }

    pub fn from_svd_params(svd: SvdParams, scaled: bool, check_lcc: bool) -> Self {
        MaseParams { svd, scaled, check_lcc }
    }

    pub fn get_svd_params(&self) -> &SvdParams {
        &self.svd
    }

    pub fn is_scaled(&self) -> bool {
        self.scaled
    }

    pub fn get_check_lcc(&self) -> bool {
        self.check_lcc
    }

    /// joint embedding of the graphs of the collection
    pub fn embed<F: EmbedScalar>(&self, graphs: &GraphCollection<F>) -> Result<MaseFit<F>, EmbedError> {
        let cpu_start = ProcessTime::now();
        let sys_start = SystemTime::now();
        let nb_graphs = graphs.nb_graphs();
        let nb_vertices = graphs.nb_vertices();
        let undirected = graphs.is_undirected();
        log::info!(
            "mase : {} graphs, {} vertices, undirected : {}, scaled : {}",
            nb_graphs,
            nb_vertices,
            undirected,
            self.scaled
        );
        if self.check_lcc {
            graphs.iter().enumerate().for_each(|(i, g)| warn_if_disconnected(&g, i));
        }
        // first stage
        let rank = first_stage_rank(nb_vertices, self.svd.get_n_components());
        let first_params = self.svd.with_n_components(Some(rank))?;
        log::debug!("mase : first stage rank {}", rank);
        let views: Vec<ArrayView2<F>> = graphs.iter().collect();
        let decompositions = views
            .par_iter()
            .map(|g| select_svd(g, &first_params))
            .collect::<Result<Vec<SvdResult<F>>, EmbedError>>()?;
        // shared dimension
        let dim = match self.svd.get_n_components() {
            Some(d) => d,
            None => {
                let mut best = 1;
                for (i, res) in decompositions.iter().enumerate() {
                    let spectrum = res.get_s().to_vec();
                    let elbows = select_elbows(&spectrum, self.svd.get_n_elbows())?;
                    let last = elbows.last_elbow().unwrap_or(1);
                    log::debug!("mase : graph {} elbows {:?}", i, elbows.elbows);
                    best = best.max(last);
                }
                best
            }
        };
        log::debug!("mase : first stage dimension {}", dim);
        // stacking and second stage
        let left_blocks: Vec<Array2<F>> = decompositions
            .iter()
            .map(|res| self.truncated_block(res.get_u(), res.get_s(), dim))
            .collect();
        let (uhat, singular_values) = self.shared_basis(&left_blocks)?;
        let vhat = if undirected {
            None
        } else {
            let right_blocks: Vec<Array2<F>> = decompositions
                .iter()
                .map(|res| self.truncated_block(res.get_v(), res.get_s(), dim))
                .collect();
            Some(self.shared_basis(&right_blocks)?.0)
        };
        let scores = project(graphs, &uhat, vhat.as_ref());
        //
        log::info!(
            "mase : dimension {}, scores dims {:?}, sys time(ms) {:?} cpu time(ms) {:?}",
            uhat.ncols(),
            scores.dim(),
            sys_start.elapsed().map(|t| t.as_millis()).unwrap_or(0),
            cpu_start.elapsed().as_millis()
        );
        Ok(MaseFit {
            n_components: uhat.ncols(),
            undirected,
            latent_left: uhat,
            latent_right: vhat,
            scores,
            singular_values,
            n_graphs: nb_graphs,
            n_vertices: nb_vertices,
        })
    } // end of embed

    // d first columns of vectors, scaled if asked
    fn truncated_block<F: EmbedScalar>(&self, vectors: &Array2<F>, values: &Array1<F>, dim: usize) -> Array2<F> {
        let vectors = vectors.slice(s![.., ..dim]);
        if self.scaled {
            sqrt_scaled(&vectors, &values.slice(s![..dim]))
        } else {
            vectors.to_owned()
        }
    }

    // left singular vectors and singular values of the stacked blocks
    fn shared_basis<F: EmbedScalar>(&self, blocks: &[Array2<F>]) -> Result<(Array2<F>, Array1<F>), EmbedError> {
        let views: Vec<ArrayView2<F>> = blocks.iter().map(|b| b.view()).collect();
        let stacked = stack_column_blocks(&views)?;
        log::debug!("mase : second stage on stacked dims {:?}", stacked.dim());
        let (u, s, _) = select_svd(&stacked.view(), &self.svd)?.into_parts();
        Ok((u, s))
    }
} // end of impl MaseParams

impl Default for MaseParams {
    fn default() -> Self {
        MaseParams {
            svd: SvdParams::default(),
            scaled: false,
            check_lcc: true,
        }
    }
}

// R_i = U^t · G_i · V for each graph, V = U if None
fn project<F: EmbedScalar>(graphs: &GraphCollection<F>, u: &Array2<F>, v: Option<&Array2<F>>) -> Array3<F> {
    let v = v.unwrap_or(u);
    let mut scores = Array3::<F>::zeros((graphs.nb_graphs(), u.ncols(), v.ncols()));
    for (i, g) in graphs.iter().enumerate() {
        let r = u.t().dot(&g.dot(v));
        scores.index_axis_mut(Axis(0), i).assign(&r);
    }
    scores
} // end of project

//========================================================================================

/// The result of a joint embedding
#[derive(Debug, Clone)]
pub struct MaseFit<F> {
    n_components: usize,
    undirected: bool,
    /// (n, d) shared basis of left singular spaces
    latent_left: Array2<F>,
    /// (n, d2) shared basis of right singular spaces, directed graphs only
    latent_right: Option<Array2<F>>,
    /// (K, d, d2) score matrices
    scores: Array3<F>,
    /// singular values of the stacked left matrix
    singular_values: Array1<F>,
    n_graphs: usize,
    n_vertices: usize,
} // end of MaseFit

impl<F: EmbedScalar> MaseFit<F> {
    pub fn get_n_components(&self) -> usize {
        self.n_components
    }

    pub fn is_undirected(&self) -> bool {
        self.undirected
    }

    pub fn get_latent_left(&self) -> &Array2<F> {
        &self.latent_left
    }

    pub fn get_latent_right(&self) -> Option<&Array2<F>> {
        self.latent_right.as_ref()
    }

    /// left and right (if directed) latent positions
    pub fn get_latent(&self) -> (&Array2<F>, Option<&Array2<F>>) {
        (&self.latent_left, self.latent_right.as_ref())
    }

    pub fn get_scores(&self) -> &Array3<F> {
        &self.scores
    }

    pub fn get_singular_values(&self) -> &Array1<F> {
        &self.singular_values
    }

    pub fn get_n_graphs(&self) -> usize {
        self.n_graphs
    }

    pub fn get_n_vertices(&self) -> usize {
        self.n_vertices
    }

    /// low rank approximation of graph i : U · R_i · V^t
    pub fn reconstruct(&self, i: usize) -> Result<Array2<F>, EmbedError> {
        if i >= self.n_graphs {
            return Err(EmbedError::InvalidInput(format!(
                "graph {} out of range, fitted on {} graphs",
                i, self.n_graphs
            )));
        }
        let right = self.latent_right.as_ref().unwrap_or(&self.latent_left);
        let r = self.scores.index_axis(Axis(0), i);
        Ok(self.latent_left.dot(&r).dot(&right.t()))
    } // end of reconstruct
} // end of impl MaseFit

impl<F: EmbedScalar> FittedT<F> for MaseFit<F> {
    type Output = Array3<F>;

    fn n_components(&self) -> usize {
        self.n_components
    }

    fn fitted_output(&self) -> Array3<F> {
        self.scores.clone()
    }
}

impl<F: EmbedScalar> TransformT<F> for MaseFit<F> {
    type NewInput = GraphCollection<F>;
    type Projection = Array3<F>;

    /// score matrices of new graphs on the fitted basis. The basis is not modified.
    fn transform(&self, graphs: &GraphCollection<F>) -> Result<Array3<F>, EmbedError> {
        if graphs.nb_vertices() != self.n_vertices {
            return Err(EmbedError::InvalidInput(format!(
                "model fitted on graphs of {} vertices, got {}",
                self.n_vertices,
                graphs.nb_vertices()
            )));
        }
        let undirected = graphs.is_undirected();
        if undirected != self.undirected {
            return Err(EmbedError::DirectednessMismatch {
                fitted: EmbedError::directedness(self.undirected),
                given: EmbedError::directedness(undirected),
            });
        }
        Ok(project(graphs, &self.latent_left, self.latent_right.as_ref()))
    } // end of transform
}

impl<F: EmbedScalar> EmbedderT<F> for MaseParams {
    type Input = GraphCollection<F>;
    type Fitted = MaseFit<F>;

    fn fit(&self, graphs: &GraphCollection<F>) -> Result<MaseFit<F>, EmbedError> {
        self.embed(graphs)
    }
}

/// stateful multiple adjacency spectral embedder
pub type MultipleAse<F> = Estimator<F, MaseParams>;

//========================================================================================

// end of mod tests
