//! A validated population of graphs sharing their vertex set.
//!
//! The K adjacency matrices are stored in a (K, n, n) Array3 so that a collection given as a 3-dimensional
//! array is used without copy. Validation is done once at construction: at least 2 graphs,
//! square matrices of the same size, finite entries.

use ndarray::{Array2, Array3, ArrayView2, ArrayView3, Axis};

use crate::error::EmbedError;
use crate::tools::matrix::all_finite;
use crate::tools::symmetry::is_almost_symmetric;
use crate::tools::EmbedScalar;

/// minimal number of graphs in a collection
pub const MIN_NB_GRAPHS: usize = 2;

#[derive(Debug, Clone)]
pub struct GraphCollection<F> {
    graphs: Array3<F>,
} // end of GraphCollection

impl<F: EmbedScalar> GraphCollection<F> {
    /// builds a collection from a (K, n, n) array
    pub fn from_array3(graphs: Array3<F>) -> Result<Self, EmbedError> {
        let (nb_graphs, nb_row, nb_col) = graphs.dim();
        if nb_graphs < MIN_NB_GRAPHS {
            return Err(EmbedError::InvalidInput(format!(
                "need at least {} graphs, got {}",
                MIN_NB_GRAPHS, nb_graphs
            )));
        }
        if nb_row != nb_col || nb_row == 0 {
            return Err(EmbedError::InvalidInput(format!(
                "adjacency matrices must be square and not empty, got ({}, {})",
                nb_row, nb_col
            )));
        }
        for (i, g) in graphs.axis_iter(Axis(0)).enumerate() {
            if !all_finite(&g) {
                log::error!("graph {} has non finite entries", i);
                return Err(EmbedError::InvalidInput(format!("graph {} has non finite entries", i)));
            }
        }
        log::debug!("GraphCollection : {} graphs of {} vertices", nb_graphs, nb_row);
        Ok(GraphCollection { graphs })
    } // end of from_array3

    /// builds a collection from a list of matrices, copying them in a pre-allocated array.
    pub fn from_views(graphs: &[ArrayView2<F>]) -> Result<Self, EmbedError> {
        if graphs.len() < MIN_NB_GRAPHS {
            return Err(EmbedError::InvalidInput(format!(
                "need at least {} graphs, got {}",
                MIN_NB_GRAPHS,
                graphs.len()
            )));
        }
        let dim = graphs[0].dim();
        if let Some(bad) = graphs.iter().position(|g| g.dim() != dim) {
            return Err(EmbedError::InvalidInput(format!(
                "graph {} has dims {:?}, graph 0 has dims {:?}",
                bad,
                graphs[bad].dim(),
                dim
            )));
        }
        let mut stacked = Array3::<F>::zeros((graphs.len(), dim.0, dim.1));
        for (i, g) in graphs.iter().enumerate() {
            stacked.index_axis_mut(Axis(0), i).assign(g);
        }
        GraphCollection::from_array3(stacked)
    } // end of from_views

    pub fn from_vec(graphs: &[Array2<F>]) -> Result<Self, EmbedError> {
        let views: Vec<ArrayView2<F>> = graphs.iter().map(|g| g.view()).collect();
        GraphCollection::from_views(&views)
    }

    pub fn nb_graphs(&self) -> usize {
        self.graphs.dim().0
    }

    pub fn nb_vertices(&self) -> usize {
        self.graphs.dim().1
    }

    /// adjacency matrix of graph i
    pub fn graph(&self, i: usize) -> ArrayView2<F> {
        self.graphs.index_axis(Axis(0), i)
    }

    pub fn iter(&self) -> impl Iterator<Item = ArrayView2<'_, F>> + '_ {
        self.graphs.axis_iter(Axis(0))
    }

    pub fn as_array3(&self) -> ArrayView3<F> {
        self.graphs.view()
    }

    /// true if all graphs are symmetric up to [SYMMETRY_TOLERANCE](crate::tools::symmetry::SYMMETRY_TOLERANCE)
    pub fn is_undirected(&self) -> bool {
        self.iter().all(|g| is_almost_symmetric(&g))
    }
} // end of impl GraphCollection

//========================================================================================

/// random graphs for tests
#[cfg(test)]
pub(crate) mod sbm {

    use ndarray::Array2;
    use rand::Rng;
    use rand_xoshiro::rand_core::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    /// samples a two blocks stochastic block model on n vertices. The first n/2 vertices form block 0.
    /// Edge probability is p_in inside blocks, p_out between blocks. No self loop.
    /// If directed, mat\[i,j\] and mat\[j,i\] are drawn independently.
    pub(crate) fn sample_sbm(n: usize, p_in: f64, p_out: f64, directed: bool, seed: u64) -> Array2<f64> {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
        let mut mat = Array2::<f64>::zeros((n, n));
        for i in 0..n {
            for j in 0..n {
                if i == j || (!directed && j < i) {
                    continue;
                }
                let p = if (i < n / 2) == (j < n / 2) { p_in } else { p_out };
                if rng.gen::<f64>() < p {
                    mat[[i, j]] = 1.;
                    if !directed {
                        mat[[j, i]] = 1.;
                    }
                }
            }
        }
        mat
    } // end of sample_sbm
} // end of mod sbm

#[cfg(test)]
mod tests {

    use super::sbm::sample_sbm;
    use super::*;

    fn log_init_test() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn collection_from_vec() {
        log_init_test();
        let graphs: Vec<Array2<f64>> = (0..3).map(|i| sample_sbm(10, 0.9, 0.1, false, i)).collect();
        let collection = GraphCollection::from_vec(&graphs).unwrap();
        assert_eq!(collection.nb_graphs(), 3);
        assert_eq!(collection.nb_vertices(), 10);
        assert_eq!(collection.graph(2), graphs[2].view());
        assert!(collection.is_undirected());
        assert_eq!(collection.iter().count(), 3);
    }

    #[test]
    fn directed_collection() {
        log_init_test();
        let graphs: Vec<Array2<f64>> = (0..2).map(|i| sample_sbm(12, 0.8, 0.2, true, i)).collect();
        let collection = GraphCollection::from_vec(&graphs).unwrap();
        assert!(!collection.is_undirected());
    }

    #[test]
    fn rejects_bad_collections() {
        log_init_test();
        let g = sample_sbm(10, 0.9, 0.1, false, 1);
        // one graph
        let res = GraphCollection::from_vec(&[g.clone()]);
        assert!(matches!(res, Err(EmbedError::InvalidInput(_))));
        // ragged
        let res = GraphCollection::from_vec(&[g.clone(), sample_sbm(8, 0.9, 0.1, false, 2)]);
        assert!(matches!(res, Err(EmbedError::InvalidInput(_))));
        // not square
        let res = GraphCollection::from_array3(Array3::<f64>::zeros((3, 4, 5)));
        assert!(matches!(res, Err(EmbedError::InvalidInput(_))));
        // empty graphs
        let res = GraphCollection::from_array3(Array3::<f64>::zeros((3, 0, 0)));
        assert!(matches!(res, Err(EmbedError::InvalidInput(_))));
        // nan
        let mut bad = g.clone();
        bad[[0, 1]] = f64::NAN;
        let res = GraphCollection::from_vec(&[g, bad]);
        assert!(matches!(res, Err(EmbedError::InvalidInput(_))));
    }
} // end of mod tests
