//! Connectivity check of a graph given by its adjacency matrix.
//!
//! Embeddings of disconnected graphs are not optimal : each component is embedded in its own subspace.
//! The check is done on the undirected graph underlying the adjacency matrix (weak connectivity)
//! and only produces a warning.

use ndarray::ArrayView2;
use petgraph::algo::connected_components;
use petgraph::graph::{NodeIndex, UnGraph};

use super::EmbedScalar;

/// number of connected components of the graph with an edge between i and j if mat\[i,j\] or mat\[j,i\] is not null.
/// Self loops are ignored.
pub fn nb_connected_components<F: EmbedScalar>(mat: &ArrayView2<F>) -> usize {
    let (nb_row, nb_col) = mat.dim();
    let nb_nodes = nb_row.min(nb_col);
    let mut graph = UnGraph::<(), ()>::with_capacity(nb_nodes, 0);
    for _ in 0..nb_nodes {
        graph.add_node(());
    }
    for i in 0..nb_nodes {
        for j in (i + 1)..nb_nodes {
            if mat[[i, j]] != F::zero() || mat[[j, i]] != F::zero() {
                graph.add_edge(NodeIndex::new(i), NodeIndex::new(j), ());
            }
        }
    }
    connected_components(&graph)
} // end of nb_connected_components

/// true if the graph has exactly one connected component
pub fn is_fully_connected<F: EmbedScalar>(mat: &ArrayView2<F>) -> bool {
    nb_connected_components(mat) == 1
}

/// logs a warning if the graph is not connected, used by the embedders when check_lcc is set.
pub(crate) fn warn_if_disconnected<F: EmbedScalar>(mat: &ArrayView2<F>, rank: usize) {
    let nb_components = nb_connected_components(mat);
    if nb_components != 1 {
        log::warn!(
            "graph {} has {} connected components, embedding may not be optimal",
            rank,
            nb_components
        );
    }
} // end of warn_if_disconnected

#[cfg(test)]
mod tests {

    use super::*;
    use ndarray::{array, Array2};

    fn log_init_test() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn path_is_connected() {
        log_init_test();
        let a = array![[0., 1., 0.], [1., 0., 1.], [0., 1., 0.]];
        assert!(is_fully_connected(&a.view()));
    }

    #[test]
    fn directed_edges_connect_weakly() {
        log_init_test();
        // 0 -> 1 -> 2 only
        let a = array![[0., 1., 0.], [0., 0., 1.], [0., 0., 0.]];
        assert!(is_fully_connected(&a.view()));
    }

    #[test]
    fn two_blocks_are_two_components() {
        log_init_test();
        let mut a = Array2::<f64>::zeros((4, 4));
        a[[0, 1]] = 1.;
        a[[1, 0]] = 1.;
        a[[2, 3]] = 1.;
        a[[3, 2]] = 1.;
        // self loops do not connect anything
        a[[0, 0]] = 1.;
        assert_eq!(nb_connected_components(&a.view()), 2);
        assert!(!is_fully_connected(&a.view()));
    }
} // end of mod tests
