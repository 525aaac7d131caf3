//! Errors returned by the embedders and solvers.

use ndarray_linalg::error::LinalgError;

#[derive(thiserror::Error, Debug)]
pub enum EmbedError {
    /// malformed shapes, too few graphs, non finite entries, bad parameters.
    #[error("invalid input : {0}")]
    InvalidInput(String),

    /// requested number of components out of the feasible range of the matrix
    #[error("invalid rank {rank} : {reason}")]
    InvalidRank { rank: usize, reason: String },

    /// A solver did not converge. The truncated solver failure is recovered internally
    /// by falling back to the full solver, so this only surfaces when the full solver fails.
    #[error("svd did not converge : {0}")]
    Convergence(String),

    #[error("model must be fitted before calling {0}")]
    NotFitted(&'static str),

    #[error("model was fitted on {fitted} graphs, got {given} graphs")]
    DirectednessMismatch {
        fitted: &'static str,
        given: &'static str,
    },

    #[error("linear algebra failure : {0}")]
    Linalg(#[from] LinalgError),
}

impl EmbedError {
    pub(crate) fn directedness(undirected: bool) -> &'static str {
        if undirected {
            "undirected"
        } else {
            "directed"
        }
    }
} // end of impl EmbedError
