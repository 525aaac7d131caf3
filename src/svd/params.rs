//! Parameters of the svd solvers.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::EmbedError;

/// default number of elbows searched when the rank is not given
pub const DEFAULT_NB_ELBOWS: usize = 2;

/// Default number of power iterations of the randomized solver.
/// Larger than the usual 2 to cope with the slowly decaying spectrum of sparse graphs.
pub const DEFAULT_NB_ITER: usize = 5;

/// default seed of the random generators used by the randomized and truncated solvers
pub const DEFAULT_SEED: u64 = 0;

/// The svd solver to use.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SvdAlgorithm {
    /// exact dense decomposition (lapack gesvd)
    Full,
    /// Lanczos bidiagonalization converging to the top singular triplets.
    /// Falls back to Full if it does not converge or if rank is within 1 of the matrix dimension.
    Truncated,
    /// Randomized range finder with power iterations (Halko, Martinsson, Tropp)
    Randomized,
}

impl Default for SvdAlgorithm {
    fn default() -> Self {
        SvdAlgorithm::Randomized
    }
}

impl FromStr for SvdAlgorithm {
    type Err = EmbedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "full" => Ok(SvdAlgorithm::Full),
            "truncated" => Ok(SvdAlgorithm::Truncated),
            "randomized" => Ok(SvdAlgorithm::Randomized),
            _ => Err(EmbedError::InvalidInput(format!(
                "unknown svd algorithm {}, must be full, truncated or randomized",
                s
            ))),
        }
    }
} // end of impl FromStr for SvdAlgorithm

/// Describes the decomposition asked for.
///
/// - n_components : number of singular triplets. If None the rank is the last elbow found by
///   [select_elbows](crate::dimselect::select_elbows) on the singular values of the matrix.
/// - n_elbows : number of elbows searched when n_components is None.
/// - algorithm : solver.
/// - n_iter : number of power iterations, used only by the randomized solver.
/// - seed : seed of random generators, fixes the result of randomized and truncated solvers.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SvdParams {
    n_components: Option<usize>,
    n_elbows: usize,
    algorithm: SvdAlgorithm,
    n_iter: usize,
    seed: u64,
} // end of SvdParams

impl SvdParams {
    pub fn new(
        n_components: Option<usize>,
        n_elbows: usize,
        algorithm: SvdAlgorithm,
        n_iter: usize,
    ) -> Result<Self, EmbedError> {
        if let Some(0) = n_components {
            return Err(EmbedError::InvalidRank {
                rank: 0,
                reason: "n_components must be >= 1 or None".into(),
            });
        }
        if n_elbows == 0 {
            return Err(EmbedError::InvalidInput("n_elbows must be >= 1".into()));
        }
        if n_iter == 0 {
            return Err(EmbedError::InvalidInput("n_iter must be >= 1".into()));
        }
        Ok(SvdParams {
            n_components,
            n_elbows,
            algorithm,
            n_iter,
            seed: DEFAULT_SEED,
        })
    } // end of new

    /// returns a copy with the given seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// returns a copy with rank fixed to n_components, other parameters unchanged.
    pub fn with_n_components(mut self, n_components: Option<usize>) -> Result<Self, EmbedError> {
        if let Some(0) = n_components {
            return Err(EmbedError::InvalidRank {
                rank: 0,
                reason: "n_components must be >= 1 or None".into(),
            });
        }
        self.n_components = n_components;
        Ok(self)
    }

    /// returns a copy with algorithm changed
    pub fn with_algorithm(mut self, algorithm: SvdAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    pub fn get_n_components(&self) -> Option<usize> {
        self.n_components
    }

    pub fn get_n_elbows(&self) -> usize {
        self.n_elbows
    }

    pub fn get_algorithm(&self) -> SvdAlgorithm {
        self.algorithm
    }

    pub fn get_n_iter(&self) -> usize {
        self.n_iter
    }

    pub fn get_seed(&self) -> u64 {
        self.seed
    }
} // end of impl SvdParams

impl Default for SvdParams {
    fn default() -> Self {
        SvdParams {
            n_components: None,
            n_elbows: DEFAULT_NB_ELBOWS,
            algorithm: SvdAlgorithm::default(),
            n_iter: DEFAULT_NB_ITER,
            seed: DEFAULT_SEED,
        }
    }
}

// end of mod tests
