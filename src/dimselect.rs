//! Automatic choice of the embedding dimension.
//!
//! The elbows of a decreasing spectrum are found by profile likelihood maximization as described in :
//!     *Automatic dimensionality selection from the scree plot via the use of profile likelihood.*
//!     M. Zhu, A. Ghodsi. Computational Statistics and Data Analysis 2006.
//!
//! Each elbow is searched in the leading part of the spectrum delimited by the previous elbow, so the
//! successive elbows are found in decreasing order and returned in increasing order.

use ndarray::ArrayView2;
use num_traits::float::Float;

use crate::error::EmbedError;
use crate::svd::full::singular_values;
use crate::tools::orderingf::{is_non_increasing, sort_decreasing};
use crate::tools::{to_float, EmbedScalar};

/// Result of the elbow search.
/// elbows are 1-based positions in the decreasingly sorted values: an elbow e means the e first values form
/// a group, and e is the dimension it suggests. The three vectors are parallel and sorted by increasing elbow.
#[derive(Debug, Clone, PartialEq)]
pub struct ElbowResult<F> {
    /// 1-based position of the last value of each group, increasing.
    pub elbows: Vec<usize>,
    /// the maximal profile log-likelihood reached at each elbow.
    pub likelihoods: Vec<F>,
    /// the value at each elbow (i.e values\[elbow-1\])
    pub values: Vec<F>,
} // end of ElbowResult

impl<F: Copy> ElbowResult<F> {
    /// the largest elbow found, the dimension used by the embedders.
    pub fn last_elbow(&self) -> Option<usize> {
        self.elbows.last().copied()
    }

    pub fn nb_elbows(&self) -> usize {
        self.elbows.len()
    }
} // end of impl ElbowResult

#[cfg_attr(doc, katexit::katexit)]
/// Computes for each split $k$ in $1..m-1$ the profile log-likelihood of the two groups
/// values\[0..k\] and values\[k..m\] modelled as gaussians with distinct means $\mu_1, \mu_2$ and a common variance.
///
/// $$ l(k) = -\frac{m}{2} \log(2\pi) - \frac{m}{2} \log(\hat{\sigma}^2) - \frac{m}{2} $$
///
/// where $\hat{\sigma}^2$ is the mean of the squared residuals to the group means.
/// Element k-1 of the returned vector corresponds to split k. The vector is empty if m < 2.
pub fn profile_likelihoods<F: EmbedScalar>(values: &[F]) -> Vec<F> {
    let m = values.len();
    if m < 2 {
        return Vec::new();
    }
    let nb = to_float::<F>(m as f64);
    let two = to_float::<F>(2.);
    let log_2pi = Float::ln(to_float::<F>(2. * std::f64::consts::PI));
    let mut likelihoods = Vec::<F>::with_capacity(m - 1);
    for k in 1..m {
        let ssr = group_residuals(&values[..k]) + group_residuals(&values[k..]);
        // a perfect split gets the maximal finite likelihood
        let variance = Float::max(ssr / nb, F::min_positive_value());
        let likelihood = -nb / two * (log_2pi + Float::ln(variance) + F::one());
        likelihoods.push(likelihood);
    }
    likelihoods
} // end of profile_likelihoods

// sum of squared deviations to the mean of group
fn group_residuals<F: EmbedScalar>(group: &[F]) -> F {
    let size = to_float::<F>(group.len() as f64);
    let mean = group.iter().fold(F::zero(), |acc, x| acc + *x) / size;
    group.iter().fold(F::zero(), |acc, x| acc + (*x - mean) * (*x - mean))
}

// index of first maximum
fn argmax<F: EmbedScalar>(values: &[F]) -> Option<(usize, F)> {
    let mut best: Option<(usize, F)> = None;
    for (i, v) in values.iter().enumerate() {
        match best {
            Some((_, b)) if !(*v > b) => {}
            _ => best = Some((i, *v)),
        }
    }
    best
}

/// Searches n_elbows elbows in values (see [ElbowResult] for the conventions).
/// values are expected non negative and sorted in decreasing order, they are sorted if not.
/// The search stops before n_elbows are found if the leading group has less than 2 values.
/// A single value gives the elbow 1.
pub fn select_elbows<F: EmbedScalar>(values: &[F], n_elbows: usize) -> Result<ElbowResult<F>, EmbedError> {
    select_elbows_with_threshold(values, n_elbows, None)
}

/// as [select_elbows] but values lower or equal than threshold are dropped before the search.
pub fn select_elbows_with_threshold<F: EmbedScalar>(
    values: &[F],
    n_elbows: usize,
    threshold: Option<F>,
) -> Result<ElbowResult<F>, EmbedError> {
    //
    if n_elbows == 0 {
        return Err(EmbedError::InvalidInput("n_elbows must be >= 1".into()));
    }
    if values.is_empty() {
        return Err(EmbedError::InvalidInput("cannot select dimension of an empty spectrum".into()));
    }
    let sorted: Vec<F> = if is_non_increasing(values) {
        values.to_vec()
    } else {
        log::debug!("select_elbows : values not sorted, sorting");
        sort_decreasing(values).0
    };
    // nans are sorted first
    if !Float::is_finite(sorted[0]) {
        return Err(EmbedError::InvalidInput("spectrum has non finite values".into()));
    }
    if sorted[sorted.len() - 1] < F::zero() {
        return Err(EmbedError::InvalidInput("spectrum has negative values".into()));
    }
    let sorted: Vec<F> = match threshold {
        Some(t) => sorted.into_iter().filter(|v| *v > t).collect(),
        None => sorted,
    };
    if sorted.is_empty() {
        return Err(EmbedError::InvalidInput(
            "no value above threshold in spectrum".into(),
        ));
    }
    //
    let mut result = ElbowResult {
        elbows: Vec::with_capacity(n_elbows),
        likelihoods: Vec::with_capacity(n_elbows),
        values: Vec::with_capacity(n_elbows),
    };
    if sorted.len() == 1 {
        result.elbows.push(1);
        result.likelihoods.push(F::zero());
        result.values.push(sorted[0]);
        return Ok(result);
    }
    let mut end = sorted.len();
    while result.elbows.len() < n_elbows && end >= 2 {
        let likelihoods = profile_likelihoods(&sorted[..end]);
        let (idx, likelihood) = match argmax(&likelihoods) {
            Some(best) => best,
            None => break,
        };
        let elbow = idx + 1;
        log::debug!(
            "select_elbows : searching in [0..{}], elbow at {} log-likelihood {:.3e}",
            end,
            elbow,
            likelihood
        );
        result.elbows.push(elbow);
        result.likelihoods.push(likelihood);
        result.values.push(sorted[elbow - 1]);
        end = elbow;
    }
    // found in decreasing order
    result.elbows.reverse();
    result.likelihoods.reverse();
    result.values.reverse();
    Ok(result)
} // end of select_elbows_with_threshold

/// Computes the singular values of mat (full decomposition) and searches n_elbows elbows in them.
pub fn select_dimension_from_matrix<F: EmbedScalar>(
    mat: &ArrayView2<F>,
    n_elbows: usize,
) -> Result<ElbowResult<F>, EmbedError> {
    let spectrum = singular_values(mat)?.to_vec();
    log::trace!("select_dimension_from_matrix : spectrum {:?}", spectrum);
    select_elbows(&spectrum, n_elbows)
} // end of select_dimension_from_matrix

//========================================================================================

// end of mod tests
