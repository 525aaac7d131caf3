//! Some utilities to order the abstract type for f64 or f32
//! i.e trait satisfying F : Float

use num_traits::float::*;
use std::cmp;

/// indexed value to keep track of position after sorting
#[derive(Copy, Clone, Debug)]
pub struct IndexedValue<F>(pub usize, pub F);

impl<F> IndexedValue<F> {
    pub fn new(idx: usize, val: F) -> Self {
        IndexedValue::<F>(idx, val)
    }
} // end of impl block for IndexedValue

/// makes an ordering on Float by putting Nan at beginning of sort.
/// rust sorts in Increasing order so we reverse Greater and Less
pub(crate) fn decreasing_sort_nans_first<F: Float>(
    a: &IndexedValue<F>,
    b: &IndexedValue<F>,
) -> cmp::Ordering {
    match (a, b) {
        (x, y) if x.1.is_nan() && y.1.is_nan() => cmp::Ordering::Equal,
        (x, _) if x.1.is_nan() => cmp::Ordering::Less,
        (_, y) if y.1.is_nan() => cmp::Ordering::Greater,
        (_, _) => b.1.partial_cmp(&a.1).unwrap_or(cmp::Ordering::Equal),
    }
} // end of decreasing_sort_nans_first

/// returns values sorted in decreasing order, Nan first, together with the permutation applied.
/// perm\[i\] is the position in values of the i-th sorted value. The sort is stable.
pub(crate) fn sort_decreasing<F: Float>(values: &[F]) -> (Vec<F>, Vec<usize>) {
    let mut indexed: Vec<IndexedValue<F>> = values
        .iter()
        .enumerate()
        .map(|(i, v)| IndexedValue::new(i, *v))
        .collect();
    indexed.sort_by(decreasing_sort_nans_first);
    let sorted = indexed.iter().map(|x| x.1).collect();
    let perm = indexed.iter().map(|x| x.0).collect();
    (sorted, perm)
} // end of sort_decreasing

/// true if values are non increasing (Nan are not sorted)
pub(crate) fn is_non_increasing<F: Float>(values: &[F]) -> bool {
    values.windows(2).all(|w| w[0] >= w[1])
}

mod tests {
    #[allow(unused)]
    use super::*;

    #[allow(unused)]
    fn log_init_test() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn check_sort_nan() {
        log_init_test();
        //
        let to_sort = vec![f64::NAN, 3., f64::NAN, 1., 5., f64::NAN];
        let (sorted, perm) = sort_decreasing(&to_sort);
        //
        for (v, p) in sorted.iter().zip(perm.iter()) {
            log::debug!(" (idx, va) : ({}, {})", p, v);
        }
        assert!(sorted[0].is_nan());
        assert!(sorted[1].is_nan());
        assert!(sorted[2].is_nan());
        assert!((sorted[3] - 5.).abs() < 1.0E-10);
        assert!((sorted[4] - 3.).abs() < 1.0E-10);
        assert!((sorted[5] - 1.).abs() < 1.0E-10);
        assert_eq!(&perm[3..], &[4, 1, 3]);
        assert!(!is_non_increasing(&to_sort));
        assert!(is_non_increasing(&sorted[3..]));
    } // end of check_sort_nan

    #[test]
    fn sort_keeps_ties_in_place() {
        log_init_test();
        let (sorted, perm) = sort_decreasing(&[2.0f32, 4., 2., 4.]);
        assert_eq!(sorted, vec![4., 4., 2., 2.]);
        assert_eq!(perm, vec![1, 3, 0, 2]);
    }
} // end of mod tests
