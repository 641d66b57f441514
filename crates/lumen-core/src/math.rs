//! Shared math utilities.

use std::cmp::Ordering;

/// Indices of the `k` largest values, largest first.
///
/// Equal values are ordered by ascending index, so the selection is fully
/// deterministic. Returns fewer than `k` indices when `values` is shorter.
pub fn top_k(values: &[f32], k: usize) -> Vec<usize> {
    let k = k.min(values.len());
    if k == 0 {
        return Vec::new();
    }

    let by_rank = |a: &usize, b: &usize| -> Ordering {
        values[*b].total_cmp(&values[*a]).then_with(|| a.cmp(b))
    };

    let mut indices: Vec<usize> = (0..values.len()).collect();
    if k < indices.len() {
        // Partition so the first k slots hold the winners, then order only those.
        indices.select_nth_unstable_by(k - 1, by_rank);
        indices.truncate(k);
    }
    indices.sort_unstable_by(by_rank);
    indices
}
