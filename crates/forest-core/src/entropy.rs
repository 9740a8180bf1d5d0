//! Sorted-sweep entropy split search (spec.md §4.1).
//!
//! Given a feature column sorted ascending jointly with its aligned
//! label column, evaluates every adjacent-pair midpoint as a candidate
//! threshold and returns the best one found, with weighted Shannon
//! entropy as the objective and a deterministic tie-break.

/// Tie-break tolerance: entropies within this distance are considered
/// equal, and the smaller threshold wins (spec.md §4.1).
const ENTROPY_EPS: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitCandidate {
    pub entropy: f64,
    pub threshold: f32,
    pub left_size: usize,
    pub right_size: usize,
    pub left_pred: i32,
    pub right_pred: i32,
}

fn entropy_of(counts: &[i32], size: usize) -> f64 {
    if size == 0 {
        return 0.0;
    }
    let size = size as f64;
    counts
        .iter()
        .filter(|&&c| c > 0)
        .map(|&c| {
            let p = c as f64 / size;
            -p * p.log2()
        })
        .sum()
}

fn weighted_entropy(left_counts: &[i32], left_size: usize, right_counts: &[i32], right_size: usize) -> f64 {
    let total = (left_size + right_size) as f64;
    let h_left = entropy_of(left_counts, left_size);
    let h_right = entropy_of(right_counts, right_size);
    (left_size as f64 * h_left + right_size as f64 * h_right) / total
}

pub(crate) fn argmax_class(counts: &[i32]) -> i32 {
    counts
        .iter()
        .enumerate()
        .max_by(|(ia, a), (ib, b)| a.cmp(b).then(ib.cmp(ia)))
        .map(|(i, _)| i as i32)
        .unwrap_or(0)
}

/// `true` iff `candidate` is strictly better than `current` under the
/// mandatory tie-break: strictly lower entropy wins; within
/// `ENTROPY_EPS` of the current best, the smaller threshold wins.
fn better(candidate: &SplitCandidate, current: &SplitCandidate) -> bool {
    if candidate.entropy < current.entropy - ENTROPY_EPS {
        true
    } else {
        (candidate.entropy - current.entropy).abs() <= ENTROPY_EPS && candidate.threshold < current.threshold
    }
}

/// Evaluates candidates `i` in `[start, end)` against the sorted
/// `values`/`labels` slices (length `n`), maintaining running class
/// counts incrementally from a freshly computed prefix so that each
/// worker chunk is self-contained (spec.md §4.1 complexity note: a
/// per-chunk prefix scan plus an incremental sweep keeps each chunk
/// `O(n)`, not `O(n^2)`).
fn eval_range(values: &[f32], labels: &[i32], num_classes: usize, start: usize, end: usize) -> Option<SplitCandidate> {
    let n = values.len();
    let mut left_counts = vec![0i32; num_classes];
    for &l in &labels[..start] {
        left_counts[l as usize] += 1;
    }
    let mut right_counts = vec![0i32; num_classes];
    for &l in &labels[start..] {
        right_counts[l as usize] += 1;
    }

    let mut best: Option<SplitCandidate> = None;
    for i in start..end {
        let label = labels[i] as usize;
        left_counts[label] += 1;
        right_counts[label] -= 1;
        let left_size = i + 1;
        let right_size = n - i - 1;
        let threshold = (values[i] + values[i + 1]) / 2.0;
        let entropy = weighted_entropy(&left_counts, left_size, &right_counts, right_size);
        let candidate = SplitCandidate {
            entropy,
            threshold,
            left_size,
            right_size,
            left_pred: argmax_class(&left_counts),
            right_pred: argmax_class(&right_counts),
        };
        best = Some(match best {
            Some(cur) if !better(&candidate, &cur) => cur,
            _ => candidate,
        });
    }
    best
}

/// Sequential split search over the full `[0, n-1)` candidate range.
pub fn best_split(values: &[f32], labels: &[i32], num_classes: usize) -> Option<SplitCandidate> {
    debug_assert_eq!(values.len(), labels.len());
    let n = values.len();
    if n < 2 {
        return None;
    }
    eval_range(values, labels, num_classes, 0, n - 1)
}

/// Shared-memory parallel split search: the `i`-loop is partitioned
/// across `pool`'s thread team, each thread keeping a private best
/// tuple, reduced at the end using the mandatory tie-break
/// (spec.md §4.1 "Parallelism").
#[cfg(feature = "parallel")]
pub fn best_split_parallel(
    values: &[f32],
    labels: &[i32],
    num_classes: usize,
    pool: &rayon::ThreadPool,
) -> Option<SplitCandidate> {
    use rayon::prelude::*;

    let n = values.len();
    if n < 2 {
        return None;
    }
    let num_candidates = n - 1;
    let n_threads = pool.current_num_threads().max(1);
    if n_threads <= 1 || num_candidates < 2 * n_threads {
        return best_split(values, labels, num_classes);
    }

    let chunk = num_candidates.div_ceil(n_threads);
    let bounds: Vec<(usize, usize)> = (0..num_candidates)
        .step_by(chunk)
        .map(|start| (start, (start + chunk).min(num_candidates)))
        .collect();

    pool.install(|| {
        bounds
            .par_iter()
            .filter_map(|&(start, end)| eval_range(values, labels, num_classes, start, end))
            .reduce_with(|a, b| if better(&b, &a) { b } else { a })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn tie_break_prefers_smaller_threshold() {
        // S6: values [1,1,2,2], labels [0,0,1,1] -> threshold 1.5, entropy 0.
        let values = [1.0_f32, 1.0, 2.0, 2.0];
        let labels = [0, 0, 1, 1];
        let best = best_split(&values, &labels, 2).unwrap();
        assert_abs_diff_eq!(best.threshold, 1.5, epsilon = 1e-6);
        assert_abs_diff_eq!(best.entropy, 0.0, epsilon = 1e-9);
        assert_eq!(best.left_pred, 0);
        assert_eq!(best.right_pred, 1);
    }

    #[test]
    fn linearly_separable_splits_at_midpoint() {
        // S1: x in 0..7, label 0 iff x<4 else 1 -> split at 3.5.
        let values: Vec<f32> = (0..8).map(|i| i as f32).collect();
        let labels: Vec<i32> = (0..8).map(|i| if i < 4 { 0 } else { 1 }).collect();
        let best = best_split(&values, &labels, 2).unwrap();
        assert_abs_diff_eq!(best.threshold, 3.5, epsilon = 1e-6);
        assert_eq!(best.entropy, 0.0);
        assert_eq!(best.left_size, 4);
        assert_eq!(best.right_size, 4);
    }

    #[test]
    fn parallel_matches_sequential() {
        let values: Vec<f32> = (0..97).map(|i| (i % 17) as f32).collect();
        let mut labels: Vec<i32> = (0..97).map(|i| (i % 3) as i32).collect();
        labels.reverse();
        let mut pairs: Vec<(f32, i32)> = values.iter().copied().zip(labels.iter().copied()).collect();
        pairs.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap());
        let sorted_values: Vec<f32> = pairs.iter().map(|p| p.0).collect();
        let sorted_labels: Vec<i32> = pairs.iter().map(|p| p.1).collect();

        let seq = best_split(&sorted_values, &sorted_labels, 3).unwrap();
        let pool = rayon::ThreadPoolBuilder::new().num_threads(4).build().unwrap();
        let par = best_split_parallel(&sorted_values, &sorted_labels, 3, &pool).unwrap();
        assert_abs_diff_eq!(seq.entropy, par.entropy, epsilon = 1e-9);
        assert_eq!(seq.threshold, par.threshold);
    }
}
