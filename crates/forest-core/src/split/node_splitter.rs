//! Per-node split search: sample features, run the entropy sweep on
//! each, keep the global best (spec.md §4.3).

use crate::entropy::{best_split, SplitCandidate};
#[cfg(feature = "parallel")]
use crate::entropy::best_split_parallel;
use crate::sample::feature_sampler::sample_features;
use crate::types::{BestSplit, Dataset, MaxFeatures};
use rand_chacha::ChaCha8Rng;

/// Extracts and jointly sorts a feature's `(values, labels)` pair
/// (stable sort, matching spec.md §4.3 step 2's "sort jointly" and the
/// original merge-sort draft's stability).
fn sorted_feature_labels(dataset: &Dataset, feature: usize) -> (Vec<f32>, Vec<i32>) {
    let n = dataset.num_rows();
    let mut pairs: Vec<(f32, i32)> = (0..n).map(|i| (dataset.row(i)[feature], dataset.label(i))).collect();
    pairs.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap());
    (pairs.iter().map(|p| p.0).collect(), pairs.iter().map(|p| p.1).collect())
}

/// Finds the globally best split across a randomized feature subset.
/// Returns `None` if the node cannot be split (spec.md §4.3 "Failure":
/// every candidate's entropy is `>= parent.entropy`, or fewer than two
/// distinct feature values exist anywhere).
///
/// Secondary tie-break (spec.md §4.3 step 3): among features tied on
/// entropy+threshold, the smaller feature index wins. Since features
/// are tried in `feature_order` and only strictly-better candidates
/// replace the running best, trying features in ascending order
/// achieves this for free.
pub fn find_best_split(
    dataset: &Dataset,
    num_classes: usize,
    max_features: MaxFeatures,
    parent_entropy: f64,
    rng: &mut ChaCha8Rng,
    pool: Option<&rayon::ThreadPool>,
) -> Option<BestSplit> {
    let num_features = dataset.num_features();
    let mut feature_order = sample_features(num_features, max_features, rng);
    feature_order.sort_unstable();

    let mut best: Option<(usize, SplitCandidate)> = None;
    for feature in feature_order {
        let (values, labels) = sorted_feature_labels(dataset, feature);
        let candidate = match pool {
            #[cfg(feature = "parallel")]
            Some(pool) => best_split_parallel(&values, &labels, num_classes, pool),
            #[cfg(not(feature = "parallel"))]
            Some(_) => best_split(&values, &labels, num_classes),
            None => best_split(&values, &labels, num_classes),
        };
        let Some(candidate) = candidate else { continue };

        best = Some(match best {
            None => (feature, candidate),
            Some((best_feature, best_candidate)) => {
                if candidate.entropy < best_candidate.entropy - 1e-9 {
                    (feature, candidate)
                } else {
                    (best_feature, best_candidate)
                }
            }
        });
    }

    let (feature_index, candidate) = best?;
    if candidate.entropy >= parent_entropy {
        return None;
    }

    Some(BestSplit {
        entropy: candidate.entropy,
        threshold: candidate.threshold,
        feature_index,
        left_size: candidate.left_size,
        right_size: candidate.right_size,
        left_pred: candidate.left_pred,
        right_pred: candidate.right_pred,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::node_rng;
    use approx::assert_abs_diff_eq;
    use ndarray::Array2;

    #[test]
    fn finds_obvious_split_with_single_feature() {
        let mut arr = Array2::<f32>::zeros((8, 2));
        for i in 0..8 {
            arr[[i, 0]] = i as f32;
            arr[[i, 1]] = if i < 4 { 0.0 } else { 1.0 };
        }
        let dataset = Dataset::from_array(arr).unwrap();
        let mut rng = node_rng(0, 0);
        let split = find_best_split(&dataset, 2, MaxFeatures::Fixed(1), f64::INFINITY, &mut rng, None).unwrap();
        assert_eq!(split.feature_index, 0);
        assert_abs_diff_eq!(split.threshold, 3.5, epsilon = 1e-6);
        assert_eq!(split.left_pred, 0);
        assert_eq!(split.right_pred, 1);
    }

    #[test]
    fn returns_none_when_split_cannot_improve_on_parent() {
        let mut arr = Array2::<f32>::zeros((4, 2));
        for i in 0..4 {
            arr[[i, 0]] = i as f32;
            arr[[i, 1]] = 0.0; // pure node
        }
        let dataset = Dataset::from_array(arr).unwrap();
        let mut rng = node_rng(0, 0);
        // parent_entropy 0.0: no split can strictly improve on a pure node.
        let split = find_best_split(&dataset, 1, MaxFeatures::Fixed(1), 0.0, &mut rng, None);
        assert!(split.is_none());
    }
}
