//! Randomized feature subset selection for one node split (spec.md §4.2).

use crate::rng::fisher_yates_shuffle;
use crate::types::MaxFeatures;
use rand_chacha::ChaCha8Rng;

/// Draws `m` distinct feature indices from `[0, num_features)` via a
/// Fisher-Yates shuffle, taking the first `m` entries. `rng` must be
/// per-node (spec.md §4.2: "do not share RNG state across threads
/// without locking").
pub fn sample_features(num_features: usize, max_features: MaxFeatures, rng: &mut ChaCha8Rng) -> Vec<usize> {
    let m = max_features.resolve(num_features);
    let mut indices: Vec<usize> = (0..num_features).collect();
    fisher_yates_shuffle(&mut indices, rng);
    indices.truncate(m);
    indices
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::node_rng;

    #[test]
    fn sqrt_resolves_and_samples_distinct_indices() {
        let mut rng = node_rng(7, 0);
        let picked = sample_features(10, MaxFeatures::Sqrt, &mut rng);
        assert_eq!(picked.len(), 3); // floor(sqrt(10)) = 3
        let mut sorted = picked.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), picked.len());
        assert!(picked.iter().all(|&i| i < 10));
    }

    #[test]
    fn fixed_is_clamped_to_feature_count() {
        assert_eq!(MaxFeatures::Fixed(999).resolve(5), 5);
        assert_eq!(MaxFeatures::Fixed(0).resolve(5), 1);
    }
}
