//! Stratified train/test split and per-tree bootstrap-like sampling
//! (spec.md §4.5).

use crate::rng::fisher_yates_shuffle;
use crate::types::Dataset;
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeMap;

/// Buckets row indices by class label, in ascending class order, so
/// the split is reproducible regardless of row order in `dataset`.
fn bucket_by_class(dataset: &Dataset) -> BTreeMap<i32, Vec<usize>> {
    let mut buckets: BTreeMap<i32, Vec<usize>> = BTreeMap::new();
    for i in 0..dataset.num_rows() {
        buckets.entry(dataset.label(i)).or_default().push(i);
    }
    buckets
}

/// Splits `dataset` into train/test preserving per-class proportions
/// (spec.md §4.5 "Stratified split"). `train_proportion` must already
/// be validated to lie in `(0, 1)`.
pub fn stratified_split(dataset: &Dataset, train_proportion: f64, rng: &mut ChaCha8Rng) -> (Dataset, Dataset) {
    let buckets = bucket_by_class(dataset);
    let mut train_parts = Vec::new();
    let mut test_parts = Vec::new();

    for (_, mut indices) in buckets {
        fisher_yates_shuffle(&mut indices, rng);
        let n_train = (indices.len() as f64 * train_proportion).floor() as usize;
        let (train_idx, test_idx) = indices.split_at(n_train);
        train_parts.push(dataset.select_rows(train_idx));
        test_parts.push(dataset.select_rows(test_idx));
    }

    (Dataset::concat_rows(&train_parts), Dataset::concat_rows(&test_parts))
}

/// Draws a per-tree training sample without replacement: `floor(|train|
/// * train_tree_proportion)` distinct rows via Fisher-Yates + prefix
/// (spec.md §4.5 "Per-tree bootstrap-like sampling").
pub fn sample_without_replacement(dataset: &Dataset, train_tree_proportion: f64, rng: &mut ChaCha8Rng) -> Dataset {
    let n = dataset.num_rows();
    let sample_size = (n as f64 * train_tree_proportion).floor() as usize;
    let mut indices: Vec<usize> = (0..n).collect();
    fisher_yates_shuffle(&mut indices, rng);
    indices.truncate(sample_size);
    dataset.select_rows(&indices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use ndarray::Array2;

    fn dataset_with_counts(counts: &[(i32, usize)]) -> Dataset {
        let total: usize = counts.iter().map(|(_, n)| n).sum();
        let mut arr = Array2::<f32>::zeros((total, 2));
        let mut row = 0;
        for &(label, n) in counts {
            for _ in 0..n {
                arr[[row, 0]] = row as f32;
                arr[[row, 1]] = label as f32;
                row += 1;
            }
        }
        Dataset::from_array(arr).unwrap()
    }

    #[test]
    fn stratified_split_preserves_class_proportions() {
        // S5: {0:60, 1:30, 2:10}, train_proportion=0.8 -> {48,24,8} / {12,6,2}
        let dataset = dataset_with_counts(&[(0, 60), (1, 30), (2, 10)]);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let (train, test) = stratified_split(&dataset, 0.8, &mut rng);

        let mut train_counts = BTreeMap::<i32, usize>::new();
        for i in 0..train.num_rows() {
            *train_counts.entry(train.label(i)).or_default() += 1;
        }
        let mut test_counts = BTreeMap::<i32, usize>::new();
        for i in 0..test.num_rows() {
            *test_counts.entry(test.label(i)).or_default() += 1;
        }

        assert_eq!(train_counts[&0], 48);
        assert_eq!(train_counts[&1], 24);
        assert_eq!(train_counts[&2], 8);
        assert_eq!(test_counts[&0], 12);
        assert_eq!(test_counts[&1], 6);
        assert_eq!(test_counts[&2], 2);
    }

    #[test]
    fn bootstrap_sample_is_distinct_and_correctly_sized() {
        let dataset = dataset_with_counts(&[(0, 100)]);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let sampled = sample_without_replacement(&dataset, 0.75, &mut rng);
        assert_eq!(sampled.num_rows(), 75);

        let mut seen = std::collections::HashSet::new();
        for i in 0..sampled.num_rows() {
            assert!(seen.insert(sampled.row(i)[0].to_bits()));
        }
    }

    #[test]
    fn different_seeds_sample_differently() {
        let dataset = dataset_with_counts(&[(0, 50), (1, 50)]);
        let mut rng0 = ChaCha8Rng::seed_from_u64(42);
        let mut rng1 = ChaCha8Rng::seed_from_u64(43);
        let s0 = sample_without_replacement(&dataset, 0.5, &mut rng0);
        let s1 = sample_without_replacement(&dataset, 0.5, &mut rng1);
        let rows0: Vec<f32> = (0..s0.num_rows()).map(|i| s0.row(i)[0]).collect();
        let rows1: Vec<f32> = (0..s1.num_rows()).map(|i| s1.row(i)[0]).collect();
        assert_ne!(rows0, rows1);
    }

    proptest::proptest! {
        #![proptest_config(proptest::prelude::ProptestConfig::with_cases(64))]

        /// Property 6 (spec.md §8): for every class `c`, `|train_c| =
        /// floor(n_c * rho)` and `|test_c| = n_c - |train_c|`.
        #[test]
        fn prop_stratified_split_matches_formula(
            counts in proptest::collection::vec(1usize..40, 1..5),
            rho_pct in 10u32..95,
            seed in proptest::prelude::any::<u64>(),
        ) {
            let rho = rho_pct as f64 / 100.0;
            let class_counts: Vec<(i32, usize)> = counts.iter().enumerate().map(|(c, &n)| (c as i32, n)).collect();
            let dataset = dataset_with_counts(&class_counts);
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let (train, test) = stratified_split(&dataset, rho, &mut rng);

            let mut train_counts = BTreeMap::<i32, usize>::new();
            for i in 0..train.num_rows() {
                *train_counts.entry(train.label(i)).or_default() += 1;
            }
            let mut test_counts = BTreeMap::<i32, usize>::new();
            for i in 0..test.num_rows() {
                *test_counts.entry(test.label(i)).or_default() += 1;
            }

            for &(class, n) in &class_counts {
                let expected_train = (n as f64 * rho).floor() as usize;
                let expected_test = n - expected_train;
                proptest::prop_assert_eq!(*train_counts.get(&class).unwrap_or(&0), expected_train);
                proptest::prop_assert_eq!(*test_counts.get(&class).unwrap_or(&0), expected_test);
            }
        }

        /// Property 8 (spec.md §8): sampled row indices are pairwise
        /// distinct and the sample size is `floor(N * train_tree_proportion)`.
        #[test]
        fn prop_sample_without_replacement_is_distinct_and_sized(
            n in 2usize..200,
            prop_pct in 1u32..100,
            seed in proptest::prelude::any::<u64>(),
        ) {
            let prop = prop_pct as f64 / 100.0;
            let dataset = dataset_with_counts(&[(0, n)]);
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let sampled = sample_without_replacement(&dataset, prop, &mut rng);

            let expected_size = (n as f64 * prop).floor() as usize;
            proptest::prop_assert_eq!(sampled.num_rows(), expected_size);

            let mut seen = std::collections::HashSet::new();
            for i in 0..sampled.num_rows() {
                proptest::prop_assert!(seen.insert(sampled.row(i)[0].to_bits()));
            }
        }
    }
}
