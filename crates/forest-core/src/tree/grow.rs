//! Recursive node expansion: the `Fresh -> Splitting -> (Internal |
//! Leaf)` state machine of spec.md §4.4.

use crate::entropy::argmax_class;
use crate::rng::node_rng;
use crate::split::find_best_split;
use crate::types::{Dataset, ForestConfig, Node, Tree};

fn label_counts(dataset: &Dataset, num_classes: usize) -> Vec<i32> {
    let mut counts = vec![0i32; num_classes];
    for i in 0..dataset.num_rows() {
        counts[dataset.label(i) as usize] += 1;
    }
    counts
}

fn majority_class(dataset: &Dataset, num_classes: usize) -> i32 {
    argmax_class(&label_counts(dataset, num_classes))
}

fn is_pure(dataset: &Dataset) -> bool {
    let first = dataset.label(0);
    (1..dataset.num_rows()).all(|i| dataset.label(i) == first)
}

fn partition_indices(dataset: &Dataset, feature: usize, threshold: f32) -> (Vec<usize>, Vec<usize>) {
    let mut left = Vec::new();
    let mut right = Vec::new();
    for i in 0..dataset.num_rows() {
        if dataset.row(i)[feature] <= threshold {
            left.push(i);
        } else {
            right.push(i);
        }
    }
    (left, right)
}

/// Grows a full tree from a training sample. `seed` is the tree-level
/// seed (spec.md §4.2) used to derive each node's feature-sampling RNG.
pub fn grow_tree(
    train: &Dataset,
    num_classes: usize,
    config: &ForestConfig,
    seed: u64,
    pool: Option<&rayon::ThreadPool>,
) -> Tree {
    let mut ordinal = 0u64;
    let root = grow_node(train, 0, f64::INFINITY, num_classes, config, seed, &mut ordinal, pool);
    Tree { root }
}

fn grow_node(
    rows: &Dataset,
    depth: usize,
    entropy_bound: f64,
    num_classes: usize,
    config: &ForestConfig,
    seed: u64,
    ordinal: &mut u64,
    pool: Option<&rayon::ThreadPool>,
) -> Node {
    let p = rows.num_rows();
    let pred = majority_class(rows, num_classes);

    if p < config.min_samples_split || depth >= config.max_depth || is_pure(rows) {
        return Node::leaf(pred, depth, entropy_bound as f32, p);
    }

    let mut rng = node_rng(seed, *ordinal);
    *ordinal += 1;

    let Some(split) = find_best_split(rows, num_classes, config.max_features, entropy_bound, &mut rng, pool) else {
        return Node::leaf(pred, depth, entropy_bound as f32, p);
    };

    let (left_idx, right_idx) = partition_indices(rows, split.feature_index, split.threshold);
    let left_rows = rows.select_rows(&left_idx);
    let right_rows = rows.select_rows(&right_idx);

    let left = grow_node(&left_rows, depth + 1, split.entropy, num_classes, config, seed, ordinal, pool);
    let right = grow_node(&right_rows, depth + 1, split.entropy, num_classes, config, seed, ordinal, pool);

    Node {
        feature: split.feature_index as i32,
        threshold: split.threshold,
        left: Some(Box::new(left)),
        right: Some(Box::new(right)),
        pred,
        entropy: split.entropy as f32,
        depth,
        num_samples: p,
    }
}
