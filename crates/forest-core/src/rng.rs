use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Deterministic Fisher-Yates shuffle, used both by the feature sampler
/// (spec.md §4.2) and the dataset/bootstrap samplers (spec.md §4.5).
pub fn fisher_yates_shuffle<T>(items: &mut [T], rng: &mut ChaCha8Rng) {
    for i in (1..items.len()).rev() {
        let j = rng.gen_range(0..=i);
        items.swap(i, j);
    }
}

/// Builds the per-node RNG for the feature sampler. Seeded
/// deterministically from a tree-level seed and the node's position in
/// the left-before-right DFS traversal, so growth order is reproducible
/// regardless of which thread executes a given split search
/// (spec.md §4.2, §5 determinism).
pub fn node_rng(tree_seed: u64, node_ordinal: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(tree_seed.wrapping_mul(0x9E37_79B9_7F4A_7C15).wrapping_add(node_ordinal))
}

/// Builds the RNG for the one stratified split every rank computes
/// redundantly (spec.md §4.6 phase 2). Depends only on `base_seed`,
/// never on rank or process count.
pub fn split_rng(base_seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(base_seed)
}

/// Derives the seed for global tree `tree_index`, independent of which
/// rank grows it or how many ranks exist. Tree-to-rank distribution is
/// contiguous and changes shape with `P` (spec.md §4.6), so keying a
/// tree's randomness by rank would make the tree itself depend on `P`;
/// keying by its global index makes the whole forest, and therefore
/// the aggregated vote, invariant to `P` and `n_threads` (spec.md §8
/// property 5, scenario S3).
pub fn tree_seed(base_seed: u64, tree_index: usize) -> u64 {
    base_seed
        .wrapping_add(tree_index as u64)
        .wrapping_mul(0xBF58_476D_1CE4_E5B9)
}

/// Builds the RNG a tree uses to draw its bootstrap-like sample.
/// Salted against `node_rng`'s multiplier so the two streams derived
/// from the same `tree_seed` never coincide.
pub fn bootstrap_rng(tree_seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(tree_seed ^ 0xD1B5_4A32_D192_ED03)
}
