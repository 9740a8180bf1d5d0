//! Forest Coordinator (spec.md §4.6): tree-to-process distribution and
//! the seven-phase collective training pipeline, realized over a
//! `Communicator` so the same code path runs for one simulated rank or
//! many.

use crate::aggregate::aggregate_predictions;
use crate::comm::{Communicator, LocalPredictions};
use crate::error::Result;
use crate::timing::timed;
use forest_core::rng::{bootstrap_rng, split_rng, tree_seed};
use forest_core::sample::{sample_without_replacement, stratified_split};
use forest_core::serialize::{read_node, write_node};
use forest_core::tree::grow_tree;
use forest_core::types::{Dataset, Forest, ForestConfig, Node, Tree};
use log::info;

/// Contiguous tree-to-process distribution (spec.md §4.6): process `i`
/// gets `⌊T/P⌋ + 1` trees if `i < T mod P`, else `⌊T/P⌋`.
pub fn trees_for_rank(total_trees: usize, size: usize, rank: usize) -> usize {
    let base = total_trees / size;
    let remainder = total_trees % size;
    base + usize::from(rank < remainder)
}

fn tree_start_index(total_trees: usize, size: usize, rank: usize) -> usize {
    let base = total_trees / size;
    let remainder = total_trees % size;
    rank * base + remainder.min(rank)
}

/// Everything a run produces. Non-root ranks run the same pipeline but
/// `forest`, `predictions`, and `test_labels` are empty, since the
/// `Communicator` only delivers gathered data to rank 0 (spec.md §4.6
/// "After gather, coordinator runs the aggregator").
pub struct RunOutput {
    pub forest: Forest,
    pub predictions: Vec<i32>,
    pub test_labels: Vec<i32>,
    pub train_secs: f64,
    pub infer_secs: f64,
    pub total_secs: f64,
}

pub struct Coordinator<'a> {
    config: ForestConfig,
    comm: &'a dyn Communicator,
    pool: rayon::ThreadPool,
    base_seed: u64,
}

impl<'a> Coordinator<'a> {
    pub fn new(config: ForestConfig, comm: &'a dyn Communicator, thread_count: usize, base_seed: u64) -> Result<Self> {
        let pool = rayon::ThreadPoolBuilder::new().num_threads(thread_count.max(1)).build()?;
        Ok(Self {
            config,
            comm,
            pool,
            base_seed,
        })
    }

    /// Runs the full seven-phase pipeline (spec.md §4.6). `dataset`
    /// must be `Some` on rank 0 and `None` on every other rank.
    pub fn run(&self, dataset: Option<Dataset>, num_classes: usize, train_proportion: f64, train_tree_proportion: f64) -> RunOutput {
        let rank = self.comm.rank();
        let size = self.comm.size();

        info!("rank {rank}: phase 1 broadcasting dataset");
        let full = self.comm.broadcast_dataset(dataset);
        self.comm.barrier();
        info!("rank {rank}: phase 1 complete");

        info!("rank {rank}: phase 2 stratified split");
        let mut rng = split_rng(self.base_seed);
        let (train, test) = stratified_split(&full, train_proportion, &mut rng);
        self.comm.barrier();
        info!("rank {rank}: phase 2 complete, {} train rows, {} test rows", train.num_rows(), test.num_rows());

        let local_tree_count = trees_for_rank(self.config.num_trees, size, rank);
        let start_index = tree_start_index(self.config.num_trees, size, rank);

        info!("rank {rank}: phase 3+4 sampling and growing {local_tree_count} trees");
        let (local_trees, train_secs) = timed(|| {
            (0..local_tree_count)
                .map(|local_idx| {
                    // Keyed by global tree index, not rank: the tree a
                    // given index produces must not depend on how many
                    // ranks exist or which one happened to grow it
                    // (spec.md §8 property 5).
                    let seed = tree_seed(self.base_seed, start_index + local_idx);
                    let mut sampling_rng = bootstrap_rng(seed);
                    let sample = sample_without_replacement(&train, train_tree_proportion, &mut sampling_rng);
                    grow_tree(&sample, num_classes, &self.config, seed, Some(&self.pool))
                })
                .collect::<Vec<Tree>>()
        });
        self.comm.barrier();
        info!("rank {rank}: phase 3+4 complete in {train_secs:.3}s");

        info!("rank {rank}: phase 5 local inference over {} test rows", test.num_rows());
        let (tree_predictions, infer_secs) = timed(|| {
            local_trees
                .iter()
                .map(|tree| tree.predict(test.features()))
                .collect::<Vec<Vec<i32>>>()
        });
        self.comm.barrier();
        info!("rank {rank}: phase 5 complete in {infer_secs:.3}s");

        info!("rank {rank}: phase 6 gathering predictions");
        let gathered_predictions = self.comm.gather_predictions(LocalPredictions {
            rank,
            tree_predictions,
        });
        self.comm.barrier();
        info!("rank {rank}: phase 6 complete");

        info!("rank {rank}: phase 7 gathering trees");
        let serialized_local: Vec<Vec<u8>> = local_trees
            .iter()
            .map(|tree| {
                let mut buf = Vec::new();
                write_node(&mut buf, &tree.root).expect("in-memory write cannot fail");
                buf
            })
            .collect();
        let gathered_trees = self.comm.gather_trees(serialized_local);
        self.comm.barrier();
        info!("rank {rank}: phase 7 complete");

        let total_secs = self.comm.reduce_max_time(train_secs + infer_secs);

        if rank == 0 {
            let test_labels: Vec<i32> = (0..test.num_rows()).map(|i| test.label(i)).collect();
            let predictions = aggregate_predictions(&gathered_predictions, num_classes, test.num_rows());

            let mut trees = Vec::with_capacity(self.config.num_trees);
            for process_trees in gathered_trees {
                for bytes in process_trees {
                    let root: Node = read_node(&mut bytes.as_slice()).expect("gathered tree buffer is well-formed");
                    trees.push(Tree { root });
                }
            }

            RunOutput {
                forest: Forest {
                    config: self.config.clone(),
                    trees,
                },
                predictions,
                test_labels,
                train_secs,
                infer_secs,
                total_secs,
            }
        } else {
            RunOutput {
                forest: Forest::new(self.config.clone()),
                predictions: Vec::new(),
                test_labels: Vec::new(),
                train_secs,
                infer_secs,
                total_secs,
            }
        }
    }
}
