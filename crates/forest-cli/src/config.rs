//! Validated, typed CLI configuration (SPEC_FULL.md §3 `RunConfig`).
//! Parsed once via `clap` derive; every rank parses identical argv
//! (spec.md §9 Open Question 2, original_source/mpi/main.c).

use clap::Parser;
use forest_core::types::ForestConfig;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "forest-cli", about = "Parallel random forest training and inference")]
pub struct Cli {
    #[arg(long, default_value = "data/classification_dataset.csv")]
    pub dataset_path: PathBuf,

    /// `0` means "infer as max(label)+1" (spec.md §6).
    #[arg(long, default_value_t = 0)]
    pub num_classes: i64,

    #[arg(long, default_value_t = 10)]
    pub num_trees: i64,

    #[arg(long, default_value_t = 10)]
    pub max_depth: i64,

    #[arg(long, default_value_t = 2)]
    pub min_samples_split: i64,

    #[arg(long, default_value = "sqrt")]
    pub max_features: String,

    #[arg(long, default_value_t = 0.8)]
    pub train_proportion: f64,

    #[arg(long, default_value_t = 0.75)]
    pub train_tree_proportion: f64,

    #[arg(long, default_value_t = 0)]
    pub seed: u64,

    #[arg(long, default_value_t = 1)]
    pub thread_count: usize,

    #[arg(long)]
    pub trained_forest_path: Option<PathBuf>,

    #[arg(long, default_value = "output/model")]
    pub new_forest_path: PathBuf,

    #[arg(long, default_value = "output/predictions.csv")]
    pub store_predictions_path: PathBuf,

    #[arg(long, default_value = "output/metrics_output.txt")]
    pub store_metrics_path: PathBuf,

    /// Ambient addition (SPEC_FULL.md §6): number of simulated ranks to
    /// run within this one OS process via `LocalCommunicator`.
    #[arg(long, default_value_t = 1)]
    pub sim_processes: usize,

    /// Ambient addition (SPEC_FULL.md §6): forwarded to `env_logger`.
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

/// The fully validated, typed form of the CLI flags.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub dataset_path: PathBuf,
    pub num_classes: i64,
    pub forest_config: ForestConfig,
    pub train_proportion: f64,
    pub train_tree_proportion: f64,
    pub seed: u64,
    pub thread_count: usize,
    pub trained_forest_path: Option<PathBuf>,
    pub new_forest_path: PathBuf,
    pub store_predictions_path: PathBuf,
    pub store_metrics_path: PathBuf,
    pub sim_processes: usize,
}

impl RunConfig {
    /// Validates every flag before any parallel work starts (spec.md
    /// §7 "configuration errors reported before any parallel work").
    pub fn from_cli(cli: Cli) -> crate::error::Result<Self> {
        if !(cli.train_proportion > 0.0 && cli.train_proportion < 1.0) {
            return Err(forest_core::Error::InvalidTrainProportion(cli.train_proportion).into());
        }
        if !(cli.train_tree_proportion > 0.0 && cli.train_tree_proportion <= 1.0) {
            return Err(forest_core::Error::InvalidTrainTreeProportion(cli.train_tree_proportion).into());
        }
        if cli.thread_count == 0 {
            return Err(forest_runtime::Error::InvalidThreadCount(cli.thread_count as i64).into());
        }
        if cli.sim_processes == 0 {
            return Err(forest_runtime::Error::InvalidProcessCount(cli.sim_processes as i64).into());
        }

        let forest_config = ForestConfig::validate(cli.num_trees, cli.max_depth, cli.min_samples_split, &cli.max_features)?;

        Ok(Self {
            dataset_path: cli.dataset_path,
            num_classes: cli.num_classes,
            forest_config,
            train_proportion: cli.train_proportion,
            train_tree_proportion: cli.train_tree_proportion,
            seed: cli.seed,
            thread_count: cli.thread_count,
            trained_forest_path: cli.trained_forest_path,
            new_forest_path: cli.new_forest_path,
            store_predictions_path: cli.store_predictions_path,
            store_metrics_path: cli.store_metrics_path,
            sim_processes: cli.sim_processes,
        })
    }
}
