//! Wires the coordinator and CSV/forest-directory I/O together,
//! dispatching on whether a trained forest was supplied (spec.md §6
//! `trained_forest_path`: "If set, load forest and only run inference").

use crate::config::RunConfig;
use crate::error::Result;
use forest_core::types::Dataset;
use forest_io::metrics::{compute_per_class_metrics, ClassMetrics, Metrics};
use forest_runtime::aggregate::aggregate_predictions;
use forest_runtime::comm::LocalPredictions;
use forest_runtime::{run_ranks, Coordinator};
use log::info;
use std::path::Path;
use std::time::Instant;

fn resolve_num_classes(config: &RunConfig, dataset: &Dataset) -> usize {
    if config.num_classes > 0 {
        config.num_classes as usize
    } else {
        dataset.infer_num_classes()
    }
}

pub fn execute(config: RunConfig) -> Result<()> {
    match config.trained_forest_path.clone() {
        Some(path) => run_inference(&config, &path),
        None => run_training(&config),
    }
}

fn run_training(config: &RunConfig) -> Result<()> {
    let dataset = forest_io::read_csv_dataset(&config.dataset_path)?;
    let num_classes = resolve_num_classes(config, &dataset);

    info!(
        "training {} trees across {} simulated rank(s), {} thread(s) each",
        config.forest_config.num_trees, config.sim_processes, config.thread_count
    );

    let forest_config = config.forest_config.clone();
    let thread_count = config.thread_count;
    let seed = config.seed;
    let train_proportion = config.train_proportion;
    let train_tree_proportion = config.train_tree_proportion;

    let outputs = run_ranks(config.sim_processes, move |comm| {
        let coordinator = Coordinator::new(forest_config.clone(), &comm, thread_count, seed)?;
        let data = if comm.rank() == 0 { Some(dataset.clone()) } else { None };
        Ok::<_, forest_runtime::Error>(coordinator.run(data, num_classes, train_proportion, train_tree_proportion))
    });

    let output = outputs.into_iter().next().expect("run_ranks always produces at least one rank")?;

    forest_io::write_predictions_csv(&config.store_predictions_path, &output.test_labels, &output.predictions)?;
    forest_io::write_forest(&config.new_forest_path, &output.forest)?;

    let per_class = compute_per_class_metrics(&output.predictions, &output.test_labels, num_classes);
    let speedup = forest_runtime::timing::speedup(None, output.total_secs);
    let metrics = Metrics {
        per_class,
        train_secs: output.train_secs,
        infer_secs: output.infer_secs,
        total_secs: output.total_secs,
        speedup,
        efficiency: forest_runtime::timing::efficiency(speedup, config.sim_processes),
    };
    forest_io::write_metrics_report(&config.store_metrics_path, &metrics, 0)?;

    info!("wrote predictions, forest, and metrics for {} test rows", output.test_labels.len());
    Ok(())
}

fn run_inference(config: &RunConfig, forest_path: &Path) -> Result<()> {
    info!("loading trained forest from {}", forest_path.display());
    let forest = forest_io::read_forest(forest_path)?;
    let dataset = forest_io::read_csv_dataset(&config.dataset_path)?;
    let num_classes = resolve_num_classes(config, &dataset);

    let start = Instant::now();
    let tree_predictions: Vec<Vec<i32>> = forest.trees.iter().map(|tree| tree.predict(dataset.features())).collect();
    let infer_secs = start.elapsed().as_secs_f64();

    let local = LocalPredictions {
        rank: 0,
        tree_predictions,
    };
    let predictions = aggregate_predictions(&[local], num_classes, dataset.num_rows());
    let test_labels: Vec<i32> = (0..dataset.num_rows()).map(|i| dataset.label(i)).collect();

    forest_io::write_predictions_csv(&config.store_predictions_path, &test_labels, &predictions)?;

    let per_class: Vec<ClassMetrics> = compute_per_class_metrics(&predictions, &test_labels, num_classes);
    let metrics = Metrics {
        per_class,
        train_secs: 0.0,
        infer_secs,
        total_secs: infer_secs,
        speedup: 1.0,
        efficiency: 1.0,
    };
    forest_io::write_metrics_report(&config.store_metrics_path, &metrics, 0)?;

    info!("wrote inference-only predictions and metrics for {} rows", test_labels.len());
    Ok(())
}
