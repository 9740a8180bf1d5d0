//! Per-class accuracy/precision/recall and the plain-text metrics
//! report (spec.md §6 "Metrics output", grounded on
//! `original_source/mpi/src/metrics.c`'s `compute_metrics`).

use crate::error::Result;
use std::io::Write;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassMetrics {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
}

/// Overall run metrics: per-class scores plus the timing breakdown
/// (SPEC_FULL.md §3 `Metrics`).
#[derive(Debug, Clone)]
pub struct Metrics {
    pub per_class: Vec<ClassMetrics>,
    pub train_secs: f64,
    pub infer_secs: f64,
    pub total_secs: f64,
    pub speedup: f64,
    pub efficiency: f64,
}

/// Computes per-class accuracy/precision/recall from aligned
/// predictions and ground-truth labels (spec.md §4.7 caller contract:
/// both arrays have the same length and lie in `[0, num_classes)`).
pub fn compute_per_class_metrics(predictions: &[i32], targets: &[i32], num_classes: usize) -> Vec<ClassMetrics> {
    let mut correct = vec![0u64; num_classes];
    let mut total = vec![0u64; num_classes];
    let mut true_positive = vec![0u64; num_classes];
    let mut false_positive = vec![0u64; num_classes];

    for (&pred, &truth) in predictions.iter().zip(targets) {
        let truth_idx = truth as usize;
        total[truth_idx] += 1;
        if pred == truth {
            correct[truth_idx] += 1;
            true_positive[truth_idx] += 1;
        } else if pred >= 0 && (pred as usize) < num_classes {
            false_positive[pred as usize] += 1;
        }
    }

    (0..num_classes)
        .map(|c| {
            let accuracy = if total[c] > 0 { correct[c] as f64 / total[c] as f64 } else { 0.0 };
            let denom_precision = true_positive[c] + false_positive[c];
            let precision = if denom_precision > 0 {
                true_positive[c] as f64 / denom_precision as f64
            } else {
                0.0
            };
            let recall = if total[c] > 0 { true_positive[c] as f64 / total[c] as f64 } else { 0.0 };
            ClassMetrics {
                accuracy,
                precision,
                recall,
            }
        })
        .collect()
}

/// Writes the plain-text metrics report: per-class lines separated by
/// an asterisk rule, followed by a timestamp and the writer's rank
/// (spec.md §6; exact field order and separator grounded on
/// `original_source/mpi/src/metrics.c`'s `compute_metrics`).
pub fn write_metrics_report(path: impl AsRef<Path>, metrics: &Metrics, rank: usize) -> Result<()> {
    let mut file = std::io::BufWriter::new(std::fs::File::create(path)?);
    for (i, class_metrics) in metrics.per_class.iter().enumerate() {
        writeln!(file, "Accuracy for class {i}: {:.6}", class_metrics.accuracy)?;
        writeln!(file, "Precision for class {i}: {:.6}", class_metrics.precision)?;
        writeln!(file, "Recall for class {i}: {:.6}", class_metrics.recall)?;
        writeln!(file, "*********************")?;
    }
    writeln!(file, "Train seconds: {:.6}", metrics.train_secs)?;
    writeln!(file, "Infer seconds: {:.6}", metrics.infer_secs)?;
    writeln!(file, "Total seconds: {:.6}", metrics.total_secs)?;
    writeln!(file, "Speedup: {:.6}", metrics.speedup)?;
    writeln!(file, "Efficiency: {:.6}", metrics.efficiency)?;
    writeln!(file, "*********************")?;

    let timestamp = chrono::Utc::now().to_rfc3339();
    write!(file, "Timestamp: {timestamp}\n Process that wrote the file: {rank}")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn perfect_predictions_score_one_everywhere() {
        let predictions = [0, 1, 1, 0];
        let targets = [0, 1, 1, 0];
        let metrics = compute_per_class_metrics(&predictions, &targets, 2);
        for m in metrics {
            assert_eq!(m.accuracy, 1.0);
            assert_eq!(m.precision, 1.0);
            assert_eq!(m.recall, 1.0);
        }
    }

    #[test]
    fn mixed_predictions_match_hand_computed_scores() {
        // class 0: 2 true, 1 predicted correctly -> recall 0.5
        // class 1: 2 true, both predicted correctly -> recall 1.0, but one
        // false positive from class 0 drags precision to 2/3.
        let predictions = [0, 1, 1, 1];
        let targets = [0, 0, 1, 1];
        let metrics = compute_per_class_metrics(&predictions, &targets, 2);
        assert_eq!(metrics[0].recall, 0.5);
        assert_eq!(metrics[1].recall, 1.0);
        assert_abs_diff_eq!(metrics[1].precision, 2.0 / 3.0, epsilon = 1e-9);
    }

    #[test]
    fn report_round_trips_to_disk() {
        let metrics = Metrics {
            per_class: vec![ClassMetrics {
                accuracy: 1.0,
                precision: 1.0,
                recall: 1.0,
            }],
            train_secs: 0.1,
            infer_secs: 0.01,
            total_secs: 0.11,
            speedup: 1.0,
            efficiency: 1.0,
        };
        let file = tempfile::NamedTempFile::new().unwrap();
        write_metrics_report(file.path(), &metrics, 0).unwrap();
        let contents = std::fs::read_to_string(file.path()).unwrap();
        assert!(contents.contains("Accuracy for class 0: 1.000000"));
        assert!(contents.contains("*********************"));
        assert!(contents.contains("Process that wrote the file: 0"));
    }
}
