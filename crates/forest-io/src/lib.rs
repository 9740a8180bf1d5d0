//! Thin I/O wrappers the distilled spec calls out of scope but that a
//! complete binary still needs: CSV dataset/predictions, the forest
//! on-disk layout, and the plain-text metrics report.

pub mod csv_io;
pub mod error;
pub mod forest_dir;
pub mod metrics;

pub use csv_io::{read_csv_dataset, write_predictions_csv};
pub use error::{Error, Result};
pub use forest_dir::{read_forest, write_forest};
pub use metrics::{compute_per_class_metrics, write_metrics_report, ClassMetrics, Metrics};
