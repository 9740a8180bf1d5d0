//! CSV dataset reader and predictions writer (spec.md §6 "External
//! interfaces").

use crate::error::{Error, Result};
use forest_core::types::Dataset;
use ndarray::Array2;
use std::path::Path;

/// Reads a CSV file into a `Dataset`: a header row (skipped) followed
/// by comma-separated floats, last column the integer label cast from
/// float (spec.md §6 "CSV input format").
pub fn read_csv_dataset(path: impl AsRef<Path>) -> Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new().has_headers(true).from_path(path)?;

    let mut rows: Vec<Vec<f32>> = Vec::new();
    let mut num_columns = None;
    for (row_index, record) in reader.records().enumerate() {
        let record = record?;
        let values: Vec<f32> = record
            .iter()
            .map(|field| field.trim().parse::<f32>())
            .collect::<std::result::Result<_, _>>()
            .map_err(|_| Error::MalformedRow {
                row: row_index + 1,
                expected: num_columns.unwrap_or(record.len()),
                got: record.len(),
            })?;

        match num_columns {
            None => num_columns = Some(values.len()),
            Some(expected) if expected != values.len() => {
                return Err(Error::MalformedRow {
                    row: row_index + 1,
                    expected,
                    got: values.len(),
                })
            }
            _ => {}
        }
        rows.push(values);
    }

    let num_columns = num_columns.ok_or(Error::EmptyCsv)?;
    let mut array = Array2::<f32>::zeros((rows.len(), num_columns));
    for (i, row) in rows.into_iter().enumerate() {
        for (j, value) in row.into_iter().enumerate() {
            array[[i, j]] = value;
        }
    }

    Ok(Dataset::from_array(array)?)
}

/// Writes predictions as `true_label,predicted_label` rows, one per
/// test sample in test-set order (spec.md §6 "Predictions output").
pub fn write_predictions_csv(path: impl AsRef<Path>, true_labels: &[i32], predictions: &[i32]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_path(path)?;
    writer.write_record(["true_label", "predicted_label"])?;
    for (&truth, &pred) in true_labels.iter().zip(predictions) {
        writer.write_record([truth.to_string(), pred.to_string()])?;
    }
    writer.flush()?;
    Ok(())
}
