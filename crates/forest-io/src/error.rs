use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("forest-core error: {0}")]
    Core(#[from] forest_core::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV row {row} has {got} columns, expected at least {expected}")]
    MalformedRow { row: usize, expected: usize, got: usize },

    #[error("empty CSV input: no data rows after the header")]
    EmptyCsv,

    #[error("malformed forest manifest: {0}")]
    MalformedManifest(String),
}
