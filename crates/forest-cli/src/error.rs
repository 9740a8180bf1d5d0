use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

/// Top-level error composed from every crate in the workspace
/// (spec.md §7, grounded on `blocks-ml-class/src/algorithms/
/// random_forest.rs`'s `TreeError(#[from] DecisionTreeError)`
/// composition pattern).
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] forest_core::Error),

    #[error(transparent)]
    Runtime(#[from] forest_runtime::Error),

    #[error(transparent)]
    Io(#[from] forest_io::Error),
}
