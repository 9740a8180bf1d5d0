use thiserror::Error;

/// Result type for `forest-core` operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("empty training dataset")]
    EmptyTrainingSet,

    #[error("empty test dataset")]
    EmptyTestSet,

    #[error("feature dimensions mismatch: dataset has {got} columns, expected {expected}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("num_classes must be positive, got {0}")]
    InvalidNumClasses(i64),

    #[error("train_proportion must lie in (0, 1), got {0}")]
    InvalidTrainProportion(f64),

    #[error("train_tree_proportion must lie in (0, 1], got {0}")]
    InvalidTrainTreeProportion(f64),

    #[error("max_features must be \"sqrt\", \"log2\", or a positive integer, got {0:?}")]
    InvalidMaxFeatures(String),

    #[error("num_trees must be positive, got {0}")]
    InvalidTreeCount(i64),

    #[error("min_samples_split must be at least 2, got {0}")]
    InvalidMinSamplesSplit(i64),

    #[error("max_depth must be non-negative, got {0}")]
    InvalidMaxDepth(i64),

    #[error("a node cannot be split: fewer than 2 samples reached it")]
    DegenerateNode,

    #[error("corrupt tree buffer: {0}")]
    CorruptSerialization(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
