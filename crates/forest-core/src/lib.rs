//! Core sequential algorithms for the parallel random forest engine:
//! entropy split search, feature/dataset sampling, tree growth, and
//! the portable tree serializer. Parallel-runtime glue (process
//! enumeration, broadcast, gather) lives in `forest-runtime`.

pub mod entropy;
pub mod error;
pub mod rng;
pub mod sample;
pub mod serialize;
pub mod split;
pub mod tree;
pub mod types;

pub use error::{Error, Result};
pub use types::{BestSplit, Dataset, Forest, ForestConfig, MaxFeatures, Node, Tree};
