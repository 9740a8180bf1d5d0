//! Parallel runtime glue: the distributed-memory `Communicator` axis
//! and the shared-memory `rayon` thread pool the Forest Coordinator
//! drives both through (spec.md §5, §9').

pub mod aggregate;
pub mod comm;
pub mod coordinator;
pub mod error;
pub mod timing;

pub use comm::{run_ranks, Communicator, LocalCommunicator, LocalPredictions, SerializedTree};
pub use coordinator::{Coordinator, RunOutput};
pub use error::{Error, Result};
