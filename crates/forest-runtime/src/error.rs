use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("forest-core error: {0}")]
    Core(#[from] forest_core::Error),

    #[error("num_processes must be positive, got {0}")]
    InvalidProcessCount(i64),

    #[error("thread_count must be positive, got {0}")]
    InvalidThreadCount(i64),

    #[error("a rank's peer channel disconnected before the run finished")]
    PeerDisconnected,

    #[error("failed to build the per-rank thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}
