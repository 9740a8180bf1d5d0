pub mod dataset;
pub mod feature_sampler;

pub use dataset::{sample_without_replacement, stratified_split};
pub use feature_sampler::sample_features;
