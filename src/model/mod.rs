//! Random forest classifier and its evaluation metrics.

pub mod forest;
pub mod metrics;
pub mod multi;
mod tree;

pub use forest::{RandomForest, RandomForestConfig};
pub use metrics::{ClassMetrics, ConfusionMatrix};
pub use multi::MultiOutputForest;
