//! Data preparation stages, from raw CSV to model-ready matrices.

pub mod clean;
pub mod encode;
pub mod groups;
pub mod labels;
pub mod loader;
pub mod schema;
pub mod split;
pub mod vif;

pub use clean::clean_dataset;
pub use encode::{
    add_gain_columns, decode_features, encode_features, feature_columns, feature_matrix,
    label_vector,
};
pub use groups::{compute_group_distribution, top_n_worst_groups, GroupDistribution, WorstGroup};
pub use labels::{build_labels, LabelStrategy, LabelSummary, QuantileConfig};
pub use loader::{dataset_stats, load_dataset, validate_schema};
pub use schema::{Domain, EncodingConfig};
pub use split::{take_labels, take_rows, train_test_split, SplitIndices};
pub use vif::{compute_vif, VifScore, VIF_FLAG_THRESHOLD};
