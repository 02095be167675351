//! Error types. One enum per concern, wrapped by [`SubgroupError`].

use polars::prelude::PolarsError;

/// Invalid run configuration, raised before any mining work.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Inconsistent thresholds: {0}")]
    InconsistentThreshold(String),

    #[error("Threshold '{name}' must be non-negative, got {value}")]
    NegativeThreshold { name: &'static str, value: i64 },

    #[error("'{estimate}' is not an optimistic estimate of '{measure}'")]
    IncompatibleOptimisticEstimate { estimate: String, measure: String },

    #[error("Measure '{measure}' requires the parameter '{parameter}'")]
    MissingParameter { measure: String, parameter: String },

    #[error("Unknown quality measure '{0}'")]
    UnknownMeasure(String),

    #[error("write_results is enabled but no file_path was given")]
    MissingOutputPath,
}

/// Problems with the input dataset.
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error("Attribute '{attribute}' has dtype {dtype}, only categorical attributes are supported")]
    AttributeType { attribute: String, dtype: String },

    #[error("Attribute '{attribute}' contains {count} missing values")]
    MissingValues { attribute: String, count: usize },

    #[error("Target attribute '{0}' not found in the dataset")]
    TargetAttributeNotFound(String),

    #[error("Target value '{value}' does not occur in attribute '{attribute}'")]
    TargetValueNotFound { attribute: String, value: String },

    #[error(transparent)]
    Polars(#[from] PolarsError),
}

/// Selector bookkeeping errors inside a tree. Never expected during a normal run.
#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    #[error("Node already has a child with selector {0}")]
    DuplicateChild(String),

    #[error("Node has no child with selector {0}")]
    NotFound(String),

    #[error("The root sentinel cannot be attached as a child")]
    RootAsChild,

    #[error("Selector {0} is not in the header table")]
    HeaderEntryNotFound(String),
}

#[derive(Debug, thiserror::Error)]
pub enum SubgroupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Data(#[from] DataError),

    #[error(transparent)]
    Tree(#[from] TreeError),

    #[error("Could not parse subgroup: {0}")]
    Parse(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl From<PolarsError> for SubgroupError {
    fn from(err: PolarsError) -> Self {
        SubgroupError::Data(DataError::Polars(err))
    }
}

pub type SubgroupResult<T> = Result<T, SubgroupError>;
