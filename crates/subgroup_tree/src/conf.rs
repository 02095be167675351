use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

use crate::thresholds::Thresholds;

pub const LOG_ENV_VAR: &str = "SUBGROUP_TREE_LOG";
pub const DEFAULT_LOG_FILTER: &str = "subgroup_tree=info";

/// Settings of an SDMap / SDMapStar run. `num_subgroups == 0` turns the
/// top-k bound off, which is plain SDMap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SdMapConfig {
    pub minimum_quality_measure_value: f64,
    pub thresholds: Thresholds,
    pub num_subgroups: usize,
    pub write_results: bool,
    pub file_path: Option<PathBuf>,
    /// Extra parameters of the quality measure.
    pub quality_parameters: HashMap<String, f64>,
    /// Extra parameters of the optimistic estimate.
    pub optimistic_estimate_parameters: HashMap<String, f64>,
}

impl Default for SdMapConfig {
    fn default() -> Self {
        Self {
            minimum_quality_measure_value: f64::NEG_INFINITY,
            thresholds: Thresholds::tp_fp(0, 0),
            num_subgroups: 0,
            write_results: false,
            file_path: None,
            quality_parameters: HashMap::new(),
            optimistic_estimate_parameters: HashMap::new(),
        }
    }
}
