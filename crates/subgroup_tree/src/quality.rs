//! Quality measures and optimistic estimates.
//!
//! A measure scores a subgroup from its `(tp, fp)` and the dataset's
//! `(TP, FP)`. An optimistic estimate is a measure that also declares which
//! quality measures it bounds from above for every refinement of a pattern.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

use crate::errors::ConfigError;
use crate::node::Counts;

/// Arguments passed to [`QualityMeasure::compute`].
#[derive(Debug, Clone, Copy)]
pub struct MeasureParams<'a> {
    pub tp: f64,
    pub fp: f64,
    pub tp_total: f64,
    pub fp_total: f64,
    pub extra: Option<&'a HashMap<String, f64>>,
}

impl<'a> MeasureParams<'a> {
    pub fn new(counts: Counts, totals: Counts) -> Self {
        Self {
            tp: counts.tp as f64,
            fp: counts.fp as f64,
            tp_total: totals.tp as f64,
            fp_total: totals.fp as f64,
            extra: None,
        }
    }

    pub fn with_extra(mut self, extra: &'a HashMap<String, f64>) -> Self {
        self.extra = Some(extra);
        self
    }

    /// Look a parameter up by name: `tp`, `fp`, `TP`, `FP` or any extra.
    pub fn get(&self, name: &str) -> Option<f64> {
        match name {
            "tp" => Some(self.tp),
            "fp" => Some(self.fp),
            "TP" => Some(self.tp_total),
            "FP" => Some(self.fp_total),
            other => self.extra.and_then(|m| m.get(other).copied()),
        }
    }

    fn dataset_size(&self) -> f64 {
        self.tp_total + self.fp_total
    }

    fn target_share(&self) -> f64 {
        let n = self.dataset_size();
        if n == 0.0 { 0.0 } else { self.tp_total / n }
    }
}

pub trait QualityMeasure: Send + Sync {
    fn name(&self) -> &str;

    fn compute(&self, params: &MeasureParams) -> f64;

    /// Names of the quality measures this measure is a valid optimistic estimate of.
    fn optimistic_estimate_of(&self) -> &[&str] {
        &[]
    }

    /// Extra parameters, beyond `tp`, `fp`, `TP` and `FP`, that `compute` reads.
    fn required_parameters(&self) -> &[&str] {
        &[]
    }

    fn is_optimistic_estimate_of(&self, measure: &dyn QualityMeasure) -> bool {
        self.optimistic_estimate_of()
            .iter()
            .any(|name| *name == measure.name())
    }
}

/// Weighted relative accuracy: `(n/N) * (tp/n - TP/N)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct WRAcc;

impl QualityMeasure for WRAcc {
    fn name(&self) -> &str {
        "WRAcc"
    }

    fn compute(&self, params: &MeasureParams) -> f64 {
        let total = params.dataset_size();
        let n = params.tp + params.fp;
        if total == 0.0 || n == 0.0 {
            return 0.0;
        }
        (n / total) * (params.tp / n - params.target_share())
    }
}

/// WRAcc of the best refinement: all `fp` removed, all `tp` kept.
#[derive(Debug, Clone, Copy, Default)]
pub struct WRAccOptimisticEstimate1;

impl QualityMeasure for WRAccOptimisticEstimate1 {
    fn name(&self) -> &str {
        "WRAccOptimisticEstimate1"
    }

    fn compute(&self, params: &MeasureParams) -> f64 {
        let total = params.dataset_size();
        if total == 0.0 {
            return 0.0;
        }
        (params.tp / total) * (1.0 - params.target_share())
    }

    fn optimistic_estimate_of(&self) -> &[&str] {
        &["WRAcc"]
    }
}

/// `n * (tp/n - TP/N)`
#[derive(Debug, Clone, Copy, Default)]
pub struct PiatetskyShapiro;

impl QualityMeasure for PiatetskyShapiro {
    fn name(&self) -> &str {
        "PiatetskyShapiro"
    }

    fn compute(&self, params: &MeasureParams) -> f64 {
        let n = params.tp + params.fp;
        if n == 0.0 {
            return 0.0;
        }
        n * (params.tp / n - params.target_share())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PiatetskyShapiroOptimisticEstimate;

impl QualityMeasure for PiatetskyShapiroOptimisticEstimate {
    fn name(&self) -> &str {
        "PiatetskyShapiroOptimisticEstimate"
    }

    fn compute(&self, params: &MeasureParams) -> f64 {
        params.tp * (1.0 - params.target_share())
    }

    fn optimistic_estimate_of(&self) -> &[&str] {
        &["PiatetskyShapiro"]
    }
}

/// `tp / TP`. Never grows under refinement, so it bounds itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sensitivity;

impl QualityMeasure for Sensitivity {
    fn name(&self) -> &str {
        "Sensitivity"
    }

    fn compute(&self, params: &MeasureParams) -> f64 {
        if params.tp_total == 0.0 {
            0.0
        } else {
            params.tp / params.tp_total
        }
    }

    fn optimistic_estimate_of(&self) -> &[&str] {
        &["Sensitivity"]
    }
}

/// `n / N`. Never grows under refinement, so it bounds itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct Support;

impl QualityMeasure for Support {
    fn name(&self) -> &str {
        "Support"
    }

    fn compute(&self, params: &MeasureParams) -> f64 {
        let total = params.dataset_size();
        if total == 0.0 {
            0.0
        } else {
            (params.tp + params.fp) / total
        }
    }

    fn optimistic_estimate_of(&self) -> &[&str] {
        &["Support"]
    }
}

/// Generalization quotient `tp / (fp + g)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Qg;

impl QualityMeasure for Qg {
    fn name(&self) -> &str {
        "Qg"
    }

    fn compute(&self, params: &MeasureParams) -> f64 {
        let g = params.get("g").unwrap_or(f64::NAN);
        params.tp / (params.fp + g)
    }

    fn required_parameters(&self) -> &[&str] {
        &["g"]
    }
}

/// `tp / g`
#[derive(Debug, Clone, Copy, Default)]
pub struct QgOptimisticEstimate;

impl QualityMeasure for QgOptimisticEstimate {
    fn name(&self) -> &str {
        "QgOptimisticEstimate"
    }

    fn compute(&self, params: &MeasureParams) -> f64 {
        let g = params.get("g").unwrap_or(f64::NAN);
        params.tp / g
    }

    fn optimistic_estimate_of(&self) -> &[&str] {
        &["Qg"]
    }

    fn required_parameters(&self) -> &[&str] {
        &["g"]
    }
}

/// Registry of the built-in measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MeasureKind {
    WRAcc,
    WRAccOptimisticEstimate1,
    PiatetskyShapiro,
    PiatetskyShapiroOptimisticEstimate,
    Sensitivity,
    Support,
    Qg,
    QgOptimisticEstimate,
}

impl MeasureKind {
    pub const ALL: [MeasureKind; 8] = [
        MeasureKind::WRAcc,
        MeasureKind::WRAccOptimisticEstimate1,
        MeasureKind::PiatetskyShapiro,
        MeasureKind::PiatetskyShapiroOptimisticEstimate,
        MeasureKind::Sensitivity,
        MeasureKind::Support,
        MeasureKind::Qg,
        MeasureKind::QgOptimisticEstimate,
    ];

    pub fn build(&self) -> Box<dyn QualityMeasure> {
        match self {
            MeasureKind::WRAcc => Box::new(WRAcc),
            MeasureKind::WRAccOptimisticEstimate1 => Box::new(WRAccOptimisticEstimate1),
            MeasureKind::PiatetskyShapiro => Box::new(PiatetskyShapiro),
            MeasureKind::PiatetskyShapiroOptimisticEstimate => {
                Box::new(PiatetskyShapiroOptimisticEstimate)
            }
            MeasureKind::Sensitivity => Box::new(Sensitivity),
            MeasureKind::Support => Box::new(Support),
            MeasureKind::Qg => Box::new(Qg),
            MeasureKind::QgOptimisticEstimate => Box::new(QgOptimisticEstimate),
        }
    }
}

impl FromStr for MeasureKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MeasureKind::ALL
            .into_iter()
            .find(|kind| kind.build().name() == s)
            .ok_or_else(|| ConfigError::UnknownMeasure(s.to_string()))
    }
}

fn check_parameters(
    measure: &dyn QualityMeasure,
    parameters: &HashMap<String, f64>,
) -> Result<(), ConfigError> {
    match measure
        .required_parameters()
        .iter()
        .find(|name| !parameters.contains_key(**name))
    {
        Some(missing) => Err(ConfigError::MissingParameter {
            measure: measure.name().to_string(),
            parameter: missing.to_string(),
        }),
        None => Ok(()),
    }
}

/// Check that `optimistic_estimate` bounds `quality` and that both have the
/// extra parameters they read.
pub fn validate_pairing(
    quality: &dyn QualityMeasure,
    optimistic_estimate: &dyn QualityMeasure,
    quality_parameters: &HashMap<String, f64>,
    optimistic_estimate_parameters: &HashMap<String, f64>,
) -> Result<(), ConfigError> {
    if !optimistic_estimate.is_optimistic_estimate_of(quality) {
        return Err(ConfigError::IncompatibleOptimisticEstimate {
            estimate: optimistic_estimate.name().to_string(),
            measure: quality.name().to_string(),
        });
    }
    check_parameters(quality, quality_parameters)?;
    check_parameters(optimistic_estimate, optimistic_estimate_parameters)
}
