use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;
use crate::node::Counts;

/// Frequency thresholds as supplied by the caller. Exactly one of the two
/// modes must be set: both `minimum_tp` and `minimum_fp`, or `minimum_n`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thresholds {
    pub minimum_tp: Option<i64>,
    pub minimum_fp: Option<i64>,
    pub minimum_n: Option<i64>,
}

/// A validated threshold rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThresholdMode {
    TpFp { minimum_tp: i64, minimum_fp: i64 },
    Support { minimum_n: i64 },
}

impl Thresholds {
    pub fn tp_fp(minimum_tp: i64, minimum_fp: i64) -> Self {
        Self {
            minimum_tp: Some(minimum_tp),
            minimum_fp: Some(minimum_fp),
            minimum_n: None,
        }
    }

    pub fn support(minimum_n: i64) -> Self {
        Self {
            minimum_tp: None,
            minimum_fp: None,
            minimum_n: Some(minimum_n),
        }
    }

    pub fn mode(&self) -> Result<ThresholdMode, ConfigError> {
        let mode = match (self.minimum_tp, self.minimum_fp, self.minimum_n) {
            (Some(minimum_tp), Some(minimum_fp), None) => ThresholdMode::TpFp {
                minimum_tp,
                minimum_fp,
            },
            (None, None, Some(minimum_n)) => ThresholdMode::Support { minimum_n },
            (tp, fp, n) => {
                return Err(ConfigError::InconsistentThreshold(format!(
                    "expected either (minimum_tp, minimum_fp) or minimum_n, got \
                     minimum_tp={tp:?}, minimum_fp={fp:?}, minimum_n={n:?}"
                )));
            }
        };
        for (name, value) in [
            ("minimum_tp", self.minimum_tp),
            ("minimum_fp", self.minimum_fp),
            ("minimum_n", self.minimum_n),
        ] {
            if let Some(value) = value.filter(|v| *v < 0) {
                return Err(ConfigError::NegativeThreshold { name, value });
            }
        }
        Ok(mode)
    }
}

impl ThresholdMode {
    pub fn admits(&self, counts: Counts) -> bool {
        match *self {
            ThresholdMode::TpFp {
                minimum_tp,
                minimum_fp,
            } => counts.tp >= minimum_tp && counts.fp >= minimum_fp,
            ThresholdMode::Support { minimum_n } => counts.support() >= minimum_n,
        }
    }
}
