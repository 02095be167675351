use polars::prelude::*;

use crate::errors::{DataError, SubgroupResult};
use crate::node::Counts;
use crate::selector::Selector;

/// Rows satisfying the target condition, plus the dataset-wide `(TP, FP)`.
#[derive(Debug, Clone)]
pub struct TargetMask {
    pub mask: Vec<bool>,
    pub totals: Counts,
}

/// A frame checked once for a run: every non-target attribute as a string
/// view, in frame order, plus the evaluated target.
#[derive(Debug, Clone)]
pub struct CategoricalDataset {
    pub target: Selector,
    pub attributes: Vec<(String, StringChunked)>,
    pub target_mask: TargetMask,
}

impl CategoricalDataset {
    pub fn height(&self) -> usize {
        self.target_mask.mask.len()
    }

    /// Dataset-wide `(TP, FP)`.
    pub fn totals(&self) -> Counts {
        self.target_mask.totals
    }
}

/// Extension methods for DataFrame
pub trait SubgroupDataFrameExt {
    /// All column names as owned Strings
    fn column_names_vec(&self) -> Vec<String>;

    /// Reject any column that is not String/Categorical/Enum or that holds nulls.
    fn validate_categorical(&self) -> SubgroupResult<()>;

    /// String view of a categorical column.
    fn categorical_column(&self, name: &str) -> SubgroupResult<StringChunked>;

    /// All columns except `exclude`, as string views, in frame order.
    fn attribute_columns(&self, exclude: &str) -> SubgroupResult<Vec<(String, StringChunked)>>;

    /// Evaluate the target selector on every row. Fails if the target
    /// attribute is missing or its value never occurs.
    fn target_mask(&self, target: &Selector) -> SubgroupResult<TargetMask>;

    /// Validate the frame and evaluate the target once.
    fn categorical_dataset(&self, target: &Selector) -> SubgroupResult<CategoricalDataset>;
}

fn is_categorical(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::String | DataType::Enum(_, _) | DataType::Categorical(_, _)
    )
}

impl SubgroupDataFrameExt for DataFrame {
    fn column_names_vec(&self) -> Vec<String> {
        self.get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    fn validate_categorical(&self) -> SubgroupResult<()> {
        for column in self.get_columns() {
            if !is_categorical(column.dtype()) {
                return Err(DataError::AttributeType {
                    attribute: column.name().to_string(),
                    dtype: format!("{:?}", column.dtype()),
                }
                .into());
            }
            let nulls = column.null_count();
            if nulls > 0 {
                return Err(DataError::MissingValues {
                    attribute: column.name().to_string(),
                    count: nulls,
                }
                .into());
            }
        }
        Ok(())
    }

    fn categorical_column(&self, name: &str) -> SubgroupResult<StringChunked> {
        let series = self.column(name)?.as_materialized_series();
        if !is_categorical(series.dtype()) {
            return Err(DataError::AttributeType {
                attribute: name.to_string(),
                dtype: format!("{:?}", series.dtype()),
            }
            .into());
        }
        let as_string = match series.dtype() {
            DataType::String => series.clone(),
            _ => series.cast(&DataType::String)?,
        };
        Ok(as_string.str()?.clone())
    }

    fn attribute_columns(&self, exclude: &str) -> SubgroupResult<Vec<(String, StringChunked)>> {
        self.column_names_vec()
            .into_iter()
            .filter(|name| name != exclude)
            .map(|name| {
                let ca = self.categorical_column(&name)?;
                Ok((name, ca))
            })
            .collect()
    }

    fn target_mask(&self, target: &Selector) -> SubgroupResult<TargetMask> {
        let attribute = target.attribute();
        if !self
            .get_column_names()
            .iter()
            .any(|name| name.as_str() == attribute)
        {
            return Err(DataError::TargetAttributeNotFound(attribute.to_string()).into());
        }
        let ca = self.categorical_column(attribute)?;
        let cells = &ca;

        let value = target.value().to_string();
        let raw_value = target.value().as_str().unwrap_or(value.as_str());
        if !cells.into_iter().flatten().any(|cell| cell == raw_value) {
            return Err(DataError::TargetValueNotFound {
                attribute: attribute.to_string(),
                value: raw_value.to_string(),
            }
            .into());
        }

        let mut totals = Counts::default();
        let mask: Vec<bool> = cells
            .into_iter()
            .map(|cell| {
                let hit = cell.is_some_and(|c| target.matches_str(c));
                totals += Counts::of_row(hit);
                hit
            })
            .collect();

        Ok(TargetMask { mask, totals })
    }

    fn categorical_dataset(&self, target: &Selector) -> SubgroupResult<CategoricalDataset> {
        self.validate_categorical()?;
        let target_mask = self.target_mask(target)?;
        let attributes = self.attribute_columns(target.attribute())?;
        Ok(CategoricalDataset {
            target: target.clone(),
            attributes,
            target_mask,
        })
    }
}
