//! # Subgroup Tree
//!
//! FP-tree based subgroup discovery over categorical polars DataFrames.
//!
//! ## Key Features
//!
//! - **FP-tree index**: prefix-sharing tree of frequent `attribute = value`
//!   selectors with per-selector node chains and a header table
//! - **Conditional projection**: FP-growth conditional trees, plain or pruned
//!   by an optimistic estimate
//! - **SDMap / SDMapStar**: recursive search with an optional top-k frontier
//!   that prunes branches whose optimistic estimate cannot reach it
//! - **Pluggable measures**: the [`quality::QualityMeasure`] trait plus a
//!   catalogue of common measures and their optimistic estimates
//!
//! ## Example
//!
//! ```rust,ignore
//! use polars::prelude::*;
//! use subgroup_tree::conf::SdMapConfig;
//! use subgroup_tree::quality::MeasureKind;
//! use subgroup_tree::sdmap::SdMapStar;
//!
//! let df = df!(
//!     "a1" => ["a", "b", "c", "c"],
//!     "class" => ["n", "y", "n", "y"],
//! )?;
//! let config = SdMapConfig { num_subgroups: 5, ..SdMapConfig::default() };
//! let mut sdmap = SdMapStar::from_kinds(
//!     MeasureKind::WRAcc,
//!     MeasureKind::WRAccOptimisticEstimate1,
//!     config,
//! )?;
//! sdmap.fit(&df, "class", "y")?;
//! for subgroup in sdmap.selected() {
//!     println!("{subgroup}");
//! }
//! ```

pub mod conf;
pub mod dataframe;
pub mod errors;
pub mod fptree;
pub mod node;
pub mod quality;
pub mod sdmap;
pub mod selector;
pub mod subgroup;
pub mod thresholds;
pub mod tracing_setup;
pub mod writer;
