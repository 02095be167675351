//! SDMap / SDMapStar search driver.
//!
//! Recursive FP-growth over [`FpTree`]s. Every header selector `a` of a tree
//! conditioned on `alpha` yields the candidate `{a} ∪ alpha`; when a tree
//! collapses into a single path every subset of the path is a candidate and
//! no further projection is needed.
//!
//! With `num_subgroups > 0` the driver keeps the best `num_subgroups`
//! qualities seen so far. Once that frontier is full its worst value is a
//! bound: a candidate whose optimistic estimate is below it is pruned with
//! all its refinements, and the same bound prunes chain nodes while
//! conditional trees are projected.

use itertools::Itertools;
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter;

use crate::conf::SdMapConfig;
use crate::dataframe::SubgroupDataFrameExt;
use crate::errors::{ConfigError, SubgroupResult};
use crate::fptree::FpTree;
use crate::node::Counts;
use crate::quality::{MeasureKind, MeasureParams, QualityMeasure, validate_pairing};
use crate::selector::{Pattern, Selector};
use crate::subgroup::Subgroup;
use crate::writer::ResultWriter;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStatistics {
    pub visited_subgroups: usize,
    pub selected_subgroups: usize,
    pub unselected_subgroups: usize,
    pub pruned_subgroups: usize,
    /// Chain nodes dropped by the bounded conditional projection.
    pub conditional_pruned_branches: usize,
}

/// One retained member of the top-k frontier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrontierEntry {
    pub quality: f64,
    pub pattern: Pattern,
    pub counts: Counts,
}

struct RunContext {
    target: Selector,
    totals: Counts,
}

pub struct SdMapStar {
    quality: Box<dyn QualityMeasure>,
    optimistic_estimate: Box<dyn QualityMeasure>,
    config: SdMapConfig,
    stats: RunStatistics,
    frontier: Vec<FrontierEntry>,
    selected: Vec<Subgroup>,
    writer: Option<ResultWriter>,
}

impl fmt::Debug for SdMapStar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SdMapStar")
            .field("quality", &self.quality.name())
            .field("optimistic_estimate", &self.optimistic_estimate.name())
            .field("config", &self.config)
            .field("stats", &self.stats)
            .field("selected", &self.selected.len())
            .finish()
    }
}

impl SdMapStar {
    pub fn new(
        quality: Box<dyn QualityMeasure>,
        optimistic_estimate: Box<dyn QualityMeasure>,
        config: SdMapConfig,
    ) -> Result<Self, ConfigError> {
        config.thresholds.mode()?;
        validate_pairing(
            quality.as_ref(),
            optimistic_estimate.as_ref(),
            &config.quality_parameters,
            &config.optimistic_estimate_parameters,
        )?;
        if config.write_results && config.file_path.is_none() {
            return Err(ConfigError::MissingOutputPath);
        }
        Ok(Self {
            quality,
            optimistic_estimate,
            config,
            stats: RunStatistics::default(),
            frontier: Vec::new(),
            selected: Vec::new(),
            writer: None,
        })
    }

    pub fn from_kinds(
        quality: MeasureKind,
        optimistic_estimate: MeasureKind,
        config: SdMapConfig,
    ) -> Result<Self, ConfigError> {
        Self::new(quality.build(), optimistic_estimate.build(), config)
    }

    /// Build from measure names, e.g. `("WRAcc", "WRAccOptimisticEstimate1")`.
    pub fn from_names(
        quality: &str,
        optimistic_estimate: &str,
        config: SdMapConfig,
    ) -> Result<Self, ConfigError> {
        Self::from_kinds(quality.parse()?, optimistic_estimate.parse()?, config)
    }

    pub fn config(&self) -> &SdMapConfig {
        &self.config
    }

    pub fn statistics(&self) -> RunStatistics {
        self.stats
    }

    /// Accepted subgroups of the last run, in emission order.
    pub fn selected(&self) -> &[Subgroup] {
        &self.selected
    }

    /// Frontier of the last bounded run, ascending by quality.
    pub fn top_k(&self) -> &[FrontierEntry] {
        &self.frontier
    }

    fn is_bounded(&self) -> bool {
        self.config.num_subgroups > 0
    }

    /// Worst retained quality once the frontier is full, `-inf` before.
    fn bound(&self) -> f64 {
        match self.frontier.first() {
            Some(worst) if self.is_bounded() && self.frontier.len() == self.config.num_subgroups => {
                worst.quality
            }
            _ => f64::NEG_INFINITY,
        }
    }

    fn quality_of(&self, counts: Counts, totals: Counts) -> f64 {
        let params = MeasureParams::new(counts, totals).with_extra(&self.config.quality_parameters);
        self.quality.compute(&params)
    }

    fn optimistic_estimate_of(&self, counts: Counts, totals: Counts) -> f64 {
        let params = MeasureParams::new(counts, totals)
            .with_extra(&self.config.optimistic_estimate_parameters);
        self.optimistic_estimate.compute(&params)
    }

    fn reset(&mut self) {
        self.stats = RunStatistics::default();
        self.frontier.clear();
        self.selected.clear();
        self.writer = None;
    }

    /// Mine `df` for subgroups of the target `target_attribute = target_value`.
    pub fn fit(
        &mut self,
        df: &DataFrame,
        target_attribute: &str,
        target_value: &str,
    ) -> SubgroupResult<()> {
        self.reset();
        let target = Selector::equal(target_attribute, target_value);

        let dataset = df.categorical_dataset(&target)?;
        let totals = dataset.totals();
        let frequent = FpTree::generate_frequent_selectors(&dataset, &self.config.thresholds)?;
        let mut tree = FpTree::new();
        tree.build(&dataset, &frequent)?;

        if self.config.write_results {
            let path = self
                .config
                .file_path
                .as_deref()
                .ok_or(ConfigError::MissingOutputPath)?;
            self.writer = Some(ResultWriter::create(path)?);
        }

        tracing::info!(
            target = %target,
            rows = dataset.height(),
            frequent_selectors = frequent.len(),
            num_subgroups = self.config.num_subgroups,
            quality = self.quality.name(),
            "starting SDMapStar run"
        );

        let ctx = RunContext { target, totals };
        let outcome = if tree.is_empty() {
            Ok(())
        } else {
            self.fpgrowth(&tree, &Pattern::empty(), &ctx)
        };
        let closed = match self.writer.take() {
            Some(writer) => writer.finish().map(|_| ()),
            None => Ok(()),
        };
        outcome?;
        closed?;

        tracing::info!(
            visited = self.stats.visited_subgroups,
            selected = self.stats.selected_subgroups,
            unselected = self.stats.unselected_subgroups,
            pruned = self.stats.pruned_subgroups,
            conditional_pruned_branches = self.stats.conditional_pruned_branches,
            "SDMapStar run finished"
        );
        Ok(())
    }

    fn fpgrowth(&mut self, tree: &FpTree, alpha: &Pattern, ctx: &RunContext) -> SubgroupResult<()> {
        if tree.there_is_a_single_path() {
            let path = tree.single_path();
            for size in 1..=path.len() {
                for beta in path.iter().combinations(size) {
                    // On a single path the least supported selector carries the subset's count.
                    let Some(weakest) = tree.sorted_header_table().iter().find(|s| beta.contains(s))
                    else {
                        continue;
                    };
                    let counts = tree.header_entry(weakest)?.counts;
                    let pattern = alpha.union(&Pattern::new(beta.into_iter().cloned()));
                    self.visit(&pattern, counts, ctx)?;
                }
            }
            return Ok(());
        }

        let order: Vec<Selector> = if self.is_bounded() {
            tree.header_by_descending(|_, counts| self.optimistic_estimate_of(counts, ctx.totals))
        } else {
            tree.sorted_header_table().to_vec()
        };

        for selector in order {
            let counts = tree.header_entry(&selector)?.counts;
            let pattern = alpha.with(&selector);
            if !self.visit(&pattern, counts, ctx)? {
                continue;
            }

            let suffix: Vec<Selector> = iter::once(selector.clone())
                .chain(alpha.iter().cloned())
                .collect();
            let conditional = if self.is_bounded() {
                let (conditional, pruned) = tree.generate_conditional_fp_tree_star(
                    &suffix,
                    self.bound(),
                    self.optimistic_estimate.as_ref(),
                    &self.config.optimistic_estimate_parameters,
                    ctx.totals,
                    &self.config.thresholds,
                )?;
                self.stats.conditional_pruned_branches += pruned;
                conditional
            } else {
                tree.generate_conditional_fp_tree(&suffix, &self.config.thresholds)?
            };

            if !conditional.is_empty() {
                self.fpgrowth(&conditional, &pattern, ctx)?;
            }
        }
        Ok(())
    }

    /// Count, bound-check and emit one candidate. Returns `false` if pruned.
    fn visit(&mut self, pattern: &Pattern, counts: Counts, ctx: &RunContext) -> SubgroupResult<bool> {
        self.stats.visited_subgroups += 1;
        if self.is_bounded() {
            let estimate = self.optimistic_estimate_of(counts, ctx.totals);
            if estimate < self.bound() {
                self.stats.pruned_subgroups += 1;
                tracing::trace!(%pattern, estimate, bound = self.bound(), "pruned");
                return Ok(false);
            }
            self.update_k_subgroups(pattern, counts, ctx.totals);
        }
        self.emit(pattern, counts, ctx)?;
        Ok(true)
    }

    /// Keep the `num_subgroups` best qualities, ascending.
    fn update_k_subgroups(&mut self, pattern: &Pattern, counts: Counts, totals: Counts) {
        let quality = self.quality_of(counts, totals);
        let entry = FrontierEntry {
            quality,
            pattern: pattern.clone(),
            counts,
        };
        if self.frontier.len() < self.config.num_subgroups {
            self.frontier.push(entry);
        } else if self.frontier.first().is_some_and(|worst| quality > worst.quality) {
            self.frontier[0] = entry;
        } else {
            return;
        }
        self.frontier.sort_by(|a, b| a.quality.total_cmp(&b.quality));
    }

    fn emit(&mut self, pattern: &Pattern, counts: Counts, ctx: &RunContext) -> SubgroupResult<()> {
        let quality = self.quality_of(counts, ctx.totals);
        if !(quality >= self.config.minimum_quality_measure_value) {
            self.stats.unselected_subgroups += 1;
            return Ok(());
        }
        self.stats.selected_subgroups += 1;
        let subgroup = Subgroup {
            pattern: pattern.clone(),
            target: ctx.target.clone(),
            counts,
            totals: ctx.totals,
            quality_measure: self.quality.name().to_string(),
            quality,
        };
        tracing::trace!(%subgroup, "selected");
        if let Some(writer) = self.writer.as_mut() {
            writer.write_subgroup(&subgroup)?;
        }
        self.selected.push(subgroup);
        Ok(())
    }
}
