//! FP-tree index over frequent selectors.
//!
//! Every row is inserted as a root-to-leaf path of the frequent selectors it
//! matches, ordered by descending support, so rows with common frequent
//! selectors share a prefix. Nodes holding the same selector are chained
//! through `node_link`, and the header table keeps the chain head plus the
//! aggregate `(tp, fp)` of the chain.

use polars::prelude::*;
use std::cmp::Ordering;
use std::collections::HashMap;

use crate::dataframe::CategoricalDataset;
use crate::errors::{SubgroupResult, TreeError};
use crate::node::{Counts, NodeArena, NodeId, ROOT, TreeNode};
use crate::quality::{MeasureParams, QualityMeasure};
use crate::selector::{Selector, SelectorPool, SelectorValue};
use crate::thresholds::{ThresholdMode, Thresholds};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderEntry {
    /// Sum of the counters of every node in the chain.
    pub counts: Counts,
    /// First node of the chain.
    pub head: NodeId,
    tail: NodeId,
}

/// Frequent selectors with their `(tp, fp)`, in discovery order.
#[derive(Debug, Clone, Default)]
pub struct FrequentSelectors {
    entries: Vec<(Selector, Counts)>,
    index: HashMap<Selector, usize>,
}

impl FrequentSelectors {
    fn push(&mut self, selector: Selector, counts: Counts) {
        self.index.insert(selector.clone(), self.entries.len());
        self.entries.push((selector, counts));
    }

    pub fn get(&self, selector: &Selector) -> Option<Counts> {
        self.index.get(selector).map(|&i| self.entries[i].1)
    }

    /// Position of the selector in discovery order.
    pub fn position(&self, selector: &Selector) -> Option<usize> {
        self.index.get(selector).copied()
    }

    pub fn contains(&self, selector: &Selector) -> bool {
        self.index.contains_key(selector)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Selector, Counts)> {
        self.entries.iter().map(|(s, c)| (s, *c))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Walks one selector's chain of nodes.
pub struct NodeLinks<'a> {
    arena: &'a NodeArena,
    current: Option<NodeId>,
}

impl Iterator for NodeLinks<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.current?;
        self.current = self.arena[id].node_link;
        Some(id)
    }
}

/// Descending support, ties by ascending insertion index.
fn by_support_desc(a: (Counts, i64), b: (Counts, i64)) -> Ordering {
    b.0.support()
        .cmp(&a.0.support())
        .then_with(|| a.1.cmp(&b.1))
}

#[derive(Debug, Clone, Default)]
pub struct FpTree {
    arena: NodeArena,
    header_table: HashMap<Selector, HeaderEntry>,
    /// Header keys in first-insertion order.
    header_order: Vec<Selector>,
    sorted_header_table: Vec<Selector>,
}

impl FpTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count `(tp, fp)` of every `attribute = value` pair outside the target
    /// attribute and keep those admitted by `thresholds`.
    pub fn generate_frequent_selectors(
        dataset: &CategoricalDataset,
        thresholds: &Thresholds,
    ) -> SubgroupResult<FrequentSelectors> {
        let mode = thresholds.mode()?;
        let mask = &dataset.target_mask.mask;

        let mut pool = SelectorPool::new();
        let mut all = FrequentSelectors::default();
        for (name, ca) in &dataset.attributes {
            let mut positions: HashMap<&str, usize> = HashMap::new();
            for (cell, &hit) in ca.into_iter().zip(mask.iter()) {
                let Some(value) = cell else { continue };
                let pos = match positions.get(value) {
                    Some(&pos) => pos,
                    None => {
                        let pos = all.len();
                        positions.insert(value, pos);
                        all.push(pool.intern_equal(name, value), Counts::default());
                        pos
                    }
                };
                all.entries[pos].1 += Counts::of_row(hit);
            }
        }

        let mut frequent = FrequentSelectors::default();
        for (selector, counts) in all.entries {
            if mode.admits(counts) {
                frequent.push(selector, counts);
            }
        }
        tracing::debug!(
            frequent = frequent.len(),
            interned = pool.len(),
            "generated frequent selectors"
        );
        Ok(frequent)
    }

    /// Insert every row as the path of its frequent selectors, ordered by
    /// descending support (ties by discovery order).
    pub fn build(
        &mut self,
        dataset: &CategoricalDataset,
        frequent: &FrequentSelectors,
    ) -> SubgroupResult<()> {
        let rank: Vec<(Counts, i64)> = frequent
            .entries
            .iter()
            .enumerate()
            .map(|(i, (_, counts))| (*counts, i as i64))
            .collect();

        // Per column: categorical value -> position in `frequent`
        let mut lookups: Vec<(&StringChunked, HashMap<&str, usize>)> = Vec::new();
        for (name, ca) in &dataset.attributes {
            let lookup: HashMap<&str, usize> = frequent
                .entries
                .iter()
                .enumerate()
                .filter(|(_, (s, _))| s.attribute() == name.as_str())
                .filter_map(|(i, (s, _))| match s.value() {
                    SelectorValue::Str(v) => Some((v.as_ref(), i)),
                    _ => None,
                })
                .collect();
            if !lookup.is_empty() {
                lookups.push((ca, lookup));
            }
        }

        let mut row_positions: Vec<usize> = Vec::with_capacity(lookups.len());
        let mut path: Vec<Selector> = Vec::with_capacity(lookups.len());
        for (row, &hit) in dataset.target_mask.mask.iter().enumerate() {
            row_positions.clear();
            for (ca, lookup) in &lookups {
                if let Some(&pos) = ca.get(row).and_then(|cell| lookup.get(cell)) {
                    row_positions.push(pos);
                }
            }
            if row_positions.is_empty() {
                continue;
            }
            row_positions.sort_by(|&a, &b| by_support_desc(rank[a], rank[b]));
            path.clear();
            path.extend(row_positions.iter().map(|&p| frequent.entries[p].0.clone()));
            self.insert_path(&path, Counts::of_row(hit))?;
        }

        self.sort_header_table();
        tracing::debug!(
            nodes = self.arena.len(),
            selectors = self.header_table.len(),
            "built fp-tree"
        );
        Ok(())
    }

    /// Walk down from the root along existing children, creating nodes for
    /// the unmatched suffix. Every node on the path gains `counts`.
    fn insert_path(&mut self, path: &[Selector], counts: Counts) -> Result<(), TreeError> {
        let mut current = ROOT;
        for selector in path {
            let id = match self.arena.get_child(current, selector) {
                Some(child) => {
                    self.arena.get_mut(child).counts += counts;
                    child
                }
                None => {
                    let child = self.arena.push(TreeNode::new(selector.clone(), counts));
                    self.arena.add_child(current, child)?;
                    self.link_new_node(selector, child);
                    child
                }
            };
            if let Some(entry) = self.header_table.get_mut(selector) {
                entry.counts += counts;
            }
            current = id;
        }
        Ok(())
    }

    /// Append a freshly created node to its selector's chain. A selector seen
    /// for the first time gets a zeroed header entry; the caller adds counts.
    fn link_new_node(&mut self, selector: &Selector, id: NodeId) {
        match self.header_table.get_mut(selector) {
            Some(entry) => {
                let tail = entry.tail;
                entry.tail = id;
                self.arena.get_mut(tail).node_link = Some(id);
            }
            None => {
                self.header_table.insert(
                    selector.clone(),
                    HeaderEntry {
                        counts: Counts::default(),
                        head: id,
                        tail: id,
                    },
                );
                self.header_order.push(selector.clone());
            }
        }
    }

    fn sort_header_table(&mut self) {
        let mut sorted = self.header_order.clone();
        // stable: ties keep first-insertion order
        sorted.sort_by_key(|s| self.header_table[s].counts.support());
        self.sorted_header_table = sorted;
    }

    pub fn header_table(&self) -> &HashMap<Selector, HeaderEntry> {
        &self.header_table
    }

    pub fn header_entry(&self, selector: &Selector) -> Result<&HeaderEntry, TreeError> {
        self.header_table
            .get(selector)
            .ok_or_else(|| TreeError::HeaderEntryNotFound(selector.to_string()))
    }

    /// Header keys ascending by support; ties in first-insertion order.
    pub fn sorted_header_table(&self) -> &[Selector] {
        &self.sorted_header_table
    }

    pub fn arena(&self) -> &NodeArena {
        &self.arena
    }

    pub fn root(&self) -> &TreeNode {
        self.arena.root()
    }

    pub fn is_empty(&self) -> bool {
        self.header_table.is_empty()
    }

    pub fn node_links(&self, selector: &Selector) -> NodeLinks<'_> {
        NodeLinks {
            arena: &self.arena,
            current: self.header_table.get(selector).map(|e| e.head),
        }
    }

    /// True iff no node has more than one child.
    pub fn there_is_a_single_path(&self) -> bool {
        let mut node = self.arena.root();
        loop {
            match node.children.len() {
                0 => return true,
                1 => match node.children.values().next() {
                    Some(&child) => node = &self.arena[child],
                    None => return true,
                },
                _ => return false,
            }
        }
    }

    /// Selectors from the root down, following first children.
    pub fn single_path(&self) -> Vec<Selector> {
        let mut path = Vec::new();
        let mut node = self.arena.root();
        while let Some(&child) = node.children.values().next() {
            node = &self.arena[child];
            if let Some(selector) = &node.selector {
                path.push(selector.clone());
            }
        }
        path
    }

    /// Project the tree onto the paths containing `suffix[0]`, with that
    /// selector removed.
    pub fn generate_conditional_fp_tree(
        &self,
        suffix: &[Selector],
        thresholds: &Thresholds,
    ) -> SubgroupResult<FpTree> {
        let mode = thresholds.mode()?;
        let (tree, _) = self.project(suffix, mode, |_| false)?;
        Ok(tree)
    }

    /// Like [`generate_conditional_fp_tree`](Self::generate_conditional_fp_tree),
    /// but chain nodes whose optimistic estimate is below
    /// `min_optimistic_estimate` are dropped with their whole ancestor path.
    /// Returns the tree and the number of dropped chain nodes.
    #[allow(clippy::too_many_arguments)]
    pub fn generate_conditional_fp_tree_star(
        &self,
        suffix: &[Selector],
        min_optimistic_estimate: f64,
        optimistic_estimate: &dyn QualityMeasure,
        extra_parameters: &HashMap<String, f64>,
        totals: Counts,
        thresholds: &Thresholds,
    ) -> SubgroupResult<(FpTree, usize)> {
        let mode = thresholds.mode()?;
        self.project(suffix, mode, |counts| {
            let params = MeasureParams::new(counts, totals).with_extra(extra_parameters);
            optimistic_estimate.compute(&params) < min_optimistic_estimate
        })
    }

    fn project<F>(
        &self,
        suffix: &[Selector],
        mode: ThresholdMode,
        mut skip: F,
    ) -> SubgroupResult<(FpTree, usize)>
    where
        F: FnMut(Counts) -> bool,
    {
        let mut conditional = FpTree::new();
        let Some(first) = suffix.first() else {
            return Ok((conditional, 0));
        };
        if !self.header_table.contains_key(first) {
            return Ok((conditional, 0));
        }

        // Indices grow in the order ancestors are met walking up, so ties sort
        // leaf side first, reversing the order of the source tree.
        let mut candidates: HashMap<Selector, (Counts, i64)> = HashMap::new();
        let mut pattern_base: Vec<(Vec<Selector>, Counts)> = Vec::new();
        let mut pruned_branches = 0usize;

        for id in self.node_links(first) {
            let counts = self.arena[id].counts;
            if skip(counts) {
                pruned_branches += 1;
                continue;
            }
            let mut path: Vec<Selector> = Vec::new();
            for ancestor in self.arena.ancestors(id) {
                let Some(selector) = &self.arena[ancestor].selector else {
                    continue;
                };
                let next_index = candidates.len() as i64;
                candidates
                    .entry(selector.clone())
                    .or_insert((Counts::default(), next_index))
                    .0 += counts;
                path.push(selector.clone());
            }
            path.reverse();
            pattern_base.push((path, counts));
        }

        candidates.retain(|_, (counts, _)| mode.admits(*counts));

        let mut filtered: Vec<Selector> = Vec::new();
        for (path, counts) in &pattern_base {
            filtered.clear();
            filtered.extend(path.iter().filter(|s| candidates.contains_key(*s)).cloned());
            if filtered.is_empty() {
                continue;
            }
            filtered.sort_by(|a, b| by_support_desc(candidates[a], candidates[b]));
            conditional.insert_path(&filtered, *counts)?;
        }
        conditional.sort_header_table();

        if pruned_branches > 0 {
            tracing::debug!(selector = %first, pruned_branches, "pruned conditional branches");
        }
        tracing::debug!(
            selector = %first,
            base = pattern_base.len(),
            selectors = conditional.header_table.len(),
            "built conditional fp-tree"
        );
        Ok((conditional, pruned_branches))
    }

    /// Header selectors sorted by descending value of `key`, ties in
    /// ascending-support order.
    pub fn header_by_descending<F>(&self, mut key: F) -> Vec<Selector>
    where
        F: FnMut(&Selector, Counts) -> f64,
    {
        let mut keyed: Vec<(f64, &Selector)> = self
            .sorted_header_table
            .iter()
            .map(|s| (key(s, self.header_table[s].counts), s))
            .collect();
        keyed.sort_by(|a, b| b.0.total_cmp(&a.0));
        keyed.into_iter().map(|(_, s)| s.clone()).collect()
    }
}
