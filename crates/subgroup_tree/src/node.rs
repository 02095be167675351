use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::ops::{Add, AddAssign, Index};

use crate::errors::TreeError;
use crate::selector::Selector;

/// Handle of a node inside its tree's arena.
pub type NodeId = usize;

/// The root sentinel always sits at index 0.
pub const ROOT: NodeId = 0;

/// `(tp, fp)` counter pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Counts {
    pub tp: i64,
    pub fp: i64,
}

impl Counts {
    /// Counters carried by the root sentinel.
    pub const SENTINEL: Counts = Counts { tp: -1, fp: -1 };

    pub fn new(tp: i64, fp: i64) -> Self {
        Self { tp, fp }
    }

    /// Contribution of a single row.
    pub fn of_row(is_target: bool) -> Self {
        if is_target {
            Self { tp: 1, fp: 0 }
        } else {
            Self { tp: 0, fp: 1 }
        }
    }

    pub fn support(&self) -> i64 {
        self.tp + self.fp
    }
}

impl Add for Counts {
    type Output = Counts;

    fn add(self, other: Counts) -> Counts {
        Counts {
            tp: self.tp + other.tp,
            fp: self.fp + other.fp,
        }
    }
}

impl AddAssign for Counts {
    fn add_assign(&mut self, other: Counts) {
        self.tp += other.tp;
        self.fp += other.fp;
    }
}

#[derive(Debug, Clone)]
pub struct TreeNode {
    /// `None` only for the root sentinel.
    pub selector: Option<Selector>,
    pub counts: Counts,
    pub parent: Option<NodeId>,
    pub children: HashMap<Selector, NodeId>,
    /// Next node of the same tree holding the same selector.
    pub node_link: Option<NodeId>,
}

impl TreeNode {
    pub fn new(selector: Selector, counts: Counts) -> Self {
        Self {
            selector: Some(selector),
            counts,
            parent: None,
            children: HashMap::new(),
            node_link: None,
        }
    }

    pub fn root() -> Self {
        Self {
            selector: None,
            counts: Counts::SENTINEL,
            parent: None,
            children: HashMap::new(),
            node_link: None,
        }
    }

    pub fn is_root(&self) -> bool {
        self.selector.is_none()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn get_child(&self, selector: &Selector) -> Option<NodeId> {
        self.children.get(selector).copied()
    }
}

/// Owns every node of one tree. Parents, children and node links are plain
/// indices into the same arena, so the tree is dropped as a unit.
#[derive(Debug, Clone)]
pub struct NodeArena {
    nodes: Vec<TreeNode>,
}

impl Default for NodeArena {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeArena {
    pub fn new() -> Self {
        Self {
            nodes: vec![TreeNode::root()],
        }
    }

    /// Store a detached node and return its handle.
    pub fn push(&mut self, node: TreeNode) -> NodeId {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    pub fn get(&self, id: NodeId) -> Option<&TreeNode> {
        self.nodes.get(id)
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> &mut TreeNode {
        &mut self.nodes[id]
    }

    pub fn root(&self) -> &TreeNode {
        &self.nodes[ROOT]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        let selector = self.nodes[child]
            .selector
            .clone()
            .ok_or(TreeError::RootAsChild)?;
        let children = &mut self.nodes[parent].children;
        if children.contains_key(&selector) {
            return Err(TreeError::DuplicateChild(selector.to_string()));
        }
        children.insert(selector, child);
        self.nodes[child].parent = Some(parent);
        Ok(())
    }

    /// Detach the child holding `selector`. The removed node stays in the
    /// arena without a parent.
    pub fn delete_child(&mut self, parent: NodeId, selector: &Selector) -> Result<NodeId, TreeError> {
        let child = self.nodes[parent]
            .children
            .remove(selector)
            .ok_or_else(|| TreeError::NotFound(selector.to_string()))?;
        self.nodes[child].parent = None;
        Ok(child)
    }

    pub fn has_child(&self, parent: NodeId, child: NodeId) -> bool {
        match &self.nodes[child].selector {
            Some(selector) => self.nodes[parent].get_child(selector) == Some(child),
            None => false,
        }
    }

    pub fn is_child_of(&self, child: NodeId, parent: Option<NodeId>) -> bool {
        self.nodes[child].parent == parent
    }

    pub fn get_child(&self, parent: NodeId, selector: &Selector) -> Option<NodeId> {
        self.nodes[parent].get_child(selector)
    }

    /// Ancestors of `id` from its parent up to (excluding) the root.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            arena: self,
            current: self.nodes[id].parent,
        }
    }
}

impl Index<NodeId> for NodeArena {
    type Output = TreeNode;

    fn index(&self, id: NodeId) -> &TreeNode {
        &self.nodes[id]
    }
}

pub struct Ancestors<'a> {
    arena: &'a NodeArena,
    current: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.current?;
        let node = &self.arena[id];
        if node.is_root() {
            self.current = None;
            return None;
        }
        self.current = node.parent;
        Some(id)
    }
}
