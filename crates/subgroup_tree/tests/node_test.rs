use subgroup_tree::errors::TreeError;
use subgroup_tree::node::*;
use subgroup_tree::selector::Selector;

fn arena_with_chain() -> (NodeArena, NodeId, NodeId) {
    let mut arena = NodeArena::new();
    let a = arena.push(TreeNode::new(Selector::equal("a", "1"), Counts::new(2, 1)));
    let b = arena.push(TreeNode::new(Selector::equal("b", "1"), Counts::new(1, 1)));
    arena.add_child(ROOT, a).unwrap();
    arena.add_child(a, b).unwrap();
    (arena, a, b)
}

#[test]
fn root_is_a_sentinel() {
    let arena = NodeArena::new();
    let root = arena.root();
    assert!(root.is_root());
    assert!(root.is_leaf());
    assert_eq!(root.counts, Counts::SENTINEL);
    assert_eq!(root.counts, Counts::new(-1, -1));
    assert!(root.parent.is_none());
    assert!(root.node_link.is_none());
    assert!(arena.is_empty());
}

#[test]
fn add_child_sets_parent() {
    let (arena, a, b) = arena_with_chain();
    assert!(arena.has_child(ROOT, a));
    assert!(arena.has_child(a, b));
    assert!(!arena.has_child(ROOT, b));
    assert!(arena.is_child_of(a, Some(ROOT)));
    assert!(arena.is_child_of(b, Some(a)));
    assert!(arena.is_child_of(ROOT, None));
    assert_eq!(arena.get_child(ROOT, &Selector::equal("a", "1")), Some(a));
    assert_eq!(arena.get_child(ROOT, &Selector::equal("b", "1")), None);
    assert_eq!(arena.len(), 3);
}

#[test]
fn add_child_rejects_duplicate_selector() {
    let (mut arena, a, _) = arena_with_chain();
    let twin = arena.push(TreeNode::new(Selector::equal("b", "1"), Counts::new(0, 1)));
    let err = arena.add_child(a, twin).unwrap_err();
    assert!(matches!(err, TreeError::DuplicateChild(_)));
    // the rejected node stays detached
    assert!(arena.is_child_of(twin, None));
}

#[test]
fn same_selector_under_different_parents_is_allowed() {
    let (mut arena, a, _) = arena_with_chain();
    let other = arena.push(TreeNode::new(Selector::equal("c", "1"), Counts::new(1, 0)));
    arena.add_child(ROOT, other).unwrap();
    let b_again = arena.push(TreeNode::new(Selector::equal("b", "1"), Counts::new(1, 0)));
    arena.add_child(other, b_again).unwrap();

    assert!(arena.get_child(a, &Selector::equal("b", "1")).is_some());
    assert_eq!(arena.get_child(other, &Selector::equal("b", "1")), Some(b_again));
}

#[test]
fn root_cannot_become_a_child() {
    let (mut arena, a, _) = arena_with_chain();
    let err = arena.add_child(a, ROOT).unwrap_err();
    assert!(matches!(err, TreeError::RootAsChild));
}

#[test]
fn delete_child_clears_parent() {
    let (mut arena, a, b) = arena_with_chain();
    let removed = arena.delete_child(a, &Selector::equal("b", "1")).unwrap();
    assert_eq!(removed, b);
    assert!(arena.is_child_of(b, None));
    assert!(!arena.has_child(a, b));
    assert!(arena[a].is_leaf());
}

#[test]
fn delete_missing_child_fails() {
    let (mut arena, a, _) = arena_with_chain();
    let err = arena.delete_child(a, &Selector::equal("z", "9")).unwrap_err();
    assert!(matches!(err, TreeError::NotFound(_)));
}

#[test]
fn ancestors_stop_before_root() {
    let (arena, a, b) = arena_with_chain();
    assert_eq!(arena.ancestors(b).collect::<Vec<_>>(), vec![a]);
    assert!(arena.ancestors(a).next().is_none());
}

#[test]
fn counts_arithmetic() {
    let mut c = Counts::of_row(true);
    c += Counts::of_row(false);
    c += Counts::of_row(true);
    assert_eq!(c, Counts::new(2, 1));
    assert_eq!(c.support(), 3);
    assert_eq!(c + Counts::new(1, 1), Counts::new(3, 2));
}
