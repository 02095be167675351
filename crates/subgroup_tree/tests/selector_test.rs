use std::collections::HashSet;
use std::sync::Arc;

use subgroup_tree::selector::*;

#[test]
fn selectors_order_by_attribute_then_operator_then_value() {
    let a_eq_x = Selector::equal("a", "x");
    let a_eq_y = Selector::equal("a", "y");
    let a_ne_x = Selector::new("a", Operator::NotEqual, "x");
    let b_eq_a = Selector::equal("b", "a");

    let mut sorted = vec![b_eq_a.clone(), a_ne_x.clone(), a_eq_y.clone(), a_eq_x.clone()];
    sorted.sort();
    assert_eq!(sorted, vec![a_eq_x, a_eq_y, a_ne_x, b_eq_a]);
}

#[test]
fn operator_order_follows_declaration() {
    let ops = [
        Operator::GreaterOrEqual,
        Operator::Less,
        Operator::Equal,
        Operator::LessOrEqual,
        Operator::NotEqual,
        Operator::Greater,
    ];
    let mut sorted = ops.to_vec();
    sorted.sort();
    let symbols: Vec<&str> = sorted.iter().map(|o| o.symbol()).collect();
    assert_eq!(symbols, vec!["=", "!=", "<", ">", "<=", ">="]);
}

#[test]
fn mixed_value_types_fall_back_to_text_order() {
    let num = SelectorValue::Int(5);
    let text = SelectorValue::from("abc");
    // compared as the text forms "5" and "'abc'"
    let expected = num.to_string().cmp(&text.to_string());
    assert_eq!(num.cmp(&text), expected);
    assert_eq!(text.cmp(&num), expected.reverse());

    assert!(SelectorValue::Int(1) < SelectorValue::Float(1.5));
    assert!(SelectorValue::Float(0.5) < SelectorValue::Int(1));
    // numerically equal but different variants are still distinct and ordered
    assert_ne!(SelectorValue::Int(1), SelectorValue::Float(1.0));
    assert!(SelectorValue::Int(1) < SelectorValue::Float(1.0));
}

#[test]
fn float_values_hash_by_bits() {
    let mut set = HashSet::new();
    set.insert(Selector::new("x", Operator::Less, 1.5_f64));
    set.insert(Selector::new("x", Operator::Less, 1.5_f64));
    set.insert(Selector::new("x", Operator::Less, 2.5_f64));
    assert_eq!(set.len(), 2);
}

#[test]
fn selector_display_quotes_strings_only() {
    assert_eq!(Selector::equal("a1", "c").to_string(), "a1 = 'c'");
    assert_eq!(
        Selector::new("age", Operator::GreaterOrEqual, 30_i64).to_string(),
        "age >= 30"
    );
    assert_eq!(
        Selector::new("w", Operator::Less, 2.0_f64).to_string(),
        "w < 2.0"
    );
    assert_eq!(
        Selector::equal("surname", "O'Brien").to_string(),
        "surname = 'O''Brien'"
    );
}

#[test]
fn matches_str_applies_operator() {
    assert!(Selector::equal("a", "x").matches_str("x"));
    assert!(!Selector::equal("a", "x").matches_str("y"));
    assert!(Selector::new("a", Operator::NotEqual, "x").matches_str("y"));
    assert!(Selector::new("a", Operator::Less, "m").matches_str("b"));
    assert!(!Selector::new("a", Operator::Greater, "m").matches_str("b"));
}

#[test]
fn pattern_is_sorted_and_deduplicated() {
    let p = Pattern::new(vec![
        Selector::equal("b", "1"),
        Selector::equal("a", "2"),
        Selector::equal("b", "1"),
    ]);
    assert_eq!(p.len(), 2);
    assert_eq!(p.as_slice()[0], Selector::equal("a", "2"));
    assert_eq!(p.to_string(), "[a = '2', b = '1']");

    let q = Pattern::new(vec![Selector::equal("a", "2"), Selector::equal("b", "1")]);
    assert_eq!(p, q);
}

#[test]
fn pattern_union_and_with() {
    let alpha = Pattern::new(vec![Selector::equal("c", "z")]);
    let beta = Pattern::new(vec![Selector::equal("a", "x"), Selector::equal("c", "z")]);

    let union = alpha.union(&beta);
    assert_eq!(union.len(), 2);
    assert!(union.contains(&Selector::equal("a", "x")));
    assert!(union.contains(&Selector::equal("c", "z")));

    let extended = alpha.with(&Selector::equal("b", "y"));
    assert_eq!(extended.to_string(), "[b = 'y', c = 'z']");
    assert!(Pattern::empty().is_empty());
}

#[test]
fn pool_shares_allocations_between_equal_selectors() {
    let mut pool = SelectorPool::new();
    let first = pool.intern_equal("colour", "red");
    let second = pool.intern_equal("colour", "red");
    let other = pool.intern_equal("colour", "blue");

    assert_eq!(first, second);
    assert_ne!(first, other);
    assert_eq!(pool.len(), 2);

    match (first.value(), second.value()) {
        (SelectorValue::Str(a), SelectorValue::Str(b)) => assert!(Arc::ptr_eq(a, b)),
        _ => panic!("interned selectors hold string values"),
    }
}

#[test]
fn operator_parses_from_symbol() {
    for op in [
        Operator::Equal,
        Operator::NotEqual,
        Operator::Less,
        Operator::Greater,
        Operator::LessOrEqual,
        Operator::GreaterOrEqual,
    ] {
        assert_eq!(op.symbol().parse::<Operator>().unwrap(), op);
    }
    assert!("=>".parse::<Operator>().is_err());
}
