use subgroup_tree::errors::SubgroupError;
use subgroup_tree::node::Counts;
use subgroup_tree::selector::{Operator, Pattern, Selector};
use subgroup_tree::subgroup::{Subgroup, subgroups_to_json};

fn sample() -> Subgroup {
    Subgroup {
        pattern: Pattern::new(vec![
            Selector::equal("a2", "q"),
            Selector::equal("a1", "c"),
        ]),
        target: Selector::equal("class", "y"),
        counts: Counts::new(1, 0),
        totals: Counts::new(2, 2),
        quality_measure: "WRAcc".to_string(),
        quality: 0.125,
    }
}

#[test]
fn display_format() {
    assert_eq!(
        sample().to_string(),
        "Description: [a1 = 'c', a2 = 'q'], Target: class = 'y' ; Quality Measure WRAcc = 0.125 ; tp = 1 ; fp = 0 ; TP = 2 ; FP = 2"
    );
}

#[test]
fn lines_parse_back() {
    let subgroup = sample();
    let parsed: Subgroup = subgroup.to_string().parse().unwrap();
    assert_eq!(parsed, subgroup);

    let mixed = Subgroup {
        pattern: Pattern::new(vec![
            Selector::new("age", Operator::GreaterOrEqual, 30_i64),
            Selector::new("weight", Operator::Less, 72.5_f64),
            Selector::equal("city", "New York"),
        ]),
        quality: -0.0312,
        ..sample()
    };
    let parsed: Subgroup = mixed.to_string().parse().unwrap();
    assert_eq!(parsed, mixed);
}

#[test]
fn spaced_names_and_quoted_punctuation_parse_back() {
    let subgroup = Subgroup {
        pattern: Pattern::new(vec![
            Selector::equal("native country", "United-States"),
            Selector::equal("name", "Smith, John"),
            Selector::equal("surname", "O'Brien"),
            Selector::equal("note", "it's, like, ''quoted'' = 1"),
        ]),
        target: Selector::equal("income class", ">50K"),
        ..sample()
    };
    let line = subgroup.to_string();
    assert!(line.contains("native country = 'United-States'"), "{line}");
    assert!(line.contains("surname = 'O''Brien'"), "{line}");
    assert!(line.contains("Target: income class = '>50K' ;"), "{line}");

    let parsed: Subgroup = line.parse().unwrap();
    assert_eq!(parsed, subgroup);
    assert_eq!(parsed.pattern.len(), 4);
}

#[test]
fn empty_description_parses() {
    let subgroup = Subgroup {
        pattern: Pattern::empty(),
        ..sample()
    };
    let line = subgroup.to_string();
    assert!(line.starts_with("Description: [], Target"));
    let parsed: Subgroup = line.parse().unwrap();
    assert!(parsed.pattern.is_empty());
}

#[test]
fn malformed_lines_are_rejected() {
    for line in [
        "",
        "Description: [a = 'x'], Target: class = 'y'",
        "Description: [a = 'x'], Target: class = 'y' ; Quality Measure WRAcc = high ; tp = 1 ; fp = 0 ; TP = 2 ; FP = 2",
        "Description: [a = 'x'], Target: class ~ 'y' ; Quality Measure WRAcc = 0.1 ; tp = 1 ; fp = 0 ; TP = 2 ; FP = 2",
        // a lone quote inside a quoted value
        "Description: [surname = 'O'Brien'], Target: class = 'y' ; Quality Measure WRAcc = 0.1 ; tp = 1 ; fp = 0 ; TP = 2 ; FP = 2",
        "Description: [a = 'x', b], Target: class = 'y' ; Quality Measure WRAcc = 0.1 ; tp = 1 ; fp = 0 ; TP = 2 ; FP = 2",
    ] {
        let result = line.parse::<Subgroup>();
        assert!(
            matches!(result, Err(SubgroupError::Parse(_))),
            "accepted {line:?}"
        );
    }
}

#[test]
fn json_export() {
    let json = subgroups_to_json(&[sample()]).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    let first = &value[0];
    assert_eq!(first["quality_measure"], "WRAcc");
    assert_eq!(first["counts"]["tp"], 1);
    assert_eq!(first["totals"]["fp"], 2);
    assert_eq!(first["target"]["attribute"], "class");

    let back: Vec<Subgroup> = serde_json::from_str(&json).unwrap();
    assert_eq!(back, vec![sample()]);
}
