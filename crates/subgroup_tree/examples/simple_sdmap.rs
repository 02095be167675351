use polars::prelude::*;
use std::time::Instant;
use subgroup_tree::conf::SdMapConfig;
use subgroup_tree::quality::MeasureKind;
use subgroup_tree::sdmap::SdMapStar;
use subgroup_tree::subgroup::subgroups_to_json;
use subgroup_tree::thresholds::Thresholds;
use subgroup_tree::tracing_setup::init_tracing;

fn generate_sample_dataframe(n_samples: usize) -> DataFrame {
    let mut colour: Vec<&str> = Vec::with_capacity(n_samples);
    let mut size: Vec<&str> = Vec::with_capacity(n_samples);
    let mut shape: Vec<&str> = Vec::with_capacity(n_samples);
    let mut noise: Vec<&str> = Vec::with_capacity(n_samples);
    let mut target: Vec<&str> = Vec::with_capacity(n_samples);

    for i in 0..n_samples {
        let c = ["red", "green", "blue"][i % 3];
        let s = if i % 4 < 2 { "small" } else { "large" };
        let h = if i % 5 == 0 { "round" } else { "square" };
        colour.push(c);
        size.push(s);
        shape.push(h);
        noise.push(["a", "b", "c", "d"][(i * 7 + 3) % 4]);

        // Planted rule: red and small is mostly positive
        let positive = (c == "red" && s == "small") || i % 11 == 0;
        target.push(if positive { "yes" } else { "no" });
    }

    let cols = vec![
        Series::new(PlSmallStr::from_static("colour"), colour),
        Series::new(PlSmallStr::from_static("size"), size),
        Series::new(PlSmallStr::from_static("shape"), shape),
        Series::new(PlSmallStr::from_static("noise"), noise),
    ];
    let mut cols_as_columns: Vec<Column> = cols.into_iter().map(|s| s.into()).collect();

    // Enum target
    let target_utf8 = Series::new(PlSmallStr::from_static("target"), target);
    let cats = FrozenCategories::new(["no", "yes"]).unwrap();
    let enum_dt = DataType::from_frozen_categories(cats);
    cols_as_columns.push(target_utf8.cast(&enum_dt).unwrap().into());

    DataFrame::new(cols_as_columns).unwrap()
}

fn main() {
    init_tracing();
    println!("=== Simple SDMapStar (Polars) ===");

    let df = generate_sample_dataframe(240);
    println!(
        "DataFrame shape: {{ rows: {}, cols: {} }}",
        df.height(),
        df.width()
    );
    println!("Columns: {:?}", df.get_column_names());

    let config = SdMapConfig {
        thresholds: Thresholds::support(5),
        num_subgroups: 5,
        ..SdMapConfig::default()
    };
    let mut sdmap = SdMapStar::from_kinds(
        MeasureKind::WRAcc,
        MeasureKind::WRAccOptimisticEstimate1,
        config,
    )
    .unwrap();

    println!("\nMining subgroups for target = 'yes'...");
    let start_time = Instant::now();
    sdmap.fit(&df, "target", "yes").unwrap();
    println!("Mining took: {:?}", start_time.elapsed());

    let stats = sdmap.statistics();
    println!("\n=== Statistics ===");
    println!("visited:    {}", stats.visited_subgroups);
    println!("selected:   {}", stats.selected_subgroups);
    println!("unselected: {}", stats.unselected_subgroups);
    println!("pruned:     {}", stats.pruned_subgroups);
    println!("pruned conditional branches: {}", stats.conditional_pruned_branches);

    println!("\n=== Top {} ===", sdmap.top_k().len());
    for (rank, entry) in sdmap.top_k().iter().rev().enumerate() {
        println!(
            "  {:>2}. {:<50} quality={:.6} tp={} fp={}",
            rank + 1,
            entry.pattern.to_string(),
            entry.quality,
            entry.counts.tp,
            entry.counts.fp
        );
    }

    let mut best: Vec<_> = sdmap.selected().to_vec();
    best.sort_by(|a, b| b.quality.total_cmp(&a.quality));
    best.truncate(3);
    println!("\nBest selected subgroups as JSON:");
    println!("{}", subgroups_to_json(&best).unwrap());
}
