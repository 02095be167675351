use std::collections::HashMap;

use subgroup_tree::errors::ConfigError;
use subgroup_tree::node::Counts;
use subgroup_tree::quality::*;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-12
}

fn params<'a>(tp: i64, fp: i64, tp_total: i64, fp_total: i64) -> MeasureParams<'a> {
    MeasureParams::new(Counts::new(tp, fp), Counts::new(tp_total, fp_total))
}

#[test]
fn wracc_values() {
    // n = 1, N = 4, p = 1, P = 0.5
    assert!(approx_eq(WRAcc.compute(&params(1, 0, 2, 2)), 0.125));
    assert!(approx_eq(WRAcc.compute(&params(0, 1, 2, 2)), -0.125));
    // the whole dataset has zero WRAcc
    assert!(approx_eq(WRAcc.compute(&params(2, 2, 2, 2)), 0.0));
    assert!(approx_eq(WRAcc.compute(&params(0, 0, 2, 2)), 0.0));
    assert!(approx_eq(
        WRAccOptimisticEstimate1.compute(&params(2, 1, 2, 2)),
        0.25
    ));
}

#[test]
fn piatetsky_shapiro_scales_wracc_by_dataset_size() {
    for (tp, fp) in [(1, 0), (2, 1), (0, 3), (3, 3)] {
        let p = params(tp, fp, 3, 5);
        assert!(approx_eq(
            PiatetskyShapiro.compute(&p),
            8.0 * WRAcc.compute(&p)
        ));
        assert!(approx_eq(
            PiatetskyShapiroOptimisticEstimate.compute(&p),
            8.0 * WRAccOptimisticEstimate1.compute(&p)
        ));
    }
}

#[test]
fn sensitivity_and_support() {
    assert!(approx_eq(Sensitivity.compute(&params(1, 4, 4, 6)), 0.25));
    assert!(approx_eq(Support.compute(&params(1, 4, 4, 6)), 0.5));
    assert!(approx_eq(Sensitivity.compute(&params(0, 4, 0, 6)), 0.0));
}

#[test]
fn qg_reads_extra_parameter() {
    let extra = HashMap::from([("g".to_string(), 2.0)]);
    let p = params(4, 2, 5, 5).with_extra(&extra);
    assert!(approx_eq(Qg.compute(&p), 1.0));
    assert!(approx_eq(QgOptimisticEstimate.compute(&p), 2.0));
    assert_eq!(p.get("g"), Some(2.0));
    assert_eq!(p.get("TP"), Some(5.0));
    assert_eq!(p.get("h"), None);

    // without g the value is undefined
    assert!(Qg.compute(&params(4, 2, 5, 5)).is_nan());
}

/// Every optimistic estimate bounds the quality of every refinement
/// (fewer or equal tp and fp) of the counts it is computed on.
#[test]
fn optimistic_estimates_bound_refinements() {
    let extra = HashMap::from([("g".to_string(), 1.0)]);
    let pairs: Vec<(Box<dyn QualityMeasure>, Box<dyn QualityMeasure>)> = vec![
        (Box::new(WRAcc), Box::new(WRAccOptimisticEstimate1)),
        (
            Box::new(PiatetskyShapiro),
            Box::new(PiatetskyShapiroOptimisticEstimate),
        ),
        (Box::new(Sensitivity), Box::new(Sensitivity)),
        (Box::new(Support), Box::new(Support)),
        (Box::new(Qg), Box::new(QgOptimisticEstimate)),
    ];

    let (tp_total, fp_total) = (5, 4);
    for (quality, estimate) in &pairs {
        assert!(estimate.is_optimistic_estimate_of(quality.as_ref()));
        for tp in 0..=tp_total {
            for fp in 0..=fp_total {
                let bound = estimate.compute(&params(tp, fp, tp_total, fp_total).with_extra(&extra));
                for tp_r in 0..=tp {
                    for fp_r in 0..=fp {
                        let value = quality
                            .compute(&params(tp_r, fp_r, tp_total, fp_total).with_extra(&extra));
                        assert!(
                            value <= bound + 1e-12,
                            "{} ({tp_r},{fp_r}) = {value} exceeds {} ({tp},{fp}) = {bound}",
                            quality.name(),
                            estimate.name()
                        );
                    }
                }
            }
        }
    }
}

#[test]
fn measure_kinds_round_trip_through_names() {
    for kind in MeasureKind::ALL {
        let name = kind.build().name().to_string();
        assert_eq!(name.parse::<MeasureKind>().unwrap(), kind);
    }
    assert!(matches!(
        "Lift".parse::<MeasureKind>(),
        Err(ConfigError::UnknownMeasure(name)) if name == "Lift"
    ));
}

#[test]
fn pairing_is_validated() {
    let empty = HashMap::new();
    assert!(validate_pairing(&WRAcc, &WRAccOptimisticEstimate1, &empty, &empty).is_ok());

    let err = validate_pairing(&WRAcc, &Support, &empty, &empty).unwrap_err();
    assert!(matches!(
        err,
        ConfigError::IncompatibleOptimisticEstimate { ref estimate, ref measure }
            if estimate == "Support" && measure == "WRAcc"
    ));

    let err = validate_pairing(&Qg, &QgOptimisticEstimate, &empty, &empty).unwrap_err();
    assert!(matches!(
        err,
        ConfigError::MissingParameter { ref measure, ref parameter }
            if measure == "Qg" && parameter == "g"
    ));

    let g = HashMap::from([("g".to_string(), 1.0)]);
    let err = validate_pairing(&Qg, &QgOptimisticEstimate, &g, &empty).unwrap_err();
    assert!(matches!(
        err,
        ConfigError::MissingParameter { ref measure, .. } if measure == "QgOptimisticEstimate"
    ));
    assert!(validate_pairing(&Qg, &QgOptimisticEstimate, &g, &g).is_ok());
}
