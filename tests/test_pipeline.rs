//! End-to-end pipeline tests over the in-memory survey fixture.

mod common;

use gapscan::model::{ConfusionMatrix, MultiOutputForest, RandomForestConfig};
use gapscan::pipeline::{
    add_gain_columns, build_labels, clean_dataset, compute_group_distribution, compute_vif,
    decode_features, encode_features, feature_columns, feature_matrix, label_vector, take_labels,
    take_rows, train_test_split, validate_schema, EncodingConfig, LabelStrategy,
};

struct RunResult {
    predictions: Vec<(String, Vec<usize>)>,
    importances: Vec<f64>,
    accuracies: Vec<f64>,
}

fn run_pipeline(n_rows: usize, seed: u64) -> RunResult {
    let raw = common::survey_frame(n_rows);
    validate_schema(&raw).unwrap();

    let encoding = EncodingConfig::default();
    let cleaned = clean_dataset(&raw, &encoding).unwrap();
    let with_gains = add_gain_columns(&cleaned).unwrap();
    let encoded = encode_features(&with_gains, &encoding).unwrap();

    let (labeled, summaries) = build_labels(&encoded, &LabelStrategy::MedianSplit).unwrap();
    assert_eq!(summaries.len(), 6);

    let features = feature_columns();
    let x = feature_matrix(&labeled, &features).unwrap();
    let labels: Vec<(String, Vec<usize>)> = summaries
        .iter()
        .map(|s| (s.label.clone(), label_vector(&labeled, &s.label).unwrap()))
        .collect();

    let split = train_test_split(labeled.height(), 0.2, seed, None).unwrap();
    let x_train = take_rows(&x, &split.train);
    let x_test = take_rows(&x, &split.test);
    let train_labels: Vec<(String, Vec<usize>)> = labels
        .iter()
        .map(|(name, y)| (name.clone(), take_labels(y, &split.train)))
        .collect();

    let config = RandomForestConfig::default()
        .with_n_trees(15)
        .with_seed(seed);
    let model = MultiOutputForest::fit(&config, &x_train, &train_labels).unwrap();

    let predictions = model.predict(&x_test).unwrap();
    let accuracies = predictions
        .iter()
        .map(|(name, predicted)| {
            let truth_full = &labels.iter().find(|(n, _)| n == name).unwrap().1;
            let truth = take_labels(truth_full, &split.test);
            ConfusionMatrix::from_predictions(&truth, predicted)
                .unwrap()
                .accuracy()
        })
        .collect();

    RunResult {
        predictions,
        importances: model.mean_feature_importances(),
        accuracies,
    }
}

#[test]
fn pipeline_runs_end_to_end() {
    let result = run_pipeline(120, 42);
    assert_eq!(result.predictions.len(), 6);
    for (name, predicted) in &result.predictions {
        assert_eq!(predicted.len(), 24, "{name}: wrong test partition size");
        for &p in predicted {
            assert!(p <= 1, "{name}: non-binary prediction {p}");
        }
    }
    for accuracy in &result.accuracies {
        assert!((0.0..=1.0).contains(accuracy));
    }
}

#[test]
fn identical_runs_are_identical() {
    let a = run_pipeline(120, 42);
    let b = run_pipeline(120, 42);
    assert_eq!(a.predictions, b.predictions);
    assert_eq!(a.importances, b.importances);
}

#[test]
fn label_columns_are_appended() {
    let raw = common::survey_frame(80);
    let encoding = EncodingConfig::default();
    let cleaned = clean_dataset(&raw, &encoding).unwrap();
    let with_gains = add_gain_columns(&cleaned).unwrap();
    let encoded = encode_features(&with_gains, &encoding).unwrap();
    let (labeled, _) = build_labels(&encoded, &LabelStrategy::MedianSplit).unwrap();

    for label in [
        "Access_Basic_Computer_Knowledge",
        "Gain_Basic_Computer_Knowledge",
        "Access_Internet_Usage",
        "Gain_Internet_Usage",
        "Access_Mobile_Literacy",
        "Gain_Mobile_Literacy",
    ] {
        assert!(labeled.column(label).is_ok(), "missing label {label}");
    }
}

#[test]
fn vif_runs_on_encoded_features() {
    let raw = common::survey_frame(100);
    let encoding = EncodingConfig::default();
    let cleaned = clean_dataset(&raw, &encoding).unwrap();
    let with_gains = add_gain_columns(&cleaned).unwrap();
    let encoded = encode_features(&with_gains, &encoding).unwrap();

    let scores = compute_vif(&encoded, &feature_columns()).unwrap();
    assert_eq!(scores.len(), 4);
    for s in &scores {
        assert!(s.vif >= 1.0 - 1e-9, "{}: vif {}", s.feature, s.vif);
    }
}

#[test]
fn group_report_shows_category_names_not_codes() {
    let raw = common::survey_frame(80);
    let encoding = EncodingConfig::default();
    let cleaned = clean_dataset(&raw, &encoding).unwrap();
    let with_gains = add_gain_columns(&cleaned).unwrap();
    let encoded = encode_features(&with_gains, &encoding).unwrap();
    let (labeled, summaries) = build_labels(&encoded, &LabelStrategy::MedianSplit).unwrap();

    let decoded = decode_features(&labeled, &encoding).unwrap();
    let label = &summaries[0].label;

    let genders = compute_group_distribution(&decoded, "Gender", label).unwrap();
    let names: Vec<&str> = genders.iter().map(|g| g.group.as_str()).collect();
    assert!(names.contains(&"male"), "groups were {names:?}");
    assert!(names.contains(&"female"), "groups were {names:?}");

    let education = compute_group_distribution(&decoded, "Education_Level", label).unwrap();
    for g in &education {
        assert!(
            g.group.parse::<u32>().is_err(),
            "education group rendered as code: {}",
            g.group
        );
    }
}

#[test]
fn quantile_strategy_produces_skewed_classes() {
    let raw = common::survey_frame(200);
    let encoding = EncodingConfig::default();
    let cleaned = clean_dataset(&raw, &encoding).unwrap();
    let with_gains = add_gain_columns(&cleaned).unwrap();
    let encoded = encode_features(&with_gains, &encoding).unwrap();

    let (_, median) = build_labels(&encoded, &LabelStrategy::MedianSplit).unwrap();
    let (_, quantile) = build_labels(
        &encoded,
        &LabelStrategy::QuantileSplit(Default::default()),
    )
    .unwrap();

    // Median splits stay roughly balanced (ties can shift a few rows);
    // quantiles above 0.5 push more rows into the below class.
    for (m, q) in median.iter().zip(quantile.iter()) {
        let total = m.below + m.above;
        assert!(m.below * 4 >= total, "{}: median unbalanced", m.label);
        assert!(m.above * 4 >= total, "{}: median unbalanced", m.label);
        assert!(q.below > q.above, "{}: quantile not skewed", q.label);
    }
}
