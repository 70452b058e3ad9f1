//! Gapscan: Digital Readiness Gap Scanner
//!
//! A command-line tool for exploring digital readiness survey data:
//! binary readiness labels, collinearity checks, multi-output random
//! forests, and per-group equity reporting.

use std::time::Instant;

use anyhow::Result;
use clap::Parser;
use console::style;

use gapscan::cli::Cli;
use gapscan::model::{ConfusionMatrix, MultiOutputForest, RandomForestConfig};
use gapscan::pipeline::{
    add_gain_columns, build_labels, clean_dataset, compute_group_distribution, compute_vif,
    dataset_stats, decode_features, encode_features, feature_columns, feature_matrix,
    label_vector, load_dataset,
    take_labels, take_rows, top_n_worst_groups, train_test_split, validate_schema,
    EncodingConfig, VIF_FLAG_THRESHOLD,
};
use gapscan::report::{
    display_classification_report, display_group_table, display_importance_chart,
    display_label_table, display_vif_table, display_worst_group_chart, display_worst_groups,
    export_run_summary,
    DatasetSummary, FeatureImportanceEntry, GroupReportEntry, OutputEvaluation, RunMetadata,
    RunSummaryExport,
};
use gapscan::utils::progress::{create_spinner, finish_with_success};
use gapscan::utils::styling::{
    print_banner, print_completion, print_config, print_count, print_info, print_step_header,
    print_success,
};

fn main() -> Result<()> {
    let cli = Cli::parse();
    let strategy = cli.label_strategy().map_err(anyhow::Error::msg)?;
    let encoding = EncodingConfig::default();
    let total_start = Instant::now();

    print_banner(env!("CARGO_PKG_VERSION"));
    print_config(
        &cli.input,
        &cli.strategy,
        cli.seed,
        cli.trees,
        cli.test_fraction,
    );

    // Step 1: Load dataset
    print_step_header(1, "Load Dataset");
    let spinner = create_spinner("Reading survey CSV...");
    let raw = load_dataset(&cli.input, cli.infer_schema_length)?;
    validate_schema(&raw)?;
    finish_with_success(&spinner, "Dataset loaded");

    let (rows_loaded, cols, memory_mb) = dataset_stats(&raw);
    println!("\n    {} Dataset Statistics:", style("✧").cyan());
    println!("      Rows: {}", rows_loaded);
    println!("      Columns: {}", cols);
    println!("      Estimated memory: {:.2} MB", memory_mb);

    // Step 2: Clean and encode
    print_step_header(2, "Clean & Encode");
    let cleaned = clean_dataset(&raw, &encoding)?;
    let dropped = rows_loaded - cleaned.height();
    if dropped > 0 {
        print_count("row(s) dropped during cleaning", dropped, None);
    } else {
        print_info("No rows dropped during cleaning");
    }
    let with_gains = add_gain_columns(&cleaned)?;
    let encoded = encode_features(&with_gains, &encoding)?;
    let rows_after = encoded.height();
    print_success("Categorical features encoded");

    // Step 3: Label construction
    print_step_header(3, "Label Construction");
    let (labeled, label_summaries) = build_labels(&encoded, &strategy)?;
    display_label_table(&label_summaries);

    // Step 4: Collinearity check
    print_step_header(4, "Collinearity Check");
    let features = feature_columns();
    let vif_scores = compute_vif(&labeled, &features)?;
    display_vif_table(&vif_scores);
    let flagged = vif_scores
        .iter()
        .filter(|s| s.vif > VIF_FLAG_THRESHOLD)
        .count();
    if flagged > 0 {
        print_count(
            "feature(s) with high collinearity",
            flagged,
            Some(&format!("(VIF > {:.1})", VIF_FLAG_THRESHOLD)),
        );
    } else {
        print_info("No collinearity flags");
    }

    // Step 5: Train/test split and model training
    print_step_header(5, "Train Random Forests");
    let x = feature_matrix(&labeled, &features)?;
    let labels: Vec<(String, Vec<usize>)> = label_summaries
        .iter()
        .map(|summary| Ok((summary.label.clone(), label_vector(&labeled, &summary.label)?)))
        .collect::<Result<_>>()?;

    let stratify_labels = cli.stratify.then(|| labels[0].1.clone());
    let split = train_test_split(
        rows_after,
        cli.test_fraction,
        cli.seed,
        stratify_labels.as_deref(),
    )?;
    print_info(&format!(
        "Split: {} train / {} test rows",
        split.train.len(),
        split.test.len()
    ));

    let x_train = take_rows(&x, &split.train);
    let x_test = take_rows(&x, &split.test);
    let train_labels: Vec<(String, Vec<usize>)> = labels
        .iter()
        .map(|(name, y)| (name.clone(), take_labels(y, &split.train)))
        .collect();

    let config = RandomForestConfig::default()
        .with_n_trees(cli.trees)
        .with_max_depth(cli.max_depth)
        .with_seed(cli.seed);

    let spinner = create_spinner(&format!(
        "Training {} forests ({} trees each)...",
        labels.len(),
        cli.trees
    ));
    let model = MultiOutputForest::fit(&config, &x_train, &train_labels)?;
    finish_with_success(&spinner, "Forests trained");

    // Step 6: Held-out evaluation
    print_step_header(6, "Evaluation");
    let predictions = model.predict(&x_test)?;
    let mut evaluations = Vec::with_capacity(predictions.len());
    for (name, predicted) in &predictions {
        let truth_full = &labels.iter().find(|(n, _)| n == name).unwrap().1;
        let truth = take_labels(truth_full, &split.test);
        let matrix = ConfusionMatrix::from_predictions(&truth, predicted)?;
        display_classification_report(name, &matrix);
        evaluations.push(OutputEvaluation {
            label: name.clone(),
            accuracy: matrix.accuracy(),
            macro_f1: matrix.macro_f1(),
            classes: matrix.class_metrics(),
        });
    }

    // Step 7: Feature importances
    print_step_header(7, "Feature Importances");
    let importances: Vec<(String, f64)> = features
        .iter()
        .cloned()
        .zip(model.mean_feature_importances())
        .collect();
    display_importance_chart(&importances);

    // Step 8: Equity report
    print_step_header(8, "Equity Report");
    // Decode the demographic columns so groups show category names, not codes.
    let report_frame = decode_features(&labeled, &encoding)?;
    let first_label = &label_summaries[0].label;
    let mut group_reports = Vec::new();
    for group_column in &cli.group_columns {
        let distributions = compute_group_distribution(&report_frame, group_column, first_label)?;
        display_group_table(group_column, first_label, &distributions);
        for summary in &label_summaries {
            group_reports.push(GroupReportEntry {
                group_column: group_column.clone(),
                label: summary.label.clone(),
                distributions: compute_group_distribution(
                    &report_frame,
                    group_column,
                    &summary.label,
                )?,
            });
        }
    }
    let mut all_worst = Vec::new();
    for summary in &label_summaries {
        let worst =
            top_n_worst_groups(&report_frame, &cli.group_columns, &summary.label, cli.top_n)?;
        display_worst_groups(&summary.label, &worst);
        let bars: Vec<(String, f64)> = worst
            .iter()
            .map(|w| (format!("{} / {}", w.group_column, w.group), w.below))
            .collect();
        display_worst_group_chart(&bars);
        all_worst.extend(worst);
    }

    // Optional JSON export
    if let Some(export_path) = &cli.export {
        print_step_header(9, "Export Run Summary");
        let export = RunSummaryExport {
            metadata: RunMetadata::new(
                &cli.input.display().to_string(),
                &cli.strategy,
                cli.seed,
                cli.trees,
                cli.test_fraction,
            ),
            dataset: DatasetSummary {
                rows_loaded,
                rows_after_cleaning: rows_after,
                feature_count: features.len(),
            },
            labels: label_summaries.clone(),
            vif: vif_scores,
            evaluations,
            importances: importances
                .into_iter()
                .map(|(feature, importance)| FeatureImportanceEntry {
                    feature,
                    importance,
                })
                .collect(),
            groups: group_reports,
            worst_groups: all_worst,
        };
        export_run_summary(&export, export_path)?;
        print_success(&format!("Run summary written to {}", export_path.display()));
    }

    println!();
    print_info(&format!(
        "Total time: {:.2}s",
        total_start.elapsed().as_secs_f64()
    ));
    print_completion();

    Ok(())
}
