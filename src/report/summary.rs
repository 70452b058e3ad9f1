//! Console report tables for the readiness analysis

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, Color, Table};
use console::style;

use crate::model::ConfusionMatrix;
use crate::pipeline::{GroupDistribution, LabelSummary, VifScore, WorstGroup, VIF_FLAG_THRESHOLD};

fn print_section(icon: &str, title: &str) {
    println!();
    println!(
        "    {} {}",
        style(icon).cyan(),
        style(title).white().bold()
    );
    println!("    {}", style("─".repeat(50)).dim());
    println!();
}

fn print_table(table: &Table) {
    // Indent the table
    for line in table.to_string().lines() {
        println!("    {}", line);
    }
}

/// Render the VIF diagnostic table, flagging scores above the
/// conventional threshold.
pub fn display_vif_table(scores: &[VifScore]) {
    print_section("🔗", "COLLINEARITY CHECK (VIF)");

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec![
        Cell::new("Feature").add_attribute(Attribute::Bold),
        Cell::new("VIF").add_attribute(Attribute::Bold),
        Cell::new("Flag").add_attribute(Attribute::Bold),
    ]);

    for score in scores {
        let flagged = score.vif > VIF_FLAG_THRESHOLD;
        let vif_text = if score.vif.is_finite() {
            format!("{:.3}", score.vif)
        } else {
            "∞".to_string()
        };
        table.add_row(vec![
            Cell::new(&score.feature),
            Cell::new(vif_text).fg(if flagged { Color::Red } else { Color::White }),
            Cell::new(if flagged { "⚠ high" } else { "ok" }).fg(if flagged {
                Color::Yellow
            } else {
                Color::Green
            }),
        ]);
    }

    print_table(&table);
}

/// Render the label construction table: source column, threshold, and
/// class counts per label.
pub fn display_label_table(summaries: &[LabelSummary]) {
    print_section("🏷️", "LABEL CONSTRUCTION");

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec![
        Cell::new("Label").add_attribute(Attribute::Bold),
        Cell::new("Source").add_attribute(Attribute::Bold),
        Cell::new("Threshold").add_attribute(Attribute::Bold),
        Cell::new("Below").add_attribute(Attribute::Bold),
        Cell::new("Above").add_attribute(Attribute::Bold),
    ]);

    for summary in summaries {
        table.add_row(vec![
            Cell::new(&summary.label),
            Cell::new(&summary.source_column),
            Cell::new(format!("{:.3}", summary.threshold)),
            Cell::new(summary.below).fg(Color::Yellow),
            Cell::new(summary.above).fg(Color::Green),
        ]);
    }

    print_table(&table);
}

/// Render one label's held-out classification report.
pub fn display_classification_report(label: &str, matrix: &ConfusionMatrix) {
    print_section("🎯", &format!("EVALUATION: {label}"));

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec![
        Cell::new("Class").add_attribute(Attribute::Bold),
        Cell::new("Precision").add_attribute(Attribute::Bold),
        Cell::new("Recall").add_attribute(Attribute::Bold),
        Cell::new("F1").add_attribute(Attribute::Bold),
        Cell::new("Support").add_attribute(Attribute::Bold),
    ]);

    for metrics in matrix.class_metrics() {
        table.add_row(vec![
            Cell::new(class_name(metrics.class)),
            Cell::new(format!("{:.3}", metrics.precision)),
            Cell::new(format!("{:.3}", metrics.recall)),
            Cell::new(format!("{:.3}", metrics.f1)),
            Cell::new(metrics.support),
        ]);
    }

    let accuracy = matrix.accuracy();
    let color = if accuracy >= 0.8 {
        Color::Green
    } else if accuracy >= 0.6 {
        Color::Yellow
    } else {
        Color::Red
    };
    table.add_row(vec![
        Cell::new("Accuracy").add_attribute(Attribute::Bold),
        Cell::new(""),
        Cell::new(""),
        Cell::new(format!("{:.3}", accuracy))
            .fg(color)
            .add_attribute(Attribute::Bold),
        Cell::new(""),
    ]);
    table.add_row(vec![
        Cell::new("Macro F1").add_attribute(Attribute::Bold),
        Cell::new(""),
        Cell::new(""),
        Cell::new(format!("{:.3}", matrix.macro_f1())),
        Cell::new(""),
    ]);

    print_table(&table);
}

/// Render the per-group label distribution table for one demographic
/// column.
pub fn display_group_table(group_column: &str, label: &str, distributions: &[GroupDistribution]) {
    print_section("👥", &format!("GROUPS BY {group_column} — {label}"));

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec![
        Cell::new("Group").add_attribute(Attribute::Bold),
        Cell::new("Below Avg").add_attribute(Attribute::Bold),
        Cell::new("Above Avg").add_attribute(Attribute::Bold),
        Cell::new("Count").add_attribute(Attribute::Bold),
    ]);

    for dist in distributions {
        let color = if dist.below > 0.5 {
            Color::Red
        } else {
            Color::White
        };
        table.add_row(vec![
            Cell::new(&dist.group),
            Cell::new(format!("{:.1}%", dist.below * 100.0)).fg(color),
            Cell::new(format!("{:.1}%", dist.above * 100.0)),
            Cell::new(dist.count),
        ]);
    }

    print_table(&table);
}

/// Render the combined worst-served group ranking.
pub fn display_worst_groups(label: &str, worst: &[WorstGroup]) {
    print_section("📉", &format!("MOST UNDERSERVED GROUPS — {label}"));

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec![
        Cell::new("Column").add_attribute(Attribute::Bold),
        Cell::new("Group").add_attribute(Attribute::Bold),
        Cell::new("Below Avg").add_attribute(Attribute::Bold),
        Cell::new("Count").add_attribute(Attribute::Bold),
    ]);

    for entry in worst {
        table.add_row(vec![
            Cell::new(&entry.group_column),
            Cell::new(&entry.group),
            Cell::new(format!("{:.1}%", entry.below * 100.0))
                .fg(Color::Red)
                .add_attribute(Attribute::Bold),
            Cell::new(entry.count),
        ]);
    }

    print_table(&table);
}

fn class_name(class: usize) -> &'static str {
    match class {
        0 => "Below Average",
        1 => "Above Average",
        _ => "Other",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_names_are_readable() {
        assert_eq!(class_name(0), "Below Average");
        assert_eq!(class_name(1), "Above Average");
        assert_eq!(class_name(7), "Other");
    }

    #[test]
    fn display_functions_handle_empty_input() {
        // Smoke checks: rendering must never panic on empty slices.
        display_vif_table(&[]);
        display_label_table(&[]);
        display_worst_groups("Access_Internet_Usage", &[]);
        display_group_table("Gender", "Access_Internet_Usage", &[]);
    }
}
