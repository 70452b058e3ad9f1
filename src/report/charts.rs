//! Horizontal bar charts rendered with unicode block characters.

use console::style;

const BAR_WIDTH: usize = 30;

/// Render one bar scaled against `max`, padded to the full width.
fn render_bar(value: f64, max: f64, width: usize) -> String {
    if max <= 0.0 || !value.is_finite() {
        return " ".repeat(width);
    }
    let filled = ((value / max) * width as f64).round() as usize;
    let filled = filled.min(width);
    format!("{}{}", "█".repeat(filled), " ".repeat(width - filled))
}

/// Print the mean feature-importance chart, highest first.
pub fn display_importance_chart(features: &[(String, f64)]) {
    println!();
    println!(
        "    {} {}",
        style("📊").cyan(),
        style("FEATURE IMPORTANCE (mean decrease in impurity)")
            .white()
            .bold()
    );
    println!("    {}", style("─".repeat(50)).dim());
    println!();

    let mut sorted: Vec<&(String, f64)> = features.iter().collect();
    sorted.sort_by(|a, b| b.1.total_cmp(&a.1));

    let max = sorted.first().map(|(_, v)| *v).unwrap_or(0.0);
    let name_width = sorted.iter().map(|(n, _)| n.len()).max().unwrap_or(0);

    for (name, value) in sorted {
        println!(
            "      {:<name_width$}  {} {}",
            name,
            style(render_bar(*value, max, BAR_WIDTH)).cyan(),
            style(format!("{:.3}", value)).dim(),
        );
    }
}

/// Print the worst-group bar chart for one label: below-average share
/// per group, already ranked.
pub fn display_worst_group_chart(entries: &[(String, f64)]) {
    if entries.is_empty() {
        return;
    }
    println!();

    let name_width = entries.iter().map(|(n, _)| n.len()).max().unwrap_or(0);
    for (name, below) in entries {
        println!(
            "      {:<name_width$}  {} {}",
            name,
            style(render_bar(*below, 1.0, BAR_WIDTH)).red(),
            style(format!("{:.1}%", below * 100.0)).dim(),
        );
    }
}
