//! Spinner helpers for long-running pipeline steps

use indicatif::{ProgressBar, ProgressStyle};

/// Create a spinner shown while a step runs (loading, forest training).
/// Indented to line up with the step headers.
pub fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("    {spinner:.cyan} {msg}")
            .unwrap()
            .tick_chars("◐◓◑◒·"),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(120));
    pb
}

/// Stop a spinner and replace it with a completion message
pub fn finish_with_success(pb: &ProgressBar, message: &str) {
    pb.finish_with_message(format!("✅ {}", message));
}
