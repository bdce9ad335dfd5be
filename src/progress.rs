//! Terminal progress indicators.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Start a spinner with `message`, or return `None` when output is quiet.
pub fn spinner(message: &str, show_progress: bool) -> Option<ProgressBar> {
    if !show_progress {
        return None;
    }

    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed}] {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    Some(pb)
}

/// Finish a spinner, if any, leaving `message` on screen.
pub fn finish(pb: Option<ProgressBar>, message: &str) {
    if let Some(pb) = pb {
        pb.finish_with_message(message.to_string());
    }
}
