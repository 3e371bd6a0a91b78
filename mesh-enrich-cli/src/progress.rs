use colored::Colorize;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

/// Row progress bar on stderr, hidden when `visible` is false.
pub fn row_progress(total: u64, visible: bool) -> ProgressBar {
    let bar = ProgressBar::with_draw_target(
        Some(total),
        if visible {
            ProgressDrawTarget::stderr()
        } else {
            ProgressDrawTarget::hidden()
        },
    );
    let style = ProgressStyle::with_template(
        "{prefix} [{bar:30}] {pos}/{len} rows  {per_sec}  eta {eta}",
    )
    .unwrap_or_else(|_| ProgressStyle::default_bar())
    .progress_chars("=>-");
    bar.set_style(style);
    bar.set_prefix(format!("{}", "Processing MeSH IDs".green().bold()));
    bar
}
