//! Download progress rendering.
//!
//! Sessions report progress as a fraction plus an ETA in seconds, so the bar
//! runs over a fixed number of steps instead of bytes.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

/// Bar resolution: one step per tenth of a percent.
const BAR_STEPS: u64 = 1000;

const MAX_LABEL: usize = 40;

/// Terminal progress bar for a single download.
pub struct DownloadProgress {
    bar: ProgressBar,
    saw_fraction: bool,
}

impl DownloadProgress {
    /// Create a progress display labelled with the file being downloaded.
    pub fn new(label: &str) -> Self {
        let bar = ProgressBar::with_draw_target(Some(BAR_STEPS), ProgressDrawTarget::stderr());
        bar.set_style(spinner_style());
        bar.set_prefix(format_label(label));
        bar.set_message("connecting");
        bar.enable_steady_tick(Duration::from_millis(120));
        Self {
            bar,
            saw_fraction: false,
        }
    }

    /// Hidden display, used when stderr is not a terminal.
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
            saw_fraction: false,
        }
    }

    /// Update the display with the latest session state.
    pub fn update(&mut self, fraction_complete: Option<f64>, eta_seconds: Option<f64>) {
        let Some(fraction) = fraction_complete else {
            self.bar.set_message("size unknown");
            return;
        };

        if !self.saw_fraction {
            self.bar.set_style(bar_style());
            self.saw_fraction = true;
        }
        self.bar.set_position(fraction_to_steps(fraction));
        self.bar.set_message(format!("ETA {}", format_eta(eta_seconds)));
    }

    /// Clear the display.
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("{prefix} {spinner} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

fn bar_style() -> ProgressStyle {
    ProgressStyle::with_template("{prefix} {bar:32.cyan/blue} {percent:>3}% {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ")
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn fraction_to_steps(fraction: f64) -> u64 {
    (fraction.clamp(0.0, 1.0) * BAR_STEPS as f64).round() as u64
}

/// Format an ETA in seconds as `m:ss` or `h:mm:ss`.
///
/// Unknown and negative estimates render as `--:--`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn format_eta(eta_seconds: Option<f64>) -> String {
    let Some(eta) = eta_seconds.filter(|eta| eta.is_finite() && *eta >= 0.0) else {
        return "--:--".to_string();
    };
    let total = eta.round() as u64;
    let (hours, minutes, seconds) = (total / 3600, (total % 3600) / 60, total % 60);
    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes}:{seconds:02}")
    }
}

fn format_label(raw: &str) -> String {
    if raw.chars().count() <= MAX_LABEL {
        return raw.to_string();
    }
    let mut buf: String = raw.chars().take(MAX_LABEL - 1).collect();
    buf.push('…');
    buf
}
