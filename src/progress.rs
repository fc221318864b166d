/// What the page's progress bar and label should show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressDisplay {
    pub bar_width: String,
    pub text: String,
}

pub fn render_progress(percentage: f64) -> ProgressDisplay {
    ProgressDisplay {
        bar_width: format!("{percentage}%"),
        text: format!("{}%", percentage.round() as i64),
    }
}

/// A progress bar and/or label on the hosting page.
pub trait ProgressIndicator: Send + Sync {
    fn update(&self, display: &ProgressDisplay);
}

/// Used when the page has no progress elements.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressIndicator for NoProgress {
    fn update(&self, _display: &ProgressDisplay) {}
}

/// Writes progress to the log; used by the headless host.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProgress;

impl ProgressIndicator for LogProgress {
    fn update(&self, progress: &ProgressDisplay) {
        tracing::info!(width = %progress.bar_width, "progress {}", progress.text);
    }
}
