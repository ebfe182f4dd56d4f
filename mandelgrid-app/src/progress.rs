use tracing::info;

use mandelgrid_core::ProgressSink;

const STEP_PERCENT: usize = 10;

/// Logs a line each time a pass crosses another 10% of its points.
#[derive(Debug)]
pub struct LogProgress {
    label: String,
    next_percent: usize,
    lines: usize,
}

impl LogProgress {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            next_percent: STEP_PERCENT,
            lines: 0,
        }
    }

    /// How many progress lines have been logged.
    #[cfg(test)]
    pub fn lines(&self) -> usize {
        self.lines
    }
}

impl ProgressSink for LogProgress {
    fn report(&mut self, dispatched: usize, total: usize) {
        if total == 0 {
            return;
        }
        let percent = dispatched * 100 / total;
        if percent >= self.next_percent {
            info!(pass = %self.label, "{percent}% dispatched ({dispatched}/{total})");
            self.next_percent = (percent / STEP_PERCENT + 1) * STEP_PERCENT;
            self.lines += 1;
        }
    }
}
