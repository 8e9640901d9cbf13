use colored::*;
use tracing::info;

/// Purely observational progress reporting, one tick per processed entry.
pub trait ProgressSink {
    fn start(&mut self, total: usize);
    fn update(&mut self, label: &str);
    fn stop(&mut self);
}

/// Reports progress as `[done/total] label` log lines.
#[derive(Debug, Default)]
pub struct LogProgress {
    total: usize,
    done: usize,
}

impl LogProgress {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgressSink for LogProgress {
    fn start(&mut self, total: usize) {
        self.total = total;
        self.done = 0;
        info!("Generating {} PDF pages", total);
    }

    fn update(&mut self, label: &str) {
        self.done += 1;
        info!("[{}/{}] {}", self.done, self.total, label.green());
    }

    fn stop(&mut self) {
        info!("Processed {} of {} pages", self.done, self.total);
    }
}
