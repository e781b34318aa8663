use crate::report::RunTracker;
use crate::ui::output::format_duration;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::time::Duration;

pub struct ProgressManager {
    multi_progress: MultiProgress,
    enabled: bool,
}

impl ProgressManager {
    pub fn new(enabled: bool) -> Self {
        Self {
            multi_progress: MultiProgress::new(),
            enabled,
        }
    }

    pub fn create_batch_progress(&self, total_requests: u64) -> ProgressBar {
        if !self.enabled {
            return ProgressBar::hidden();
        }

        let pb = self.multi_progress.add(ProgressBar::new(total_requests));
        pb.set_style(
            ProgressStyle::with_template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos:>5}/{len:5} inputs {msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
        );
        pb.set_message("Extracting numbers...");
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    }

    /// Runs `f` with the bars hidden so its output is not overdrawn.
    pub fn suspend<F, R>(&self, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        if self.enabled {
            self.multi_progress.suspend(f)
        } else {
            f()
        }
    }
}

pub fn update_batch_progress(pb: &ProgressBar, tracker: &RunTracker, current: &str) {
    pb.set_position(tracker.processed() as u64);
    pb.set_message(format!(
        "Processing {} ({}/{})",
        current,
        tracker.processed() + 1,
        tracker.total()
    ));
}

pub fn finish_progress_with_summary(pb: &ProgressBar, message: &str, duration: Duration) {
    let final_message = format!("{} (completed in {})", message, format_duration(duration));
    pb.finish_with_message(final_message);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_progress_bars() {
        let manager = ProgressManager::new(false);
        let pb = manager.create_batch_progress(10);
        assert!(pb.is_hidden());
    }

    #[test]
    fn test_batch_progress_updates() {
        let manager = ProgressManager::new(true);
        let pb = manager.create_batch_progress(3);
        let tracker = RunTracker::new(3);

        update_batch_progress(&pb, &tracker, "numbers.txt");
        assert_eq!(pb.position(), 0);
        assert!(pb.message().contains("numbers.txt"));
        assert!(pb.message().contains("(1/3)"));

        finish_progress_with_summary(&pb, "Done", Duration::from_secs(2));
        assert!(pb.message().contains("completed in 2s"));
    }

    #[test]
    fn test_suspend_returns_value() {
        let manager = ProgressManager::new(false);
        assert_eq!(manager.suspend(|| 7), 7);
    }
}
