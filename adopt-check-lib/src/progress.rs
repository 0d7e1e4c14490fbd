//! Running progress statistics for a batch.

use crate::types::RunCounters;
use std::time::{Duration, Instant};

/// Tracks when a run started and how many usernames it covers.
#[derive(Debug, Clone, Copy)]
pub struct ProgressTracker {
    start: Instant,
    total: usize,
}

impl ProgressTracker {
    /// Start tracking a run over `total` usernames, from now.
    pub fn start(total: usize) -> Self {
        Self {
            start: Instant::now(),
            total,
        }
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Progress as of now.
    pub fn snapshot(&self, counters: &RunCounters) -> ProgressSnapshot {
        ProgressSnapshot::new(*counters, self.total, self.elapsed())
    }
}

/// Point-in-time view of a run's progress.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressSnapshot {
    pub counters: RunCounters,
    pub total: usize,
    pub elapsed: Duration,
    /// Checks per second since the start
    pub rate: f64,
    /// Estimated time remaining; `None` while the rate is unknown or once done
    pub eta: Option<Duration>,
}

impl ProgressSnapshot {
    pub fn new(counters: RunCounters, total: usize, elapsed: Duration) -> Self {
        let secs = elapsed.as_secs_f64();
        let rate = if secs > 0.0 {
            counters.checked as f64 / secs
        } else {
            0.0
        };

        let remaining = total.saturating_sub(counters.checked);
        let eta = if rate > 0.0 && remaining > 0 {
            Some(Duration::from_secs_f64(remaining as f64 / rate))
        } else {
            None
        };

        Self {
            counters,
            total,
            elapsed,
            rate,
            eta,
        }
    }

    /// Share of the batch checked so far, as a percentage.
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.counters.checked as f64 / self.total as f64 * 100.0
        }
    }

    /// One-line status, e.g.
    /// `Checked: 5/10 (50.0%) | Found: 1 | Errors: 0 | Rate: 2.5/s | Elapsed: 2s | ETA: 2s`.
    pub fn status_line(&self) -> String {
        let mut line = format!(
            "Checked: {}/{} ({:.1}%) | Found: {} | Errors: {} | Rate: {:.1}/s | Elapsed: {}",
            self.counters.checked,
            self.total,
            self.percent(),
            self.counters.found,
            self.counters.errors,
            self.rate,
            format_short_duration(self.elapsed),
        );

        if let Some(eta) = self.eta {
            line.push_str(&format!(" | ETA: {}", format_short_duration(eta)));
        }

        line
    }
}

/// Whole seconds under a minute (`"42s"`), tenths of minutes above (`"2.5m"`).
pub fn format_short_duration(duration: Duration) -> String {
    let secs = duration.as_secs_f64();
    if secs < 60.0 {
        format!("{:.0}s", secs)
    } else {
        format!("{:.1}m", secs / 60.0)
    }
}
