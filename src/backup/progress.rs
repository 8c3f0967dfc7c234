use std::time::{Duration, Instant};

/// Point-in-time view of the copy run, produced after each file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressSnapshot {
    pub completed: usize,
    pub total: usize,
    pub percent: u8,
    pub elapsed: Duration,
    pub estimated_remaining: Duration,
}

/// Running totals for one backup run.
///
/// `total` only grows and `completed` never exceeds it.
#[derive(Debug, Clone)]
pub struct ProgressTracker {
    completed: usize,
    total: usize,
    start_time: Instant,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self {
            completed: 0,
            total: 0,
            start_time: Instant::now(),
        }
    }

    pub fn add_planned(&mut self, count: usize) {
        self.total += count;
    }

    /// Counts one processed task, whether it copied or failed.
    pub fn record_completed(&mut self) -> ProgressSnapshot {
        if self.completed < self.total {
            self.completed += 1;
        }
        self.snapshot()
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        let elapsed = self.elapsed();
        ProgressSnapshot {
            completed: self.completed,
            total: self.total,
            percent: percent(self.completed, self.total),
            elapsed,
            estimated_remaining: estimate_remaining(elapsed, self.completed, self.total),
        }
    }

    pub fn completed(&self) -> usize {
        self.completed
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new()
    }
}

fn percent(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    ((completed as f64 / total as f64) * 100.0).round() as u8
}

/// Average time per completed file times the files still to go.
pub fn estimate_remaining(elapsed: Duration, completed: usize, total: usize) -> Duration {
    if completed == 0 {
        return Duration::ZERO;
    }
    let remaining = total.saturating_sub(completed);
    elapsed.mul_f64(remaining as f64 / completed as f64)
}
