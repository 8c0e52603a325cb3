use std::time::Duration;

use chrono::{DateTime, Utc};
use prep_core::model::completion_ratio;

/// A focus session in progress.
///
/// Owned by the caller and advanced through
/// [`StudyTrackerService::tick`](super::StudyTrackerService::tick), the same
/// way a timer view would feed it once per second.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FocusSession {
    topic: String,
    target: Duration,
    elapsed: Duration,
    running: bool,
    started_at: DateTime<Utc>,
    finished: bool,
}

impl FocusSession {
    pub(crate) fn new(topic: String, target: Duration, started_at: DateTime<Utc>) -> Self {
        Self {
            topic,
            target,
            elapsed: Duration::ZERO,
            running: true,
            started_at,
            finished: false,
        }
    }

    #[must_use]
    pub fn topic(&self) -> &str {
        &self.topic
    }

    #[must_use]
    pub fn target(&self) -> Duration {
        self.target
    }

    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Share of the target reached, capped at 1.
    #[must_use]
    pub fn progress(&self) -> f64 {
        completion_ratio(self.elapsed, self.target)
    }

    pub(crate) fn pause(&mut self) {
        self.running = false;
    }

    pub(crate) fn resume(&mut self) {
        if !self.finished {
            self.running = true;
        }
    }

    /// Add elapsed time while running. Returns true once the target is met.
    pub(crate) fn advance(&mut self, delta: Duration) -> bool {
        if self.running {
            self.elapsed = self.elapsed.saturating_add(delta);
        }
        self.progress() >= 1.0
    }

    pub(crate) fn mark_finished(&mut self) {
        self.running = false;
        self.finished = true;
    }
}
