use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ids::StudySessionId;

/// Name of the badge earned by a one-hour focus session.
pub const HOUR_HERO_BADGE: &str = "1 Saat Kahramanı";

/// A finished focus session on a single topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudySession {
    pub id: StudySessionId,
    pub topic: String,
    pub target: Duration,
    pub completed: Duration,
    pub started_at: DateTime<Utc>,
}

impl StudySession {
    #[must_use]
    pub fn new(
        id: StudySessionId,
        topic: impl Into<String>,
        target: Duration,
        completed: Duration,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            topic: topic.into(),
            target,
            completed,
            started_at,
        }
    }

    /// Share of the target that was completed, capped at 1.
    #[must_use]
    pub fn completion(&self) -> f64 {
        completion_ratio(self.completed, self.target)
    }
}

/// An achievement handed out for a study milestone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Badge {
    pub name: String,
    pub description: String,
    pub achieved_at: DateTime<Utc>,
}

impl Badge {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        achieved_at: DateTime<Utc>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            achieved_at,
        }
    }

    /// Badge awarded when one session reaches a full hour.
    #[must_use]
    pub fn hour_hero(achieved_at: DateTime<Utc>) -> Self {
        Self::new(
            HOUR_HERO_BADGE,
            "Bir oturumda 1 saat çalıştın!",
            achieved_at,
        )
    }
}

/// `elapsed / target` in `[0, 1]`; a zero target counts as complete.
#[must_use]
pub fn completion_ratio(elapsed: Duration, target: Duration) -> f64 {
    if target.is_zero() {
        return 1.0;
    }
    (elapsed.as_secs_f64() / target.as_secs_f64()).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    #[test]
    fn completion_is_capped() {
        let session = StudySession::new(
            StudySessionId::new(1),
            "Fizik",
            Duration::from_secs(30 * 60),
            Duration::from_secs(45 * 60),
            fixed_now(),
        );
        assert_eq!(session.completion(), 1.0);
    }

    #[test]
    fn completion_ratio_partial() {
        let ratio = completion_ratio(Duration::from_secs(15 * 60), Duration::from_secs(60 * 60));
        assert!((ratio - 0.25).abs() < 1e-9);
        assert_eq!(completion_ratio(Duration::ZERO, Duration::ZERO), 1.0);
    }
}
