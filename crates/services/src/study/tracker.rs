use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use prep_core::model::{Badge, StudySession};
use storage::repository::StudySessionRepository;

use super::focus::FocusSession;
use crate::Clock;
use crate::error::StudyTrackerError;

/// Topics offered when starting a focus session.
pub const STUDY_TOPICS: [&str; 7] = [
    "Matematik",
    "Fizik",
    "Kimya",
    "Biyoloji",
    "Tarih",
    "Coğrafya",
    "Edebiyat",
];

const DEFAULT_BADGE_THRESHOLD: Duration = Duration::from_secs(60 * 60);

/// A session that was just recorded, plus any badge it earned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinishedSession {
    pub session: StudySession,
    pub badge: Option<Badge>,
}

/// Runs focus sessions and records them when they end.
#[derive(Clone)]
pub struct StudyTrackerService {
    clock: Clock,
    repo: Arc<dyn StudySessionRepository>,
    badge_threshold: Duration,
}

impl StudyTrackerService {
    #[must_use]
    pub fn new(clock: Clock, repo: Arc<dyn StudySessionRepository>) -> Self {
        Self {
            clock,
            repo,
            badge_threshold: DEFAULT_BADGE_THRESHOLD,
        }
    }

    /// Minimum completed duration that earns the one-hour badge.
    #[must_use]
    pub fn with_badge_threshold(mut self, threshold: Duration) -> Self {
        self.badge_threshold = threshold;
        self
    }

    #[must_use]
    pub fn available_topics(&self) -> &'static [&'static str] {
        &STUDY_TOPICS
    }

    /// Begin a running session on `topic`.
    ///
    /// # Errors
    ///
    /// Returns `StudyTrackerError::EmptyTopic` for a blank topic and
    /// `StudyTrackerError::InvalidTarget` for a zero-minute target.
    pub fn start(
        &self,
        topic: &str,
        target_minutes: u32,
    ) -> Result<FocusSession, StudyTrackerError> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(StudyTrackerError::EmptyTopic);
        }
        if target_minutes == 0 {
            return Err(StudyTrackerError::InvalidTarget);
        }
        let target = Duration::from_secs(u64::from(target_minutes) * 60);
        info!(topic, target_minutes, "focus session started");
        Ok(FocusSession::new(topic.to_owned(), target, self.clock.now()))
    }

    /// Stop the clock without ending the session.
    pub fn pause(&self, session: &mut FocusSession) {
        session.pause();
        debug!(topic = session.topic(), "focus session paused");
    }

    pub fn resume(&self, session: &mut FocusSession) {
        session.resume();
        debug!(topic = session.topic(), "focus session resumed");
    }

    /// Feed elapsed time into `session`, finishing it once the target is met.
    ///
    /// # Errors
    ///
    /// Returns `StudyTrackerError::Finished` if the session already ended,
    /// or a storage error if the automatic finish cannot be recorded.
    pub async fn tick(
        &self,
        session: &mut FocusSession,
        elapsed: Duration,
    ) -> Result<Option<FinishedSession>, StudyTrackerError> {
        if session.is_finished() {
            return Err(StudyTrackerError::Finished);
        }
        if session.advance(elapsed) {
            return self.finish(session).await.map(Some);
        }
        Ok(None)
    }

    /// End `session`, record it, and award a badge if it was long enough.
    ///
    /// The session only counts as finished once its record is stored, so a
    /// failed call can be retried. A badge that cannot be stored is logged and
    /// left out of the returned value; the recorded session stands.
    ///
    /// # Errors
    ///
    /// Returns `StudyTrackerError::Finished` if the session already ended, or
    /// `StudyTrackerError::Storage` if it cannot be recorded.
    pub async fn finish(
        &self,
        session: &mut FocusSession,
    ) -> Result<FinishedSession, StudyTrackerError> {
        if session.is_finished() {
            return Err(StudyTrackerError::Finished);
        }

        let id = self.repo.allocate_session_id().await?;
        let record = StudySession::new(
            id,
            session.topic(),
            session.target(),
            session.elapsed(),
            session.started_at(),
        );
        self.repo.append_session(&record).await?;
        session.mark_finished();
        info!(
            %id,
            topic = %record.topic,
            completed_secs = record.completed.as_secs(),
            "focus session recorded"
        );

        let badge = if record.completed >= self.badge_threshold {
            self.award_badge().await
        } else {
            None
        };
        Ok(FinishedSession {
            session: record,
            badge,
        })
    }

    async fn award_badge(&self) -> Option<Badge> {
        let badge = Badge::hour_hero(self.clock.now());
        match self.repo.append_badge(&badge).await {
            Ok(()) => {
                info!(badge = %badge.name, "badge earned");
                Some(badge)
            }
            Err(err) => {
                warn!(%err, badge = %badge.name, "badge could not be stored");
                None
            }
        }
    }

    /// Recorded sessions, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `StudyTrackerError::Storage` on repository failures.
    pub async fn sessions(&self) -> Result<Vec<StudySession>, StudyTrackerError> {
        Ok(self.repo.list_sessions().await?)
    }

    /// # Errors
    ///
    /// Returns `StudyTrackerError::Storage` on repository failures.
    pub async fn badges(&self) -> Result<Vec<Badge>, StudyTrackerError> {
        Ok(self.repo.list_badges().await?)
    }

    /// Sum of completed time across recorded sessions.
    ///
    /// # Errors
    ///
    /// Returns `StudyTrackerError::Storage` on repository failures.
    pub async fn total_studied(&self) -> Result<Duration, StudyTrackerError> {
        let sessions = self.repo.list_sessions().await?;
        Ok(sessions.iter().map(|s| s.completed).sum())
    }
}
