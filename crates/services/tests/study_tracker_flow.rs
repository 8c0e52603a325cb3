use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use prep_core::model::{Badge, HOUR_HERO_BADGE, StudySession, StudySessionId};
use prep_core::time::fixed_clock;
use services::{AppServices, StudyTrackerError, StudyTrackerService};
use storage::repository::{InMemoryRepository, StudySessionRepository, StorageError};

const MINUTE: Duration = Duration::from_secs(60);

#[tokio::test]
async fn hour_long_session_finishes_itself_and_earns_badge() {
    let app = AppServices::in_memory(fixed_clock()).await.unwrap();
    let tracker = app.study_tracker();

    let mut session = tracker.start("Fizik", 60).unwrap();
    assert!(tracker.tick(&mut session, 30 * MINUTE).await.unwrap().is_none());
    assert!((session.progress() - 0.5).abs() < 1e-9);

    tracker.pause(&mut session);
    assert!(tracker.tick(&mut session, 10 * MINUTE).await.unwrap().is_none());
    assert_eq!(session.elapsed(), 30 * MINUTE);

    tracker.resume(&mut session);
    let finished = tracker
        .tick(&mut session, 30 * MINUTE)
        .await
        .unwrap()
        .expect("target reached");
    assert_eq!(finished.session.completed, 60 * MINUTE);
    assert_eq!(finished.badge.unwrap().name, HOUR_HERO_BADGE);
    assert!(session.is_finished());

    assert!(matches!(
        tracker.tick(&mut session, MINUTE).await,
        Err(StudyTrackerError::Finished)
    ));
    assert_eq!(tracker.badges().await.unwrap().len(), 1);
}

#[tokio::test]
async fn short_session_is_recorded_without_badge() {
    let app = AppServices::in_memory(fixed_clock()).await.unwrap();
    let tracker = app.study_tracker();

    let mut session = tracker.start("  Kimya ", 20).unwrap();
    assert_eq!(session.topic(), "Kimya");
    tracker.tick(&mut session, 5 * MINUTE).await.unwrap();
    let finished = tracker.finish(&mut session).await.unwrap();
    assert!(finished.badge.is_none());
    assert_eq!(finished.session.target, 20 * MINUTE);

    assert!(matches!(
        tracker.finish(&mut session).await,
        Err(StudyTrackerError::Finished)
    ));
    assert_eq!(tracker.sessions().await.unwrap().len(), 1);
    assert_eq!(tracker.total_studied().await.unwrap(), 5 * MINUTE);
    assert!(tracker.badges().await.unwrap().is_empty());
}

#[tokio::test]
async fn start_rejects_bad_input() {
    let app = AppServices::in_memory(fixed_clock()).await.unwrap();
    let tracker = app.study_tracker();
    assert!(matches!(
        tracker.start("   ", 30),
        Err(StudyTrackerError::EmptyTopic)
    ));
    assert!(matches!(
        tracker.start("Tarih", 0),
        Err(StudyTrackerError::InvalidTarget)
    ));
    assert!(tracker.available_topics().contains(&"Edebiyat"));
}

/// In-memory sessions with switchable outages.
#[derive(Default)]
struct Unreliable {
    inner: InMemoryRepository,
    sessions_offline: AtomicBool,
    badges_offline: AtomicBool,
}

impl Unreliable {
    fn check(flag: &AtomicBool) -> Result<(), StorageError> {
        if flag.load(Ordering::SeqCst) {
            return Err(StorageError::Connection("offline".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl StudySessionRepository for Unreliable {
    async fn allocate_session_id(&self) -> Result<StudySessionId, StorageError> {
        Self::check(&self.sessions_offline)?;
        self.inner.allocate_session_id().await
    }

    async fn append_session(&self, session: &StudySession) -> Result<(), StorageError> {
        Self::check(&self.sessions_offline)?;
        self.inner.append_session(session).await
    }

    async fn list_sessions(&self) -> Result<Vec<StudySession>, StorageError> {
        self.inner.list_sessions().await
    }

    async fn append_badge(&self, badge: &Badge) -> Result<(), StorageError> {
        Self::check(&self.badges_offline)?;
        self.inner.append_badge(badge).await
    }

    async fn list_badges(&self) -> Result<Vec<Badge>, StorageError> {
        self.inner.list_badges().await
    }
}

#[tokio::test]
async fn failed_finish_can_be_retried() {
    let repo = Arc::new(Unreliable::default());
    let tracker = StudyTrackerService::new(fixed_clock(), repo.clone());
    let mut session = tracker.start("Tarih", 30).unwrap();
    tracker.tick(&mut session, 10 * MINUTE).await.unwrap();

    repo.sessions_offline.store(true, Ordering::SeqCst);
    assert!(matches!(
        tracker.finish(&mut session).await,
        Err(StudyTrackerError::Storage(StorageError::Connection(_)))
    ));
    assert!(!session.is_finished());
    assert!(tracker.sessions().await.unwrap().is_empty());

    repo.sessions_offline.store(false, Ordering::SeqCst);
    let finished = tracker.finish(&mut session).await.unwrap();
    assert_eq!(finished.session.completed, 10 * MINUTE);
    assert!(session.is_finished());
    assert_eq!(tracker.sessions().await.unwrap().len(), 1);
}

#[tokio::test]
async fn badge_outage_still_records_the_session() {
    let repo = Arc::new(Unreliable::default());
    repo.badges_offline.store(true, Ordering::SeqCst);
    let tracker = StudyTrackerService::new(fixed_clock(), repo.clone());

    let mut session = tracker.start("Biyoloji", 60).unwrap();
    let finished = tracker
        .tick(&mut session, 60 * MINUTE)
        .await
        .unwrap()
        .expect("target reached");
    assert!(finished.badge.is_none());
    assert!(session.is_finished());
    assert_eq!(tracker.sessions().await.unwrap().len(), 1);
    assert!(tracker.badges().await.unwrap().is_empty());
}
