use async_trait::async_trait;
use prep_core::model::{AppSettings, Badge, ExamResult, ExamResultId, StudySession, StudySessionId};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),
}

/// Repository contract for exam results.
#[async_trait]
pub trait ExamResultRepository: Send + Sync {
    /// Reserve a fresh identifier for a result about to be inserted.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot hand out ids.
    async fn allocate_result_id(&self) -> Result<ExamResultId, StorageError>;

    /// Store a new result.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if a result with the same id exists.
    async fn insert_result(&self, result: &ExamResult) -> Result<(), StorageError>;

    /// Fetch a result by ID.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn get_result(&self, id: ExamResultId) -> Result<Option<ExamResult>, StorageError>;

    /// All results, newest first. Results on the same date keep the most
    /// recently inserted first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_results(&self) -> Result<Vec<ExamResult>, StorageError>;

    /// Remove a result.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the id is unknown.
    async fn delete_result(&self, id: ExamResultId) -> Result<(), StorageError>;
}

/// Repository contract for finished study sessions and earned badges.
#[async_trait]
pub trait StudySessionRepository: Send + Sync {
    /// Reserve a fresh identifier for a session.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot hand out ids.
    async fn allocate_session_id(&self) -> Result<StudySessionId, StorageError>;

    /// Append a finished session.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if the session id is already stored.
    async fn append_session(&self, session: &StudySession) -> Result<(), StorageError>;

    /// Sessions in the order they were recorded.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_sessions(&self) -> Result<Vec<StudySession>, StorageError>;

    /// Append an earned badge.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn append_badge(&self, badge: &Badge) -> Result<(), StorageError>;

    /// Badges in the order they were earned.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_badges(&self) -> Result<Vec<Badge>, StorageError>;
}

#[async_trait]
pub trait AppSettingsRepository: Send + Sync {
    /// Load stored settings, if any were saved.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn get_settings(&self) -> Result<Option<AppSettings>, StorageError>;

    /// Replace stored settings.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn save_settings(&self, settings: &AppSettings) -> Result<(), StorageError>;
}

/// Process-lifetime repository; nothing survives a restart.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    results: Arc<Mutex<HashMap<ExamResultId, ExamResult>>>,
    sessions: Arc<Mutex<Vec<StudySession>>>,
    badges: Arc<Mutex<Vec<Badge>>>,
    settings: Arc<Mutex<Option<AppSettings>>>,
    next_result_id: Arc<AtomicU64>,
    next_session_id: Arc<AtomicU64>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, StorageError> {
    mutex
        .lock()
        .map_err(|e| StorageError::Connection(e.to_string()))
}

#[async_trait]
impl ExamResultRepository for InMemoryRepository {
    async fn allocate_result_id(&self) -> Result<ExamResultId, StorageError> {
        let id = self.next_result_id.fetch_add(1, Ordering::Relaxed) + 1;
        Ok(ExamResultId::new(id))
    }

    async fn insert_result(&self, result: &ExamResult) -> Result<(), StorageError> {
        let mut guard = lock(&self.results)?;
        if guard.contains_key(&result.id()) {
            return Err(StorageError::Conflict);
        }
        guard.insert(result.id(), result.clone());
        Ok(())
    }

    async fn get_result(&self, id: ExamResultId) -> Result<Option<ExamResult>, StorageError> {
        let guard = lock(&self.results)?;
        Ok(guard.get(&id).cloned())
    }

    async fn list_results(&self) -> Result<Vec<ExamResult>, StorageError> {
        let guard = lock(&self.results)?;
        let mut results: Vec<ExamResult> = guard.values().cloned().collect();
        results.sort_by(|a, b| b.date().cmp(&a.date()).then_with(|| b.id().cmp(&a.id())));
        Ok(results)
    }

    async fn delete_result(&self, id: ExamResultId) -> Result<(), StorageError> {
        let mut guard = lock(&self.results)?;
        guard.remove(&id).map(|_| ()).ok_or(StorageError::NotFound)
    }
}

#[async_trait]
impl StudySessionRepository for InMemoryRepository {
    async fn allocate_session_id(&self) -> Result<StudySessionId, StorageError> {
        let id = self.next_session_id.fetch_add(1, Ordering::Relaxed) + 1;
        Ok(StudySessionId::new(id))
    }

    async fn append_session(&self, session: &StudySession) -> Result<(), StorageError> {
        let mut guard = lock(&self.sessions)?;
        if guard.iter().any(|stored| stored.id == session.id) {
            return Err(StorageError::Conflict);
        }
        guard.push(session.clone());
        Ok(())
    }

    async fn list_sessions(&self) -> Result<Vec<StudySession>, StorageError> {
        Ok(lock(&self.sessions)?.clone())
    }

    async fn append_badge(&self, badge: &Badge) -> Result<(), StorageError> {
        lock(&self.badges)?.push(badge.clone());
        Ok(())
    }

    async fn list_badges(&self) -> Result<Vec<Badge>, StorageError> {
        Ok(lock(&self.badges)?.clone())
    }
}

#[async_trait]
impl AppSettingsRepository for InMemoryRepository {
    async fn get_settings(&self) -> Result<Option<AppSettings>, StorageError> {
        Ok(lock(&self.settings)?.clone())
    }

    async fn save_settings(&self, settings: &AppSettings) -> Result<(), StorageError> {
        *lock(&self.settings)? = Some(settings.clone());
        Ok(())
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub results: Arc<dyn ExamResultRepository>,
    pub study: Arc<dyn StudySessionRepository>,
    pub settings: Arc<dyn AppSettingsRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let results: Arc<dyn ExamResultRepository> = Arc::new(repo.clone());
        let study: Arc<dyn StudySessionRepository> = Arc::new(repo.clone());
        let settings: Arc<dyn AppSettingsRepository> = Arc::new(repo);
        Self {
            results,
            study,
            settings,
        }
    }
}
