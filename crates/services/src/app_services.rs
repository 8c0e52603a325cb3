use std::sync::Arc;

use prep_core::model::{AppSettings, AppSettingsDraft};
use prep_core::pomodoro::Pomodoro;
use storage::repository::Storage;
use storage::seed::seed_sample_results;
use tracing::info;

use crate::Clock;
use crate::app_settings_service::AppSettingsService;
use crate::error::AppServicesError;
use crate::exam_result_service::ExamResultService;
use crate::study::StudyTrackerService;

/// Assembles app-facing services over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    clock: Clock,
    storage: Storage,
    settings: AppSettings,
    exam_results: Arc<ExamResultService>,
    study_tracker: Arc<StudyTrackerService>,
    app_settings: Arc<AppSettingsService>,
}

impl AppServices {
    /// Build services over fresh in-memory storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if settings cannot be loaded.
    pub async fn in_memory(clock: Clock) -> Result<Self, AppServicesError> {
        Self::new(clock, Storage::in_memory()).await
    }

    /// Build services over `storage`, configured from its stored settings.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if settings cannot be loaded.
    pub async fn new(clock: Clock, storage: Storage) -> Result<Self, AppServicesError> {
        let app_settings = Arc::new(AppSettingsService::new(Arc::clone(&storage.settings)));
        let settings = app_settings.load().await?;
        let (exam_results, study_tracker) = Self::configured(clock, &storage, &settings);

        Ok(Self {
            clock,
            storage,
            settings,
            exam_results,
            study_tracker,
            app_settings,
        })
    }

    fn configured(
        clock: Clock,
        storage: &Storage,
        settings: &AppSettings,
    ) -> (Arc<ExamResultService>, Arc<StudyTrackerService>) {
        let exam_results = ExamResultService::new(clock, Arc::clone(&storage.results))
            .with_averaging(settings.subject_averaging());
        let study_tracker = StudyTrackerService::new(clock, Arc::clone(&storage.study))
            .with_badge_threshold(settings.badge_threshold());
        (Arc::new(exam_results), Arc::new(study_tracker))
    }

    /// Validate and store `draft`, then reconfigure the services from it.
    ///
    /// Service handles taken before the call keep their old configuration;
    /// fetch them again afterwards.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError::Settings` if the draft is invalid or cannot
    /// be stored. The current configuration is kept in that case.
    pub async fn save_settings(
        &mut self,
        draft: AppSettingsDraft,
    ) -> Result<&AppSettings, AppServicesError> {
        let settings = self.app_settings.save(draft).await?;
        let (exam_results, study_tracker) = Self::configured(self.clock, &self.storage, &settings);
        self.exam_results = exam_results;
        self.study_tracker = study_tracker;
        self.settings = settings;
        Ok(&self.settings)
    }

    /// Insert the bundled sample exams.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError::Seed` if a sample cannot be stored.
    pub async fn seed_samples(&self) -> Result<usize, AppServicesError> {
        let stored = seed_sample_results(self.storage.results.as_ref()).await?;
        info!(count = stored.len(), "sample exam results seeded");
        Ok(stored.len())
    }

    /// Settings the services were configured with.
    #[must_use]
    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    /// A stopped pomodoro timer using the configured durations.
    #[must_use]
    pub fn pomodoro(&self) -> Pomodoro {
        Pomodoro::new(self.settings.pomodoro())
    }

    #[must_use]
    pub fn exam_results(&self) -> Arc<ExamResultService> {
        Arc::clone(&self.exam_results)
    }

    #[must_use]
    pub fn study_tracker(&self) -> Arc<StudyTrackerService> {
        Arc::clone(&self.study_tracker)
    }

    #[must_use]
    pub fn app_settings(&self) -> Arc<AppSettingsService> {
        Arc::clone(&self.app_settings)
    }
}
