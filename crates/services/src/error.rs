//! Shared error types for the services crate.

use thiserror::Error;

use prep_core::model::{AppSettingsError, ExamResultError};
use storage::repository::StorageError;
use storage::seed::SeedError;

/// Errors emitted by `ExamResultService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ExamServiceError {
    #[error(transparent)]
    Invalid(#[from] ExamResultError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `StudyTrackerService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StudyTrackerError {
    #[error("topic cannot be empty")]
    EmptyTopic,
    #[error("target duration must be at least one minute")]
    InvalidTarget,
    #[error("study session already finished")]
    Finished,
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `AppSettingsService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppSettingsServiceError {
    #[error(transparent)]
    Invalid(#[from] AppSettingsError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Settings(#[from] AppSettingsServiceError),
    #[error(transparent)]
    Seed(#[from] SeedError),
}
