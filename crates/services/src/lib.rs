#![forbid(unsafe_code)]

pub mod app_services;
pub mod app_settings_service;
pub mod error;
pub mod exam_result_service;
pub mod study;

pub use prep_core::Clock;

pub use app_services::AppServices;
pub use app_settings_service::AppSettingsService;
pub use error::{AppServicesError, AppSettingsServiceError, ExamServiceError, StudyTrackerError};
pub use exam_result_service::{ExamResultService, ResultsDashboard, SubjectInsight};
pub use study::{FinishedSession, FocusSession, StudyTrackerService};
