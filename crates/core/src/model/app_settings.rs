use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::analytics::{CategoryFilter, SubjectAveraging, TimeRange};
use crate::pomodoro::{PomodoroConfig, PomodoroError};

const SECONDS_PER_MINUTE: u64 = 60;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppSettings {
    pomodoro: PomodoroConfig,
    default_time_range: TimeRange,
    default_category: CategoryFilter,
    subject_averaging: SubjectAveraging,
    badge_threshold: Duration,
}

/// User-editable settings, with durations in whole minutes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppSettingsDraft {
    pub work_minutes: u32,
    pub short_break_minutes: u32,
    pub long_break_minutes: u32,
    pub sessions_before_long_break: u32,
    pub default_time_range: TimeRange,
    pub default_category: CategoryFilter,
    pub subject_averaging: SubjectAveraging,
    pub badge_threshold_minutes: u32,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AppSettingsError {
    #[error(transparent)]
    Pomodoro(#[from] PomodoroError),
    #[error("badge threshold must be > 0 minutes")]
    InvalidBadgeThreshold,
}

impl Default for AppSettingsDraft {
    fn default() -> Self {
        Self {
            work_minutes: 25,
            short_break_minutes: 5,
            long_break_minutes: 15,
            sessions_before_long_break: 4,
            default_time_range: TimeRange::LastMonth,
            default_category: CategoryFilter::All,
            subject_averaging: SubjectAveraging::Mean,
            badge_threshold_minutes: 60,
        }
    }
}

impl AppSettingsDraft {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the draft into settings.
    ///
    /// # Errors
    ///
    /// Returns `AppSettingsError` if a pomodoro duration, the long-break
    /// cadence, or the badge threshold is zero.
    pub fn validate(self) -> Result<AppSettings, AppSettingsError> {
        let pomodoro = PomodoroConfig::new(
            minutes(self.work_minutes),
            minutes(self.short_break_minutes),
            minutes(self.long_break_minutes),
            self.sessions_before_long_break,
        )?;
        if self.badge_threshold_minutes == 0 {
            return Err(AppSettingsError::InvalidBadgeThreshold);
        }

        Ok(AppSettings {
            pomodoro,
            default_time_range: self.default_time_range,
            default_category: self.default_category,
            subject_averaging: self.subject_averaging,
            badge_threshold: minutes(self.badge_threshold_minutes),
        })
    }
}

impl AppSettings {
    #[must_use]
    pub fn pomodoro(&self) -> PomodoroConfig {
        self.pomodoro
    }

    #[must_use]
    pub fn default_time_range(&self) -> TimeRange {
        self.default_time_range
    }

    #[must_use]
    pub fn default_category(&self) -> CategoryFilter {
        self.default_category
    }

    #[must_use]
    pub fn subject_averaging(&self) -> SubjectAveraging {
        self.subject_averaging
    }

    /// Minimum session length that earns the one-hour badge.
    #[must_use]
    pub fn badge_threshold(&self) -> Duration {
        self.badge_threshold
    }

    /// Turn the settings back into an editable draft.
    #[must_use]
    pub fn to_draft(&self) -> AppSettingsDraft {
        AppSettingsDraft {
            work_minutes: whole_minutes(self.pomodoro.work()),
            short_break_minutes: whole_minutes(self.pomodoro.short_break()),
            long_break_minutes: whole_minutes(self.pomodoro.long_break()),
            sessions_before_long_break: self.pomodoro.sessions_before_long_break(),
            default_time_range: self.default_time_range,
            default_category: self.default_category,
            subject_averaging: self.subject_averaging,
            badge_threshold_minutes: whole_minutes(self.badge_threshold),
        }
    }
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            pomodoro: PomodoroConfig::default(),
            default_time_range: TimeRange::LastMonth,
            default_category: CategoryFilter::All,
            subject_averaging: SubjectAveraging::Mean,
            badge_threshold: minutes(60),
        }
    }
}

fn minutes(value: u32) -> Duration {
    Duration::from_secs(u64::from(value) * SECONDS_PER_MINUTE)
}

fn whole_minutes(value: Duration) -> u32 {
    u32::try_from(value.as_secs() / SECONDS_PER_MINUTE).unwrap_or(u32::MAX)
}
