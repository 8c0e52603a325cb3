use thiserror::Error;

use crate::model::{AppSettingsError, ExamResultError};
use crate::pomodoro::PomodoroError;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    ExamResult(#[from] ExamResultError),
    #[error(transparent)]
    Pomodoro(#[from] PomodoroError),
    #[error(transparent)]
    Settings(#[from] AppSettingsError),
}
