mod answer_sheet;
mod app_settings;
mod exam;
mod exam_result;
mod ids;
mod study;

pub use ids::{ExamResultId, ParseIdError, StudySessionId};

pub use answer_sheet::{AnswerSheet, DEFAULT_EXAM_NAME, SubjectTally};
pub use app_settings::{AppSettings, AppSettingsDraft, AppSettingsError};
pub use exam::{ExamCategory, ParseCategoryError, SubjectLimit};
pub use exam_result::{
    ExamResult, ExamResultDraft, ExamResultError, SubjectScore, WRONG_ANSWER_PENALTY, net_score,
};
pub use study::{Badge, HOUR_HERO_BADGE, StudySession, completion_ratio};
