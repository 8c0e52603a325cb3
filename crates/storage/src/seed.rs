//! Sample practice exams used for demos and first launch.

use chrono::{DateTime, Utc};
use prep_core::model::{
    ExamCategory, ExamResult, ExamResultDraft, ExamResultError, ExamResultId,
};
use prep_core::time::utc_date;
use thiserror::Error;

use crate::repository::{ExamResultRepository, StorageError};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SeedError {
    #[error("invalid sample date {year}-{month:02}-{day:02}")]
    InvalidDate { year: i32, month: u32, day: u32 },
    #[error(transparent)]
    ExamResult(#[from] ExamResultError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

fn date(year: i32, month: u32, day: u32) -> Result<DateTime<Utc>, SeedError> {
    utc_date(year, month, day).ok_or(SeedError::InvalidDate { year, month, day })
}

fn with_subjects(mut draft: ExamResultDraft, subjects: &[(&str, f64)]) -> ExamResultDraft {
    for (subject, score) in subjects {
        draft = draft.with_subject(*subject, *score);
    }
    draft
}

/// Three TYT and two AYT mock exams from spring 2025.
///
/// # Errors
///
/// Returns `SeedError::InvalidDate` if a sample date cannot be built.
pub fn sample_drafts() -> Result<Vec<ExamResultDraft>, SeedError> {
    Ok(vec![
        with_subjects(
            ExamResultDraft::new("TYT Deneme 1", ExamCategory::Tyt, date(2025, 4, 10)?)
                .with_total_questions(120)
                .with_answers(85, 25, 10)
                .with_net_score(78.75),
            &[
                ("Türkçe", 32.5),
                ("Matematik", 25.0),
                ("Fizik", 7.5),
                ("Kimya", 6.25),
                ("Biyoloji", 5.0),
                ("Tarih", 2.5),
            ],
        ),
        with_subjects(
            ExamResultDraft::new("TYT Deneme 2", ExamCategory::Tyt, date(2025, 3, 25)?)
                .with_total_questions(120)
                .with_answers(80, 30, 10)
                .with_net_score(72.5),
            &[
                ("Türkçe", 30.0),
                ("Matematik", 22.5),
                ("Fizik", 7.5),
                ("Kimya", 5.0),
                ("Biyoloji", 5.0),
                ("Tarih", 2.5),
            ],
        ),
        with_subjects(
            ExamResultDraft::new("AYT Deneme 1", ExamCategory::Ayt, date(2025, 4, 5)?)
                .with_total_questions(160)
                .with_answers(95, 45, 20)
                .with_net_score(83.75),
            &[
                ("Matematik", 30.0),
                ("Fizik", 12.5),
                ("Kimya", 10.0),
                ("Biyoloji", 7.5),
                ("Edebiyat", 15.0),
                ("Tarih", 5.0),
                ("Coğrafya", 3.75),
            ],
        ),
        with_subjects(
            ExamResultDraft::new("AYT Deneme 2", ExamCategory::Ayt, date(2025, 3, 20)?)
                .with_total_questions(160)
                .with_answers(90, 50, 20)
                .with_net_score(77.5),
            &[
                ("Matematik", 27.5),
                ("Fizik", 10.0),
                ("Kimya", 10.0),
                ("Biyoloji", 7.5),
                ("Edebiyat", 12.5),
                ("Tarih", 5.0),
                ("Coğrafya", 5.0),
            ],
        ),
        with_subjects(
            ExamResultDraft::new("TYT Deneme 3", ExamCategory::Tyt, date(2025, 4, 15)?)
                .with_total_questions(120)
                .with_answers(90, 20, 10)
                .with_net_score(85.0),
            &[
                ("Türkçe", 35.0),
                ("Matematik", 27.5),
                ("Fizik", 8.75),
                ("Kimya", 6.25),
                ("Biyoloji", 5.0),
                ("Tarih", 2.5),
            ],
        ),
    ])
}

/// Validate and insert every sample exam into `repo`.
///
/// # Errors
///
/// Returns `SeedError` if a sample fails validation or cannot be stored.
pub async fn seed_sample_results(
    repo: &dyn ExamResultRepository,
) -> Result<Vec<ExamResult>, SeedError> {
    let mut stored = Vec::new();
    for draft in sample_drafts()? {
        let result = draft
            .validate(ExamResultId::new(0))?
            .with_id(repo.allocate_result_id().await?);
        repo.insert_result(&result).await?;
        stored.push(result);
    }
    Ok(stored)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryRepository;

    #[tokio::test]
    async fn seeds_five_results() {
        let repo = InMemoryRepository::new();
        let stored = seed_sample_results(&repo).await.unwrap();
        assert_eq!(stored.len(), 5);

        let listed = repo.list_results().await.unwrap();
        assert_eq!(listed[0].name(), "TYT Deneme 3");
        assert_eq!(listed[4].name(), "AYT Deneme 2");
    }

    #[test]
    fn sample_net_scores_follow_the_penalty_rule() {
        for draft in sample_drafts().unwrap() {
            let derived = prep_core::model::net_score(draft.correct, draft.wrong);
            assert_eq!(draft.net_score, Some(derived), "{}", draft.name);
        }
    }
}
