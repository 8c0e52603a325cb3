use chrono::{DateTime, Utc};

use crate::model::exam::ExamCategory;
use crate::model::exam_result::{ExamResultDraft, ExamResultError, SubjectScore, net_score};

/// Name given to an exam entered without one.
pub const DEFAULT_EXAM_NAME: &str = "Yeni Deneme";

/// Correct / wrong / empty counts entered for one subject.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubjectTally {
    pub correct: u32,
    pub wrong: u32,
    pub empty: u32,
}

impl SubjectTally {
    #[must_use]
    pub fn net(&self) -> f64 {
        net_score(self.correct, self.wrong)
    }
}

/// Per-subject answer entry for one exam, bound to a category's catalog.
///
/// Each count is clamped to the subject's question limit as it is entered,
/// so a tally can never claim more answers of one kind than the subject has
/// questions.
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerSheet {
    category: ExamCategory,
    tallies: Vec<SubjectTally>,
}

impl AnswerSheet {
    #[must_use]
    pub fn new(category: ExamCategory) -> Self {
        Self {
            category,
            tallies: vec![SubjectTally::default(); category.subjects().len()],
        }
    }

    #[must_use]
    pub fn category(&self) -> ExamCategory {
        self.category
    }

    /// Record the counts for `subject`, replacing earlier input.
    ///
    /// # Errors
    ///
    /// Returns `ExamResultError::UnknownSubject` if the subject is not on this
    /// category's sheet.
    pub fn set(
        &mut self,
        subject: &str,
        correct: u32,
        wrong: u32,
        empty: u32,
    ) -> Result<SubjectTally, ExamResultError> {
        let subjects = self.category.subjects();
        let index = subjects
            .iter()
            .position(|limit| limit.name == subject)
            .ok_or_else(|| ExamResultError::UnknownSubject {
                subject: subject.to_owned(),
                category: self.category,
            })?;
        let limit = subjects[index].questions;
        let tally = SubjectTally {
            correct: correct.min(limit),
            wrong: wrong.min(limit),
            empty: empty.min(limit),
        };
        self.tallies[index] = tally;
        Ok(tally)
    }

    #[must_use]
    pub fn tally(&self, subject: &str) -> Option<SubjectTally> {
        self.category
            .subjects()
            .iter()
            .position(|limit| limit.name == subject)
            .map(|index| self.tallies[index])
    }

    /// Sum of subject nets.
    #[must_use]
    pub fn total_net(&self) -> f64 {
        self.tallies.iter().map(SubjectTally::net).sum()
    }

    /// Convert the sheet into an exam draft.
    ///
    /// Every subject on the sheet contributes a score, including untouched
    /// ones at zero. The question total is the full exam size of the category.
    #[must_use]
    pub fn into_draft(self, name: &str, date: DateTime<Utc>) -> ExamResultDraft {
        let name = match name.trim() {
            "" => DEFAULT_EXAM_NAME,
            trimmed => trimmed,
        };
        let subject_scores: Vec<SubjectScore> = self
            .category
            .subjects()
            .iter()
            .zip(&self.tallies)
            .map(|(limit, tally)| SubjectScore::new(limit.name, tally.net()))
            .collect();

        let (correct, wrong, empty) = self.tallies.iter().fold((0, 0, 0), |acc, t| {
            (
                acc.0 + t.correct,
                acc.1 + t.wrong,
                acc.2 + t.empty,
            )
        });

        ExamResultDraft {
            name: name.to_owned(),
            category: self.category,
            date,
            total_questions: self.category.total_questions(),
            correct,
            wrong,
            empty,
            net_score: Some(subject_scores.iter().map(|s| s.score).sum()),
            subject_scores,
        }
    }
}
