use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::exam::ExamCategory;
use crate::model::ids::ExamResultId;

/// Fraction of a correct answer that each wrong answer cancels out.
pub const WRONG_ANSWER_PENALTY: f64 = 0.25;

/// Net score for a tally of answers: correct minus a quarter of wrong.
#[must_use]
pub fn net_score(correct: u32, wrong: u32) -> f64 {
    f64::from(correct) - f64::from(wrong) * WRONG_ANSWER_PENALTY
}

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum ExamResultError {
    #[error("exam name cannot be empty")]
    EmptyName,

    #[error("exam must have at least one question")]
    NoQuestions,

    #[error("answered questions ({answered}) exceed total questions ({total})")]
    CountsExceedTotal { answered: u64, total: u32 },

    #[error("scores must be finite numbers")]
    NonFiniteScore,

    #[error("subject name cannot be empty")]
    EmptySubject,

    #[error("subject {subject} is not part of {category}")]
    UnknownSubject {
        subject: String,
        category: ExamCategory,
    },
}

//
// ─── SUBJECT SCORE ─────────────────────────────────────────────────────────────
//

/// Net score achieved in one subject of an exam.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectScore {
    pub subject: String,
    pub score: f64,
}

impl SubjectScore {
    #[must_use]
    pub fn new(subject: impl Into<String>, score: f64) -> Self {
        Self {
            subject: subject.into(),
            score,
        }
    }
}

//
// ─── EXAM RESULT ───────────────────────────────────────────────────────────────
//

/// A validated practice exam result. Never mutated once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExamResult {
    id: ExamResultId,
    name: String,
    category: ExamCategory,
    date: DateTime<Utc>,
    total_questions: u32,
    correct: u32,
    wrong: u32,
    empty: u32,
    net_score: f64,
    subject_scores: Vec<SubjectScore>,
}

impl ExamResult {
    #[must_use]
    pub fn id(&self) -> ExamResultId {
        self.id
    }

    /// Replace the identifier, keeping every validated field.
    ///
    /// Lets a caller validate before storage hands out a real id.
    #[must_use]
    pub fn with_id(mut self, id: ExamResultId) -> Self {
        self.id = id;
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn category(&self) -> ExamCategory {
        self.category
    }

    #[must_use]
    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }

    #[must_use]
    pub fn total_questions(&self) -> u32 {
        self.total_questions
    }

    #[must_use]
    pub fn correct(&self) -> u32 {
        self.correct
    }

    #[must_use]
    pub fn wrong(&self) -> u32 {
        self.wrong
    }

    #[must_use]
    pub fn empty(&self) -> u32 {
        self.empty
    }

    #[must_use]
    pub fn net_score(&self) -> f64 {
        self.net_score
    }

    #[must_use]
    pub fn subject_scores(&self) -> &[SubjectScore] {
        &self.subject_scores
    }

    /// Score for `subject`, taking the first entry if it appears twice.
    #[must_use]
    pub fn subject_score(&self, subject: &str) -> Option<f64> {
        self.subject_scores
            .iter()
            .find(|entry| entry.subject == subject)
            .map(|entry| entry.score)
    }

    /// Net score as a percentage of the total question count.
    #[must_use]
    pub fn score_percentage(&self) -> f64 {
        self.net_score / f64::from(self.total_questions) * 100.0
    }
}

//
// ─── DRAFT ─────────────────────────────────────────────────────────────────────
//

/// Unvalidated exam result as entered by the user.
#[derive(Debug, Clone, PartialEq)]
pub struct ExamResultDraft {
    pub name: String,
    pub category: ExamCategory,
    pub date: DateTime<Utc>,
    pub total_questions: u32,
    pub correct: u32,
    pub wrong: u32,
    pub empty: u32,
    /// Explicit net score. Derived from `correct` and `wrong` when `None`.
    pub net_score: Option<f64>,
    pub subject_scores: Vec<SubjectScore>,
}

impl ExamResultDraft {
    #[must_use]
    pub fn new(name: impl Into<String>, category: ExamCategory, date: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            category,
            date,
            total_questions: category.total_questions(),
            correct: 0,
            wrong: 0,
            empty: 0,
            net_score: None,
            subject_scores: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_total_questions(mut self, total: u32) -> Self {
        self.total_questions = total;
        self
    }

    #[must_use]
    pub fn with_answers(mut self, correct: u32, wrong: u32, empty: u32) -> Self {
        self.correct = correct;
        self.wrong = wrong;
        self.empty = empty;
        self
    }

    #[must_use]
    pub fn with_net_score(mut self, net: f64) -> Self {
        self.net_score = Some(net);
        self
    }

    #[must_use]
    pub fn with_subject(mut self, subject: impl Into<String>, score: f64) -> Self {
        self.subject_scores.push(SubjectScore::new(subject, score));
        self
    }

    /// Validate the draft and assign it an identifier.
    ///
    /// # Errors
    ///
    /// Returns `ExamResultError` if the name is blank, the exam has no
    /// questions, the answer counts exceed the total, a subject name is blank,
    /// or any score is not finite.
    pub fn validate(self, id: ExamResultId) -> Result<ExamResult, ExamResultError> {
        let name = self.name.trim().to_owned();
        if name.is_empty() {
            return Err(ExamResultError::EmptyName);
        }
        if self.total_questions == 0 {
            return Err(ExamResultError::NoQuestions);
        }
        let answered = u64::from(self.correct) + u64::from(self.wrong) + u64::from(self.empty);
        if answered > u64::from(self.total_questions) {
            return Err(ExamResultError::CountsExceedTotal {
                answered,
                total: self.total_questions,
            });
        }

        let net = self
            .net_score
            .unwrap_or_else(|| net_score(self.correct, self.wrong));
        if !net.is_finite() {
            return Err(ExamResultError::NonFiniteScore);
        }

        let mut subject_scores = Vec::with_capacity(self.subject_scores.len());
        for entry in self.subject_scores {
            let subject = entry.subject.trim().to_owned();
            if subject.is_empty() {
                return Err(ExamResultError::EmptySubject);
            }
            if !entry.score.is_finite() {
                return Err(ExamResultError::NonFiniteScore);
            }
            subject_scores.push(SubjectScore::new(subject, entry.score));
        }

        Ok(ExamResult {
            id,
            name,
            category: self.category,
            date: self.date,
            total_questions: self.total_questions,
            correct: self.correct,
            wrong: self.wrong,
            empty: self.empty,
            net_score: net,
            subject_scores,
        })
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    fn draft() -> ExamResultDraft {
        ExamResultDraft::new("TYT Deneme 1", ExamCategory::Tyt, fixed_now())
            .with_answers(85, 25, 10)
            .with_subject("Türkçe", 32.5)
            .with_subject("Matematik", 25.0)
    }

    #[test]
    fn derives_net_score_from_answers() {
        let result = draft().validate(ExamResultId::new(1)).unwrap();
        assert_eq!(result.total_questions(), 120);
        assert!((result.net_score() - 78.75).abs() < 1e-9);
        assert!((result.score_percentage() - 65.625).abs() < 1e-9);
    }

    #[test]
    fn with_id_only_changes_the_identifier() {
        let validated = draft().validate(ExamResultId::new(0)).unwrap();
        let stored = validated.clone().with_id(ExamResultId::new(7));
        assert_eq!(stored.id().value(), 7);
        assert_eq!(stored.name(), validated.name());
        assert_eq!(stored.subject_scores(), validated.subject_scores());
    }

    #[test]
    fn explicit_net_score_wins() {
        let result = draft()
            .with_net_score(80.0)
            .validate(ExamResultId::new(1))
            .unwrap();
        assert_eq!(result.net_score(), 80.0);
    }

    #[test]
    fn trims_name_and_subjects() {
        let mut d = draft();
        d.name = "  Deneme  ".into();
        d.subject_scores.push(SubjectScore::new(" Fizik ", 7.5));
        let result = d.validate(ExamResultId::new(2)).unwrap();
        assert_eq!(result.name(), "Deneme");
        assert_eq!(result.subject_score("Fizik"), Some(7.5));
        assert_eq!(result.subject_score("Kimya"), None);
    }

    #[test]
    fn rejects_blank_name() {
        let mut d = draft();
        d.name = "   ".into();
        assert_eq!(
            d.validate(ExamResultId::new(1)).unwrap_err(),
            ExamResultError::EmptyName
        );
    }

    #[test]
    fn rejects_zero_questions() {
        let d = draft().with_total_questions(0);
        assert_eq!(
            d.validate(ExamResultId::new(1)).unwrap_err(),
            ExamResultError::NoQuestions
        );
    }

    #[test]
    fn rejects_counts_above_total() {
        let d = draft().with_answers(100, 20, 10);
        assert_eq!(
            d.validate(ExamResultId::new(1)).unwrap_err(),
            ExamResultError::CountsExceedTotal {
                answered: 130,
                total: 120
            }
        );
    }

    #[test]
    fn rejects_non_finite_scores() {
        let d = draft().with_subject("Fizik", f64::NAN);
        assert_eq!(
            d.validate(ExamResultId::new(1)).unwrap_err(),
            ExamResultError::NonFiniteScore
        );
        let d = draft().with_net_score(f64::INFINITY);
        assert!(d.validate(ExamResultId::new(1)).is_err());
    }

    #[test]
    fn rejects_blank_subject() {
        let d = draft().with_subject(" ", 1.0);
        assert_eq!(
            d.validate(ExamResultId::new(1)).unwrap_err(),
            ExamResultError::EmptySubject
        );
    }
}
