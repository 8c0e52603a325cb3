use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown exam category: {raw}")]
pub struct ParseCategoryError {
    raw: String,
}

//
// ─── CATEGORY ──────────────────────────────────────────────────────────────────
//

/// The three YKS sessions a practice exam can belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ExamCategory {
    /// Temel Yeterlilik Testi, the basic proficiency session.
    Tyt,
    /// Alan Yeterlilik Testi, the field proficiency session.
    Ayt,
    /// Yabancı Dil Testi, the foreign language session.
    Ydt,
}

impl ExamCategory {
    pub const ALL: [ExamCategory; 3] = [ExamCategory::Tyt, ExamCategory::Ayt, ExamCategory::Ydt];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            ExamCategory::Tyt => "TYT",
            ExamCategory::Ayt => "AYT",
            ExamCategory::Ydt => "YDT",
        }
    }

    /// Subjects in the order they appear on the answer sheet, with their
    /// question counts.
    #[must_use]
    pub fn subjects(self) -> &'static [SubjectLimit] {
        match self {
            ExamCategory::Tyt => TYT_SUBJECTS,
            ExamCategory::Ayt => AYT_SUBJECTS,
            ExamCategory::Ydt => YDT_SUBJECTS,
        }
    }

    /// Question limit for `subject`, if it belongs to this category.
    #[must_use]
    pub fn question_limit(self, subject: &str) -> Option<u32> {
        self.subjects()
            .iter()
            .find(|limit| limit.name == subject)
            .map(|limit| limit.questions)
    }

    /// Total number of questions in a full exam of this category.
    #[must_use]
    pub fn total_questions(self) -> u32 {
        self.subjects().iter().map(|limit| limit.questions).sum()
    }
}

impl fmt::Display for ExamCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ExamCategory {
    type Err = ParseCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        ExamCategory::ALL
            .into_iter()
            .find(|category| category.label().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ParseCategoryError {
                raw: trimmed.to_owned(),
            })
    }
}

//
// ─── SUBJECT CATALOG ───────────────────────────────────────────────────────────
//

/// A subject on an answer sheet and the number of questions it carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubjectLimit {
    pub name: &'static str,
    pub questions: u32,
}

const fn subject(name: &'static str, questions: u32) -> SubjectLimit {
    SubjectLimit { name, questions }
}

static TYT_SUBJECTS: &[SubjectLimit] = &[
    subject("Türkçe", 40),
    subject("Matematik", 40),
    subject("Coğrafya", 5),
    subject("Fizik", 7),
    subject("Kimya", 7),
    subject("Biyoloji", 6),
    subject("Tarih", 5),
    subject("Felsefe", 5),
    subject("Din Kültürü ve Ahlak Bilgisi", 5),
];

static AYT_SUBJECTS: &[SubjectLimit] = &[
    subject("Türk Dili ve Edebiyatı", 24),
    subject("Tarih/1", 10),
    subject("Coğrafya/1", 6),
    subject("Tarih/2", 11),
    subject("Coğrafya/2", 11),
    subject("Felsefe Grubu", 12),
    subject("Din Kültürü ve Ahlak Bilgisi", 6),
    subject("Matematik", 40),
    subject("Fizik", 14),
    subject("Kimya", 13),
    subject("Biyoloji", 13),
];

static YDT_SUBJECTS: &[SubjectLimit] = &[
    subject("Kelime Bilgisi", 5),
    subject("Dilbilgisi", 10),
    subject("Cloze Test", 5),
    subject("Cümleyi Tamamlama", 8),
    subject("İngilizce Cümlenin Türkçe Karşılığını Bulma", 6),
    subject("Türkçe Cümlenin İngilizce Karşılığını Bulma", 6),
    subject("Paragraf", 15),
    subject("Anlamca Yakın Cümleyi Bulma", 5),
    subject("Paragrafta Anlam Bütünlüğünü Sağlayacak Cümleyi Bulma", 5),
    subject("Verilen Durumda Söylenecek İfadeyi Bulma", 5),
    subject("Diyalog Tamamlama", 5),
    subject("Anlam Bütünlüğünü Bozan Cümleyi Bulma", 5),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn totals_match_official_question_counts() {
        assert_eq!(ExamCategory::Tyt.total_questions(), 120);
        assert_eq!(ExamCategory::Ayt.total_questions(), 160);
        assert_eq!(ExamCategory::Ydt.total_questions(), 80);
    }

    #[test]
    fn question_limit_is_scoped_to_category() {
        assert_eq!(ExamCategory::Tyt.question_limit("Matematik"), Some(40));
        assert_eq!(ExamCategory::Ayt.question_limit("Fizik"), Some(14));
        assert_eq!(ExamCategory::Tyt.question_limit("Paragraf"), None);
    }

    #[test]
    fn parses_labels_case_insensitively() {
        assert_eq!("tyt".parse::<ExamCategory>().unwrap(), ExamCategory::Tyt);
        assert_eq!(" AYT ".parse::<ExamCategory>().unwrap(), ExamCategory::Ayt);
        let err = "LGS".parse::<ExamCategory>().unwrap_err();
        assert_eq!(err.to_string(), "unknown exam category: LGS");
    }

    #[test]
    fn serializes_as_label() {
        let json = serde_json::to_string(&ExamCategory::Ydt).unwrap();
        assert_eq!(json, "\"YDT\"");
    }
}
