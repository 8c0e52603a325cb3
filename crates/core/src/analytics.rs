//! Exam result analytics.
//!
//! Everything here is a pure function of its inputs: callers pass the result
//! list, the filter choices, and the reference instant, and get a freshly
//! derived value back. Empty input never fails; it degrades to empty lists
//! and zero-valued summaries (see [`ProgressSummary::is_empty`]).

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Months, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{ExamCategory, ExamResult};

/// Minimum score change, in net points, for a subject to count as moving.
pub const TREND_THRESHOLD: f64 = 2.0;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown {kind}: {raw}")]
pub struct ParseChoiceError {
    kind: &'static str,
    raw: String,
}

impl ParseChoiceError {
    fn new(kind: &'static str, raw: &str) -> Self {
        Self {
            kind,
            raw: raw.to_owned(),
        }
    }
}

//
// ─── CHOICES ───────────────────────────────────────────────────────────────────
//

/// Which exam categories to include.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryFilter {
    #[default]
    All,
    Only(ExamCategory),
}

impl CategoryFilter {
    #[must_use]
    pub fn matches(self, category: ExamCategory) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(wanted) => wanted == category,
        }
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryFilter::All => f.write_str("all"),
            CategoryFilter::Only(category) => write!(f, "{category}"),
        }
    }
}

impl FromStr for CategoryFilter {
    type Err = ParseChoiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("all") || trimmed == "Tümü" {
            return Ok(CategoryFilter::All);
        }
        trimmed
            .parse::<ExamCategory>()
            .map(CategoryFilter::Only)
            .map_err(|_| ParseChoiceError::new("category filter", trimmed))
    }
}

/// Recency window applied to a result's date.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TimeRange {
    LastWeek,
    #[default]
    LastMonth,
    LastThreeMonths,
    AllTime,
}

impl TimeRange {
    pub const ALL: [TimeRange; 4] = [
        TimeRange::LastWeek,
        TimeRange::LastMonth,
        TimeRange::LastThreeMonths,
        TimeRange::AllTime,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            TimeRange::LastWeek => "last-week",
            TimeRange::LastMonth => "last-month",
            TimeRange::LastThreeMonths => "last-three-months",
            TimeRange::AllTime => "all-time",
        }
    }

    /// Earliest date still inside the window that ends at `reference`.
    ///
    /// Month windows step back by calendar months, clamping to the last day
    /// of a shorter month (31 March minus one month is 28 or 29 February).
    /// Returns `None` for `AllTime` and when the cutoff falls outside the
    /// representable date range.
    #[must_use]
    pub fn cutoff(self, reference: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            TimeRange::LastWeek => reference.checked_sub_signed(Duration::days(7)),
            TimeRange::LastMonth => reference.checked_sub_months(Months::new(1)),
            TimeRange::LastThreeMonths => reference.checked_sub_months(Months::new(3)),
            TimeRange::AllTime => None,
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeRange {
    type Err = ParseChoiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "last-week" | "week" | "7d" => Ok(TimeRange::LastWeek),
            "last-month" | "month" | "1m" => Ok(TimeRange::LastMonth),
            "last-three-months" | "quarter" | "3m" => Ok(TimeRange::LastThreeMonths),
            "all-time" | "all" => Ok(TimeRange::AllTime),
            _ => Err(ParseChoiceError::new("time range", s.trim())),
        }
    }
}

/// How repeated subject scores are combined when picking best/worst subjects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SubjectAveraging {
    /// Arithmetic mean over every occurrence.
    #[default]
    Mean,
    /// Each new score is averaged with the running value: `(running + next) / 2`.
    ///
    /// Order dependent; later exams weigh more. Matches the figures shown by
    /// the first release of the app.
    RunningPairwise,
}

impl FromStr for SubjectAveraging {
    type Err = ParseChoiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mean" => Ok(SubjectAveraging::Mean),
            "running-pairwise" | "running" => Ok(SubjectAveraging::RunningPairwise),
            _ => Err(ParseChoiceError::new("subject averaging", s.trim())),
        }
    }
}

//
// ─── OUTPUTS ───────────────────────────────────────────────────────────────────
//

/// Mean score of one subject across the results that contain it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectAverage {
    pub subject: String,
    pub average: f64,
    pub samples: usize,
}

/// A subject with its combined score, as reported in a progress summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectStanding {
    pub subject: String,
    pub score: f64,
}

/// Aggregate view over the results inside a time range.
///
/// An empty window yields the default value: zero averages, no subjects,
/// zero improvement, zero count.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgressSummary {
    pub average_net_score: f64,
    pub average_percentage: f64,
    pub best_subject: Option<SubjectStanding>,
    pub worst_subject: Option<SubjectStanding>,
    /// Percentage points gained between the earliest and latest result.
    pub improvement: f64,
    pub result_count: usize,
}

impl ProgressSummary {
    /// True when no result fell inside the window.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.result_count == 0
    }

    /// True when `improvement` was measured rather than defaulted.
    #[must_use]
    pub fn has_trend_data(&self) -> bool {
        self.result_count >= 2
    }
}

/// Direction a subject's score moved between its first and last sitting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubjectTrend {
    Improving,
    Declining,
    Stable,
}

impl SubjectTrend {
    /// Classify a last-minus-first score difference.
    #[must_use]
    pub fn from_difference(difference: f64) -> Self {
        if difference >= TREND_THRESHOLD {
            SubjectTrend::Improving
        } else if difference <= -TREND_THRESHOLD {
            SubjectTrend::Declining
        } else {
            SubjectTrend::Stable
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            SubjectTrend::Improving => "improving",
            SubjectTrend::Declining => "declining",
            SubjectTrend::Stable => "stable",
        }
    }
}

impl fmt::Display for SubjectTrend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

//
// ─── FILTERS ───────────────────────────────────────────────────────────────────
//

/// Results whose category passes `filter`, in input order.
#[must_use]
pub fn filter_by_category(results: &[ExamResult], filter: CategoryFilter) -> Vec<ExamResult> {
    match filter {
        CategoryFilter::All => results.to_vec(),
        CategoryFilter::Only(_) => results
            .iter()
            .filter(|result| filter.matches(result.category()))
            .cloned()
            .collect(),
    }
}

/// Results dated on or after the window's cutoff, in input order.
#[must_use]
pub fn filter_by_time_range(
    results: &[ExamResult],
    range: TimeRange,
    reference: DateTime<Utc>,
) -> Vec<ExamResult> {
    if range == TimeRange::AllTime {
        return results.to_vec();
    }
    let Some(cutoff) = range.cutoff(reference) else {
        return Vec::new();
    };
    results
        .iter()
        .filter(|result| result.date() >= cutoff)
        .cloned()
        .collect()
}

//
// ─── AGGREGATES ────────────────────────────────────────────────────────────────
//

/// Per-subject accumulator that remembers first-encounter order.
struct SubjectTable<'a> {
    index: HashMap<&'a str, usize>,
    rows: Vec<(&'a str, f64, usize)>,
}

impl<'a> SubjectTable<'a> {
    fn collect(results: &'a [ExamResult], averaging: SubjectAveraging) -> Self {
        let mut table = Self {
            index: HashMap::new(),
            rows: Vec::new(),
        };
        for entry in results.iter().flat_map(ExamResult::subject_scores) {
            let subject = entry.subject.as_str();
            let existing = table.index.get(subject).copied();
            match existing {
                Some(i) => {
                    let row = &mut table.rows[i];
                    match averaging {
                        SubjectAveraging::Mean => row.1 += entry.score,
                        SubjectAveraging::RunningPairwise => row.1 = (row.1 + entry.score) / 2.0,
                    }
                    row.2 += 1;
                }
                None => {
                    table.index.insert(subject, table.rows.len());
                    table.rows.push((subject, entry.score, 1));
                }
            }
        }
        if averaging == SubjectAveraging::Mean {
            for row in &mut table.rows {
                row.1 /= count_as_f64(row.2);
            }
        }
        table
    }

    fn best(&self) -> Option<SubjectStanding> {
        self.pick(|candidate, current| candidate > current)
    }

    fn worst(&self) -> Option<SubjectStanding> {
        self.pick(|candidate, current| candidate < current)
    }

    // First row wins ties.
    fn pick(&self, replaces: impl Fn(f64, f64) -> bool) -> Option<SubjectStanding> {
        let mut chosen: Option<&(&str, f64, usize)> = None;
        for row in &self.rows {
            if chosen.is_none_or(|current| replaces(row.1, current.1)) {
                chosen = Some(row);
            }
        }
        chosen.map(|(subject, score, _)| SubjectStanding {
            subject: (*subject).to_owned(),
            score: *score,
        })
    }
}

#[allow(clippy::cast_precision_loss)]
fn count_as_f64(count: usize) -> f64 {
    count as f64
}

/// Mean score per subject, strongest first.
///
/// Subjects missing from a result simply do not contribute for that result.
/// Equal means keep the order in which the subjects were first seen.
#[must_use]
pub fn subject_averages(results: &[ExamResult]) -> Vec<SubjectAverage> {
    let table = SubjectTable::collect(results, SubjectAveraging::Mean);
    let mut averages: Vec<SubjectAverage> = table
        .rows
        .into_iter()
        .map(|(subject, average, samples)| SubjectAverage {
            subject: subject.to_owned(),
            average,
            samples,
        })
        .collect();
    averages.sort_by(|a, b| b.average.total_cmp(&a.average));
    averages
}

/// Progress summary with the default subject averaging.
#[must_use]
pub fn progress_summary(
    results: &[ExamResult],
    range: TimeRange,
    reference: DateTime<Utc>,
) -> ProgressSummary {
    progress_summary_with(results, range, reference, SubjectAveraging::default())
}

/// Summarise the results inside `range`, ending at `reference`.
#[must_use]
pub fn progress_summary_with(
    results: &[ExamResult],
    range: TimeRange,
    reference: DateTime<Utc>,
    averaging: SubjectAveraging,
) -> ProgressSummary {
    let window = filter_by_time_range(results, range, reference);
    if window.is_empty() {
        return ProgressSummary::default();
    }

    let count = count_as_f64(window.len());
    let average_net_score = window.iter().map(ExamResult::net_score).sum::<f64>() / count;
    let average_percentage = window
        .iter()
        .map(ExamResult::score_percentage)
        .sum::<f64>()
        / count;

    let table = SubjectTable::collect(&window, averaging);

    let mut chronological: Vec<&ExamResult> = window.iter().collect();
    chronological.sort_by_key(|result| result.date());
    let improvement = match (chronological.first(), chronological.last()) {
        (Some(first), Some(last)) if chronological.len() >= 2 => {
            last.score_percentage() - first.score_percentage()
        }
        _ => 0.0,
    };

    ProgressSummary {
        average_net_score,
        average_percentage,
        best_subject: table.best(),
        worst_subject: table.worst(),
        improvement,
        result_count: window.len(),
    }
}

/// Scores of `subject` in date order, oldest first.
#[must_use]
pub fn subject_history(subject: &str, results: &[ExamResult]) -> Vec<(DateTime<Utc>, f64)> {
    let mut chronological: Vec<&ExamResult> = results.iter().collect();
    chronological.sort_by_key(|result| result.date());
    chronological
        .into_iter()
        .filter_map(|result| {
            result
                .subject_score(subject)
                .map(|score| (result.date(), score))
        })
        .collect()
}

/// Compare the first and last recorded score of `subject`.
///
/// Fewer than two data points reads as stable.
#[must_use]
pub fn subject_trend(subject: &str, results: &[ExamResult]) -> SubjectTrend {
    let history = subject_history(subject, results);
    match (history.first(), history.last()) {
        (Some((_, first)), Some((_, last))) if history.len() >= 2 => {
            SubjectTrend::from_difference(last - first)
        }
        _ => SubjectTrend::Stable,
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
