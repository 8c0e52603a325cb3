use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use prep_core::analytics::{
    self, CategoryFilter, ProgressSummary, SubjectAverage, SubjectAveraging, SubjectTrend,
    TimeRange,
};
use prep_core::model::{AnswerSheet, ExamResult, ExamResultDraft, ExamResultId};
use storage::repository::ExamResultRepository;

use crate::Clock;
use crate::error::ExamServiceError;

// Placeholder until storage allocates the real id.
const UNASSIGNED_ID: ExamResultId = ExamResultId::new(0);

/// A subject's mean score together with its direction of travel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubjectInsight {
    #[serde(flatten)]
    pub average: SubjectAverage,
    pub trend: SubjectTrend,
}

/// Everything the results screen shows for one filter / range choice.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultsDashboard {
    pub filter: CategoryFilter,
    pub range: TimeRange,
    pub generated_at: DateTime<Utc>,
    /// Filtered results, newest first.
    pub results: Vec<ExamResult>,
    pub subjects: Vec<SubjectInsight>,
    pub progress: ProgressSummary,
}

/// Records exam results and derives analytics from the stored list.
#[derive(Clone)]
pub struct ExamResultService {
    clock: Clock,
    results: Arc<dyn ExamResultRepository>,
    averaging: SubjectAveraging,
}

impl ExamResultService {
    #[must_use]
    pub fn new(clock: Clock, results: Arc<dyn ExamResultRepository>) -> Self {
        Self {
            clock,
            results,
            averaging: SubjectAveraging::default(),
        }
    }

    /// Choose how best/worst subjects combine repeated scores.
    #[must_use]
    pub fn with_averaging(mut self, averaging: SubjectAveraging) -> Self {
        self.averaging = averaging;
        self
    }

    #[must_use]
    pub fn averaging(&self) -> SubjectAveraging {
        self.averaging
    }

    /// Validate and store a new result.
    ///
    /// # Errors
    ///
    /// Returns `ExamServiceError::Invalid` if the draft fails validation, or
    /// `ExamServiceError::Storage` if it cannot be stored.
    pub async fn add(&self, draft: ExamResultDraft) -> Result<ExamResult, ExamServiceError> {
        let validated = draft.validate(UNASSIGNED_ID).inspect_err(|err| {
            warn!(%err, "rejected exam result");
        })?;
        let result = validated.with_id(self.results.allocate_result_id().await?);
        self.results.insert_result(&result).await?;
        info!(
            id = %result.id(),
            name = result.name(),
            category = %result.category(),
            net = result.net_score(),
            "exam result recorded"
        );
        Ok(result)
    }

    /// Store the exam described by a filled-in answer sheet, dated now.
    ///
    /// # Errors
    ///
    /// Same as [`ExamResultService::add`].
    pub async fn add_sheet(
        &self,
        sheet: AnswerSheet,
        name: &str,
    ) -> Result<ExamResult, ExamServiceError> {
        self.add(sheet.into_draft(name, self.clock.now())).await
    }

    /// Remove a stored result.
    ///
    /// # Errors
    ///
    /// Returns `ExamServiceError::Storage` if the id is unknown.
    pub async fn delete(&self, id: ExamResultId) -> Result<(), ExamServiceError> {
        self.results.delete_result(id).await?;
        info!(%id, "exam result deleted");
        Ok(())
    }

    /// Stored results in `filter`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `ExamServiceError::Storage` on repository failures.
    pub async fn list(&self, filter: CategoryFilter) -> Result<Vec<ExamResult>, ExamServiceError> {
        let all = self.results.list_results().await?;
        Ok(analytics::filter_by_category(&all, filter))
    }

    /// Subject averages over every result in `filter`.
    ///
    /// # Errors
    ///
    /// Returns `ExamServiceError::Storage` on repository failures.
    pub async fn chart(
        &self,
        filter: CategoryFilter,
    ) -> Result<Vec<SubjectAverage>, ExamServiceError> {
        let results = self.list(filter).await?;
        Ok(analytics::subject_averages(&results))
    }

    /// Progress over the results in `filter` that fall inside `range`.
    ///
    /// # Errors
    ///
    /// Returns `ExamServiceError::Storage` on repository failures.
    pub async fn progress(
        &self,
        filter: CategoryFilter,
        range: TimeRange,
    ) -> Result<ProgressSummary, ExamServiceError> {
        let results = self.list(filter).await?;
        Ok(self.summarise(&results, range, self.clock.now()))
    }

    /// Trend of `subject` across every result in `filter`.
    ///
    /// # Errors
    ///
    /// Returns `ExamServiceError::Storage` on repository failures.
    pub async fn trend(
        &self,
        subject: &str,
        filter: CategoryFilter,
    ) -> Result<SubjectTrend, ExamServiceError> {
        let results = self.list(filter).await?;
        Ok(analytics::subject_trend(subject, &results))
    }

    /// Build the full results view in one repository read.
    ///
    /// # Errors
    ///
    /// Returns `ExamServiceError::Storage` on repository failures.
    pub async fn dashboard(
        &self,
        filter: CategoryFilter,
        range: TimeRange,
    ) -> Result<ResultsDashboard, ExamServiceError> {
        let now = self.clock.now();
        let results = self.list(filter).await?;
        let subjects = analytics::subject_averages(&results)
            .into_iter()
            .map(|average| SubjectInsight {
                trend: analytics::subject_trend(&average.subject, &results),
                average,
            })
            .collect();
        let progress = self.summarise(&results, range, now);

        Ok(ResultsDashboard {
            filter,
            range,
            generated_at: now,
            results,
            subjects,
            progress,
        })
    }

    fn summarise(
        &self,
        results: &[ExamResult],
        range: TimeRange,
        now: DateTime<Utc>,
    ) -> ProgressSummary {
        let summary = analytics::progress_summary_with(results, range, now, self.averaging);
        debug!(
            %range,
            considered = summary.result_count,
            improvement = summary.improvement,
            "progress summary computed"
        );
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prep_core::model::ExamCategory;
    use prep_core::time::{fixed_clock, utc_date};
    use storage::repository::InMemoryRepository;

    fn service() -> ExamResultService {
        ExamResultService::new(fixed_clock(), Arc::new(InMemoryRepository::new()))
    }

    #[tokio::test]
    async fn add_assigns_sequential_ids() {
        let svc = service();
        let date = utc_date(2025, 4, 1).unwrap();
        let first = svc
            .add(ExamResultDraft::new("A", ExamCategory::Tyt, date).with_answers(50, 10, 60))
            .await
            .unwrap();
        let second = svc
            .add(ExamResultDraft::new("B", ExamCategory::Ydt, date).with_answers(40, 8, 32))
            .await
            .unwrap();
        assert_eq!(first.id().value(), 1);
        assert_eq!(second.id().value(), 2);
        assert_eq!(second.total_questions(), 80);
    }

    #[tokio::test]
    async fn invalid_draft_is_not_stored() {
        let svc = service();
        let date = utc_date(2025, 4, 1).unwrap();
        let err = svc
            .add(ExamResultDraft::new("", ExamCategory::Tyt, date))
            .await
            .unwrap_err();
        assert!(matches!(err, ExamServiceError::Invalid(_)));
        assert!(svc.list(CategoryFilter::All).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn rejected_drafts_do_not_consume_ids() {
        let svc = service();
        let date = utc_date(2025, 4, 1).unwrap();
        for _ in 0..3 {
            svc.add(ExamResultDraft::new(" ", ExamCategory::Tyt, date))
                .await
                .unwrap_err();
        }
        let stored = svc
            .add(ExamResultDraft::new("A", ExamCategory::Tyt, date).with_answers(50, 10, 60))
            .await
            .unwrap();
        assert_eq!(stored.id().value(), 1);
    }

    #[tokio::test]
    async fn add_sheet_uses_clock_date() {
        let svc = service();
        let mut sheet = AnswerSheet::new(ExamCategory::Tyt);
        sheet.set("Matematik", 30, 4, 6).unwrap();
        let stored = svc.add_sheet(sheet, "Hafta sonu").await.unwrap();
        assert_eq!(stored.date(), prep_core::time::fixed_now());
        assert_eq!(stored.subject_score("Matematik"), Some(29.0));
    }
}
