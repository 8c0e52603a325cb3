use std::sync::Arc;

use async_trait::async_trait;
use prep_core::analytics::{CategoryFilter, SubjectAveraging, SubjectTrend, TimeRange};
use prep_core::model::{AppSettingsDraft, ExamCategory, ExamResult, ExamResultId};
use prep_core::time::fixed_clock;
use services::{AppServices, ExamResultService, ExamServiceError};
use storage::repository::{ExamResultRepository, Storage, StorageError};

const TYT: CategoryFilter = CategoryFilter::Only(ExamCategory::Tyt);

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

async fn seeded() -> AppServices {
    let app = AppServices::in_memory(fixed_clock()).await.unwrap();
    assert_eq!(app.seed_samples().await.unwrap(), 5);
    app
}

#[tokio::test]
async fn tyt_all_time_dashboard() {
    let app = seeded().await;
    let dashboard = app
        .exam_results()
        .dashboard(TYT, TimeRange::AllTime)
        .await
        .unwrap();

    let names: Vec<&str> = dashboard.results.iter().map(ExamResult::name).collect();
    assert_eq!(names, vec!["TYT Deneme 3", "TYT Deneme 1", "TYT Deneme 2"]);

    let progress = &dashboard.progress;
    assert_eq!(progress.result_count, 3);
    assert!(close(progress.average_net_score, 78.75));
    assert!(close(progress.average_percentage, 65.625));
    assert!(close(progress.improvement, (85.0 - 72.5) / 120.0 * 100.0));

    let best = progress.best_subject.as_ref().unwrap();
    assert_eq!(best.subject, "Türkçe");
    assert!(close(best.score, 32.5));
    assert_eq!(progress.worst_subject.as_ref().unwrap().subject, "Tarih");

    let math = dashboard
        .subjects
        .iter()
        .find(|s| s.average.subject == "Matematik")
        .unwrap();
    assert!(close(math.average.average, 25.0));
    assert_eq!(math.trend, SubjectTrend::Improving);
    let physics = dashboard
        .subjects
        .iter()
        .find(|s| s.average.subject == "Fizik")
        .unwrap();
    assert_eq!(physics.trend, SubjectTrend::Stable);
}

#[tokio::test]
async fn chart_covers_every_subject_across_categories() {
    let app = seeded().await;
    let chart = app.exam_results().chart(CategoryFilter::All).await.unwrap();
    assert_eq!(chart.len(), 8);
    assert_eq!(chart[0].subject, "Türkçe");
    assert_eq!(chart[1].subject, "Matematik");
    assert!(close(chart[1].average, 26.5));
    assert_eq!(chart.last().unwrap().subject, "Tarih");
}

#[tokio::test]
async fn time_ranges_narrow_the_summary() {
    let app = seeded().await;
    let exams = app.exam_results();

    // The clock sits at 2025-04-20 09:00, so the month window starts after
    // the 20 March exam.
    let month = exams
        .progress(CategoryFilter::All, TimeRange::LastMonth)
        .await
        .unwrap();
    assert_eq!(month.result_count, 4);

    let week = exams
        .progress(CategoryFilter::All, TimeRange::LastWeek)
        .await
        .unwrap();
    assert_eq!(week.result_count, 1);
    assert_eq!(week.improvement, 0.0);

    let ydt = exams
        .progress(CategoryFilter::Only(ExamCategory::Ydt), TimeRange::AllTime)
        .await
        .unwrap();
    assert!(ydt.is_empty());
    assert!(ydt.best_subject.is_none());
}

#[tokio::test]
async fn stored_settings_select_running_average() {
    let storage = Storage::in_memory();
    let first = AppServices::new(fixed_clock(), storage.clone()).await.unwrap();
    first
        .app_settings()
        .save(AppSettingsDraft {
            subject_averaging: SubjectAveraging::RunningPairwise,
            ..AppSettingsDraft::default()
        })
        .await
        .unwrap();

    let app = AppServices::new(fixed_clock(), storage).await.unwrap();
    assert_eq!(
        app.exam_results().averaging(),
        SubjectAveraging::RunningPairwise
    );
    app.seed_samples().await.unwrap();

    let progress = app
        .exam_results()
        .progress(TYT, TimeRange::AllTime)
        .await
        .unwrap();
    // Newest first: 35.0, then 32.5, then 30.0, folded pairwise.
    let best = progress.best_subject.unwrap();
    assert_eq!(best.subject, "Türkçe");
    assert!(close(best.score, 31.875));
}

#[tokio::test]
async fn deleting_a_result_updates_the_list() {
    let app = seeded().await;
    let exams = app.exam_results();
    let newest = exams.list(CategoryFilter::All).await.unwrap()[0].id();
    exams.delete(newest).await.unwrap();
    assert_eq!(exams.list(CategoryFilter::All).await.unwrap().len(), 4);
    assert!(matches!(
        exams.delete(newest).await,
        Err(ExamServiceError::Storage(StorageError::NotFound))
    ));
}

struct Unavailable;

#[async_trait]
impl ExamResultRepository for Unavailable {
    async fn allocate_result_id(&self) -> Result<ExamResultId, StorageError> {
        Err(StorageError::Connection("offline".into()))
    }

    async fn insert_result(&self, _result: &ExamResult) -> Result<(), StorageError> {
        Err(StorageError::Connection("offline".into()))
    }

    async fn get_result(&self, _id: ExamResultId) -> Result<Option<ExamResult>, StorageError> {
        Err(StorageError::Connection("offline".into()))
    }

    async fn list_results(&self) -> Result<Vec<ExamResult>, StorageError> {
        Err(StorageError::Connection("offline".into()))
    }

    async fn delete_result(&self, _id: ExamResultId) -> Result<(), StorageError> {
        Err(StorageError::Connection("offline".into()))
    }
}

#[tokio::test]
async fn storage_failures_surface_instead_of_empty_summaries() {
    let svc = ExamResultService::new(fixed_clock(), Arc::new(Unavailable));
    let err = svc
        .dashboard(CategoryFilter::All, TimeRange::AllTime)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "connection error: offline");
}
