mod common;

use assert_matches::assert_matches;
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};

use common::{processor, TestApp};
use woolchain_api::{
    errors::ServiceError,
    models::{snapshot::Rates, BatchStatus, QualityCheck, SnapshotPeriod, Stage},
    services::{lifecycle::BatchUpdateInput, snapshot_worker},
};

fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
}

fn stage_count(metrics: &woolchain_api::models::snapshot::SnapshotMetrics, stage: Stage) -> u64 {
    metrics
        .batches
        .by_stage
        .iter()
        .find(|c| c.stage == stage)
        .map_or(0, |c| c.count)
}

#[tokio::test]
async fn empty_store_has_zero_rates() {
    let app = TestApp::new().await;

    let metrics = app
        .state
        .services
        .analytics
        .compute_snapshot(SnapshotPeriod::Daily, Utc::now())
        .await
        .unwrap();

    assert_eq!(metrics.batches.total, 0);
    assert_eq!(metrics.rates, Rates::default());
    assert!(metrics.rates.completion_rate.is_finite());
    assert_eq!(metrics.production.average_batch_weight_kg, None);
    assert!(metrics.efficiency.bottlenecks.is_empty());
}

#[tokio::test]
async fn snapshot_reflects_state_at_cutoff() {
    let app = TestApp::new().await;
    let farm = app.approved_farm("Glenmore Station").await;
    let batch = app.create_batch(&farm, at(2024, 1, 1)).await;
    // Cleaning on Jan 2, Sorting Jan 3, Carding Jan 4.
    app.advance_to(batch, Stage::Carding).await;

    let analytics = &app.state.services.analytics;
    let early = analytics
        .compute_snapshot(SnapshotPeriod::Weekly, at(2024, 1, 2) + Duration::hours(6))
        .await
        .unwrap();
    assert_eq!(early.batches.total, 1);
    assert_eq!(stage_count(&early, Stage::Cleaning), 1);
    assert_eq!(stage_count(&early, Stage::Carding), 0);
    assert_eq!(early.activity.updates_recorded, 2);

    let late = analytics
        .compute_snapshot(SnapshotPeriod::Daily, at(2024, 2, 1))
        .await
        .unwrap();
    assert_eq!(stage_count(&late, Stage::Carding), 1);
    assert_eq!(late.activity.updates_recorded, 0);

    let before = analytics
        .compute_snapshot(SnapshotPeriod::Daily, at(2023, 12, 1))
        .await
        .unwrap();
    assert_eq!(before.batches.total, 0);
}

#[tokio::test]
async fn rates_are_percentages_of_their_population() {
    let app = TestApp::new().await;
    let farm = app.approved_farm("Glenmore Station").await;
    let lifecycle = &app.state.services.lifecycle;

    let finished = app.create_batch(&farm, at(2024, 3, 1)).await;
    app.advance_to(finished, Stage::Completed).await;

    let open = app.create_batch(&farm, at(2024, 3, 2)).await;
    let mut inspected = BatchUpdateInput::note(
        Stage::Cleaning,
        BatchStatus::InProgress,
        processor(),
        at(2024, 3, 3),
        "inspected",
    );
    inspected.quality_check = Some(QualityCheck {
        performed: true,
        passed: Some(false),
        score: Some(40),
        ..Default::default()
    });
    lifecycle.apply_update(open.id, None, inspected).await.unwrap();

    let metrics = app
        .state
        .services
        .analytics
        .compute_snapshot(SnapshotPeriod::Monthly, at(2024, 3, 31))
        .await
        .unwrap();

    assert_eq!(metrics.batches.total, 2);
    assert_eq!(metrics.rates.completion_rate, 50.0);
    assert_eq!(metrics.quality.checks_failed, 1);
    assert_eq!(metrics.rates.quality_pass_rate, 0.0);
    assert_eq!(metrics.rates.on_time_rate, 100.0);
    assert_eq!(metrics.production.total_wool_kg, 500.0);
    for rate in [
        metrics.rates.completion_rate,
        metrics.rates.quality_pass_rate,
        metrics.rates.on_time_rate,
    ] {
        assert!((0.0..=100.0).contains(&rate));
    }
}

#[tokio::test]
async fn computing_twice_gives_identical_metrics() {
    let app = TestApp::new().await;
    let farm = app.approved_farm("Glenmore Station").await;
    let batch = app.create_batch(&farm, at(2024, 5, 1)).await;
    app.advance_to(batch, Stage::Spinning).await;

    let analytics = &app.state.services.analytics;
    let as_of = at(2024, 5, 20);
    let first = analytics.compute_snapshot(SnapshotPeriod::Weekly, as_of).await.unwrap();
    let second = analytics.compute_snapshot(SnapshotPeriod::Weekly, as_of).await.unwrap();

    assert_eq!(first, second);
}

#[tokio::test]
async fn regenerating_replaces_the_stored_snapshot() {
    let app = TestApp::new().await;
    let analytics = &app.state.services.analytics;
    let as_of = at(2024, 6, 30);

    let first = analytics
        .generate_snapshot(SnapshotPeriod::Daily, as_of, "test")
        .await
        .unwrap();
    let farm = app.approved_farm("Glenmore Station").await;
    app.create_batch(&farm, at(2024, 6, 29)).await;
    let second = analytics
        .generate_snapshot(SnapshotPeriod::Daily, as_of + Duration::hours(1), "test")
        .await
        .unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(second.metrics.batches.total, 1);

    let stored = analytics
        .get_date_range(
            SnapshotPeriod::Daily,
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(stored.len(), 1);
}

#[tokio::test]
async fn trend_needs_a_snapshot_one_period_back() {
    let app = TestApp::new().await;
    let analytics = &app.state.services.analytics;

    assert!(analytics.get_trend(SnapshotPeriod::Monthly).await.unwrap().is_none());

    analytics
        .generate_snapshot(SnapshotPeriod::Monthly, at(2024, 4, 15), "test")
        .await
        .unwrap();
    assert!(analytics.get_trend(SnapshotPeriod::Monthly).await.unwrap().is_none());

    // Two months back is not "one period" back.
    analytics
        .generate_snapshot(SnapshotPeriod::Monthly, at(2024, 2, 15), "test")
        .await
        .unwrap();
    assert!(analytics.get_trend(SnapshotPeriod::Monthly).await.unwrap().is_none());
}

#[tokio::test]
async fn quarterly_trend_compares_with_previous_quarter() {
    let app = TestApp::new().await;
    let farm = app.approved_farm("Glenmore Station").await;
    app.create_batch(&farm, at(2024, 1, 5)).await;
    app.create_batch(&farm, at(2024, 3, 1)).await;

    let analytics = &app.state.services.analytics;
    analytics
        .generate_snapshot(SnapshotPeriod::Quarterly, at(2024, 4, 15), "test")
        .await
        .unwrap();
    analytics
        .generate_snapshot(SnapshotPeriod::Quarterly, at(2024, 1, 15), "test")
        .await
        .unwrap();

    let trend = analytics
        .get_trend(SnapshotPeriod::Quarterly)
        .await
        .unwrap()
        .expect("both quarters are stored");

    assert_eq!(trend.current.date, NaiveDate::from_ymd_opt(2024, 4, 15).unwrap());
    assert_eq!(trend.previous.date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
    assert_eq!(trend.current.metrics.batches.total, 2);
    assert_eq!(trend.previous.metrics.batches.total, 1);
    assert_eq!(trend.deltas.total_batches, Some(100.0));
    // Nothing completed in either quarter.
    assert_eq!(trend.deltas.completion_rate, None);

    assert!(analytics.get_trend(SnapshotPeriod::Monthly).await.unwrap().is_none());
}

#[tokio::test]
async fn inverted_date_range_is_rejected() {
    let app = TestApp::new().await;

    let result = app
        .state
        .services
        .analytics
        .get_date_range(
            SnapshotPeriod::Daily,
            NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        )
        .await;

    assert_matches!(result, Err(ServiceError::ValidationError(_)));
}

#[tokio::test]
async fn recent_updates_are_newest_first_and_farm_summary_counts_stages() {
    let app = TestApp::new().await;
    let farm = app.approved_farm("Glenmore Station").await;
    let batch = app.create_batch(&farm, at(2024, 7, 1)).await;
    app.advance_to(batch, Stage::Sorting).await;
    app.create_batch(&farm, at(2024, 7, 10)).await;

    let analytics = &app.state.services.analytics;
    let recent = analytics.recent_updates(2).await.unwrap();
    assert_eq!(recent.len(), 2);
    assert!(recent[0].timestamp >= recent[1].timestamp);
    assert_eq!(recent[0].timestamp, at(2024, 7, 10));

    let summary = analytics.farm_summary(farm.id).await.unwrap();
    assert_eq!(summary.total_batches, 2);
    assert_eq!(summary.active_batches, 2);
    assert_eq!(summary.completed_batches, 0);
    assert_eq!(summary.total_wool_kg, 500.0);
    assert_eq!(summary.by_stage.len(), 2);
}

#[tokio::test]
async fn worker_tick_stores_one_snapshot_per_period() {
    let app = TestApp::new().await;
    let analytics = &app.state.services.analytics;
    let periods = [SnapshotPeriod::Daily, SnapshotPeriod::Monthly];

    let stored = snapshot_worker::run_once(analytics, &periods, at(2024, 8, 31)).await;
    assert_eq!(stored, 2);

    let monthly = analytics.get_latest(SnapshotPeriod::Monthly).await.unwrap().expect("monthly snapshot stored");
    assert_eq!(monthly.calculated_by, snapshot_worker::WORKER_NAME);
    assert_eq!(monthly.date, NaiveDate::from_ymd_opt(2024, 8, 31).unwrap());
}
