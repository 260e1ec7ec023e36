mod common;

use chrono::{Duration, NaiveDate, TimeZone, Utc};
use common::{daily_series, sample_provider, CountingProvider};
use std::sync::Arc;
use stock_dashboard::{
    compute_metrics, Clock, Dashboard, DashboardError, DashboardQuery, ManualClock, RangeError,
    DEFAULT_TTL_SECONDS,
};

fn date(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
}

fn clock() -> ManualClock {
    ManualClock::new(Utc.with_ymd_and_hms(2024, 1, 12, 14, 0, 0).unwrap())
}

#[tokio::test]
async fn repeated_render_within_ttl_fetches_once() {
    let provider = CountingProvider::new(sample_provider());
    let dashboard = Dashboard::new(provider.clone());
    let clock = clock();
    let query = DashboardQuery::new("AAPL", date(1), date(12));

    let first = dashboard.run(&query, clock.now()).await.unwrap();
    clock.advance(Duration::seconds(DEFAULT_TTL_SECONDS - 1));
    let second = dashboard.run(&query, clock.now()).await.unwrap();

    assert_eq!(provider.calls(), 1);
    assert!(Arc::ptr_eq(&first.series, &second.series));
    assert_eq!(first.metrics, second.metrics);

    clock.advance(Duration::seconds(1));
    dashboard.run(&query, clock.now()).await.unwrap();
    assert_eq!(provider.calls(), 2);
}

#[tokio::test]
async fn empty_ticker_result_is_not_refetched_within_ttl() {
    let provider = CountingProvider::new(sample_provider());
    let dashboard = Dashboard::new(provider.clone());
    let clock = clock();
    let query = DashboardQuery::new("NODATA", date(1), date(12));

    for _ in 0..3 {
        let err = dashboard.run(&query, clock.now()).await.unwrap_err();
        assert!(matches!(err, DashboardError::NoData { .. }));
        clock.advance(Duration::minutes(10));
    }

    assert_eq!(provider.calls(), 1);
}

#[tokio::test]
async fn range_outside_data_is_no_data() {
    let dashboard = Dashboard::new(sample_provider());
    let query = DashboardQuery::new("AAPL", NaiveDate::from_ymd_opt(2023, 6, 1).unwrap(), NaiveDate::from_ymd_opt(2023, 6, 30).unwrap());

    let err = dashboard.run(&query, clock().now()).await.unwrap_err();
    assert_eq!(
        err,
        DashboardError::NoData {
            ticker: "AAPL".to_string()
        }
    );
}

#[tokio::test]
async fn invalid_ranges_never_reach_the_provider() {
    let provider = CountingProvider::new(sample_provider());
    let dashboard = Dashboard::new(provider.clone());
    let now = clock().now();

    let cases = [
        (date(10), date(5), RangeError::StartAfterEnd),
        (date(13), date(13), RangeError::StartInFuture),
        (date(5), date(13), RangeError::EndInFuture),
    ];

    for (start, end, expected) in cases {
        let err = dashboard
            .run(&DashboardQuery::new("AAPL", start, end), now)
            .await
            .unwrap_err();
        assert_eq!(err, DashboardError::Range(expected));
    }

    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn single_point_series_renders_with_undefined_summary() {
    let dashboard = Dashboard::new(sample_provider());
    let report = dashboard
        .run(&DashboardQuery::new("flat", date(1), date(12)), clock().now())
        .await
        .unwrap();

    let view = report.view();
    assert_eq!(view.table.len(), 1);
    assert!(view.metrics.iter().all(|card| card.value.is_none()));
}

#[tokio::test]
async fn same_day_range_ending_today_is_accepted() {
    let mut provider = sample_provider();
    provider.add_series(
        stock_dashboard::Ticker::parse("TODAY").unwrap(),
        daily_series(date(12), &[42.0]),
    );
    let dashboard = Dashboard::new(provider);

    let report = dashboard
        .run(&DashboardQuery::new("TODAY", date(12), date(12)), clock().now())
        .await
        .unwrap();
    assert_eq!(report.series.len(), 1);
}

#[test]
fn metrics_follow_their_definitions() {
    let closes = [185.64, 184.25, 181.91, 181.18, 185.56, 185.14, 186.19];
    let series = daily_series(date(2), &closes);
    let metrics = compute_metrics(&series).unwrap();

    assert_eq!(metrics.daily_return.len(), closes.len());
    assert_eq!(metrics.daily_return[0], None);

    let mut growth = 1.0;
    let mut peak = f64::NEG_INFINITY;
    for i in 0..closes.len() {
        if i > 0 {
            let expected = closes[i] / closes[i - 1] - 1.0;
            assert!((metrics.daily_return[i].unwrap() - expected).abs() < 1e-12);
            growth *= 1.0 + expected;
        }
        assert!((metrics.cumulative_return[i] - (growth - 1.0)).abs() < 1e-12);

        peak = peak.max(closes[i]);
        assert!(metrics.drawdown[i] <= 0.0);
        assert!((metrics.drawdown[i] - (closes[i] / peak - 1.0)).abs() < 1e-12);
    }

    let min_drawdown = metrics.drawdown.iter().copied().fold(f64::INFINITY, f64::min);
    assert_eq!(metrics.summary.max_drawdown, min_drawdown);
    assert!((metrics.summary.total_return - (186.19 / 185.64 - 1.0)).abs() < 1e-12);
}
