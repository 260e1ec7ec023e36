use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use serde_json::json;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use stock_dashboard::{DateRange, DownloadError, DownloaderConfig, PriceProvider, Ticker, YahooFinanceClient};

#[derive(Default)]
struct StubState {
    calls: AtomicUsize,
    failures_before_success: usize,
}

async fn chart(
    State(state): State<Arc<StubState>>,
    Path(symbol): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    let call = state.calls.fetch_add(1, Ordering::SeqCst);
    if call < state.failures_before_success {
        return (StatusCode::SERVICE_UNAVAILABLE, Json(json!({}))).into_response();
    }

    match symbol.as_str() {
        "AAPL" => {
            assert_eq!(params.get("interval").map(String::as_str), Some("1d"));
            Json(json!({
                "chart": {
                    "result": [{
                        "meta": {"symbol": "AAPL", "gmtoffset": -18000},
                        "timestamp": [1704205800, 1704292200, 1704378600],
                        "indicators": {"quote": [{"close": [185.64, 184.25, 181.91]}]}
                    }],
                    "error": null
                }
            }))
            .into_response()
        }
        "AUTH" => (StatusCode::UNAUTHORIZED, Json(json!({}))).into_response(),
        _ => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "chart": {
                    "result": null,
                    "error": {"code": "Not Found", "description": "No data found, symbol may be delisted"}
                }
            })),
        )
            .into_response(),
    }
}

async fn spawn_stub(failures_before_success: usize) -> (String, Arc<StubState>) {
    let state = Arc::new(StubState {
        calls: AtomicUsize::new(0),
        failures_before_success,
    });
    let app = Router::new()
        .route("/v8/finance/chart/:symbol", get(chart))
        .with_state(Arc::clone(&state));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{}", addr), state)
}

fn client(base_url: String, max_retries: u32) -> YahooFinanceClient {
    YahooFinanceClient::with_config(DownloaderConfig {
        max_retries,
        requests_per_second: 100.0,
        timeout_seconds: 5,
        base_url,
    })
    .unwrap()
}

fn january() -> DateRange {
    DateRange::new(
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
    )
}

#[tokio::test]
async fn fetch_parses_daily_closes() {
    let (base, _) = spawn_stub(0).await;
    let series = client(base, 0)
        .fetch(&Ticker::parse("aapl").unwrap(), &january())
        .await
        .unwrap();

    assert_eq!(series.closes(), vec![185.64, 184.25, 181.91]);
    assert_eq!(series.first().unwrap().date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
}

#[tokio::test]
async fn unknown_symbol_is_empty_series() {
    let (base, _) = spawn_stub(0).await;
    let series = client(base, 0)
        .fetch(&Ticker::parse("ZZZZ").unwrap(), &january())
        .await
        .unwrap();

    assert!(series.is_empty());
}

#[tokio::test]
async fn transient_failures_are_retried() {
    let (base, stub) = spawn_stub(2).await;
    let series = client(base, 3)
        .fetch(&Ticker::parse("AAPL").unwrap(), &january())
        .await
        .unwrap();

    assert_eq!(series.len(), 3);
    assert_eq!(stub.calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn retries_are_bounded() {
    let (base, stub) = spawn_stub(10).await;
    let result = client(base, 1)
        .fetch(&Ticker::parse("AAPL").unwrap(), &january())
        .await;

    assert_eq!(result.unwrap_err(), DownloadError::Unavailable(503));
    assert_eq!(stub.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn client_errors_are_not_retried() {
    let (base, stub) = spawn_stub(0).await;
    let result = client(base, 3)
        .fetch(&Ticker::parse("AUTH").unwrap(), &january())
        .await;

    assert!(matches!(result, Err(DownloadError::Api(_))));
    assert_eq!(stub.calls.load(Ordering::SeqCst), 1);
}
