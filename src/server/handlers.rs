//! HTTP request handlers for API endpoints

use axum::{
    extract::{Query, State},
    http::header,
    response::{Html, IntoResponse, Response},
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use super::error::ApiError;
use super::state::AppState;
use crate::cache::CacheStats;
use crate::pipeline::DashboardQuery;
use crate::report::{write_table_csv, DashboardView};

const INDEX_HTML: &str = include_str!("index.html");

/// Health check endpoint
///
/// Returns a simple status response to verify the server is running
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok"
    }))
}

/// GET / - the dashboard page
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// Query parameters shared by the dashboard endpoints.
///
/// Missing values fall back to the default ticker and the past year.
#[derive(Debug, Default, Deserialize)]
pub struct DashboardParams {
    pub ticker: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
}

fn parse_date(value: &str, name: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|e| ApiError::InvalidParameter(format!("Invalid {} date: {}", name, e)))
}

impl DashboardParams {
    /// Resolves the parameters into a pipeline query, filling in defaults.
    pub fn into_query(self, today: NaiveDate) -> Result<DashboardQuery, ApiError> {
        let defaults = DashboardQuery::default_for(today);

        let start = match self.start.as_deref() {
            Some(value) => parse_date(value, "start")?,
            None => defaults.start,
        };
        let end = match self.end.as_deref() {
            Some(value) => parse_date(value, "end")?,
            None => defaults.end,
        };

        Ok(DashboardQuery::new(
            self.ticker.unwrap_or(defaults.ticker),
            start,
            end,
        ))
    }
}

async fn render(state: &AppState, params: DashboardParams) -> Result<DashboardView, ApiError> {
    let now = state.clock.now();
    let query = params.into_query(now.date_naive())?;
    let report = state.dashboard.run(&query, now).await?;
    Ok(report.view())
}

/// GET /api/dashboard - chart, metric cards and table for one ticker
pub async fn get_dashboard(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DashboardParams>,
) -> Result<Json<DashboardView>, ApiError> {
    Ok(Json(render(&state, params).await?))
}

/// GET /api/dashboard/table.csv - the history table as a CSV download
pub async fn get_dashboard_csv(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DashboardParams>,
) -> Result<Response, ApiError> {
    let view = render(&state, params).await?;

    let mut body = Vec::new();
    write_table_csv(&view, &mut body)?;

    let disposition = format!("attachment; filename=\"{}_history.csv\"", view.ticker);
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}

/// GET /api/cache - price cache counters
pub async fn get_cache_stats(State(state): State<Arc<AppState>>) -> Json<CacheStats> {
    Json(state.dashboard.cache_stats().await)
}
