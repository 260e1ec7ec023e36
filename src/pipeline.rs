//! The dashboard pipeline: validate the inputs, fetch (or reuse) prices,
//! compute metrics.
//!
//! One call to [`Dashboard::run`] is one render. The only state kept between
//! calls is the price cache.

use crate::cache::{CacheStats, PriceCache};
use crate::metrics::{compute_metrics, MetricsError};
use crate::report::DashboardReport;
use crate::ticker::Ticker;
use crate::time_series::PriceProvider;
use crate::validation::{validate_range, RangeError};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use thiserror::Error;

/// Ticker shown before the user enters one.
pub const DEFAULT_TICKER: &str = "AAPL";

/// Default look-back window in days.
pub const DEFAULT_LOOKBACK_DAYS: i64 = 365;

/// The two user inputs: a ticker and a date range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardQuery {
    pub ticker: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DashboardQuery {
    pub fn new(ticker: impl Into<String>, start: NaiveDate, end: NaiveDate) -> Self {
        DashboardQuery {
            ticker: ticker.into(),
            start,
            end,
        }
    }

    /// The initial inputs: the default ticker over the past year.
    pub fn default_for(today: NaiveDate) -> Self {
        DashboardQuery {
            ticker: DEFAULT_TICKER.to_string(),
            start: today - Duration::days(DEFAULT_LOOKBACK_DAYS),
            end: today,
        }
    }
}

/// Reasons a render stops before producing a report.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DashboardError {
    #[error(transparent)]
    Range(#[from] RangeError),
    #[error("No data found. Try a different ticker.")]
    NoData { ticker: String },
}

/// Pipeline owner: holds the cached provider and runs renders.
pub struct Dashboard<P> {
    cache: PriceCache<P>,
}

impl<P: PriceProvider> Dashboard<P> {
    /// Creates a dashboard with the default one-hour price cache.
    pub fn new(provider: P) -> Self {
        Dashboard {
            cache: PriceCache::new(provider),
        }
    }

    pub async fn cache_stats(&self) -> CacheStats {
        self.cache.stats().await
    }

    /// Runs one render for `query` at time `now`.
    ///
    /// "Today" for range validation is the UTC date of `now`.
    ///
    /// # Errors
    /// * `DashboardError::Range` - the range is invalid; nothing is fetched.
    /// * `DashboardError::NoData` - the ticker is malformed or the provider
    ///   returned no prices for the range.
    pub async fn run(&self, query: &DashboardQuery, now: DateTime<Utc>) -> Result<DashboardReport, DashboardError> {
        let range = validate_range(query.start, query.end, now.date_naive()).map_err(|err| {
            tracing::info!(start = %query.start, end = %query.end, reason = err.reason(), "rejected date range");
            err
        })?;

        let no_data = || DashboardError::NoData {
            ticker: query.ticker.trim().to_uppercase(),
        };

        let ticker = Ticker::parse(&query.ticker).map_err(|err| {
            tracing::info!(ticker = %query.ticker, error = %err, "rejected ticker");
            no_data()
        })?;

        let series = self.cache.fetch_cached(&ticker, &range, now).await;
        let metrics = compute_metrics(&series).map_err(|MetricsError::NoData| {
            tracing::info!(%ticker, start = %range.start, end = %range.end, "no price data");
            no_data()
        })?;

        Ok(DashboardReport {
            ticker,
            range,
            series,
            metrics,
        })
    }
}
