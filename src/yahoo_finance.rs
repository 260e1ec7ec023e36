use crate::ticker::Ticker;
use crate::time_series::{DateRange, PricePoint, PriceProvider, PriceSeries};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

/// Default Yahoo Finance API host.
pub const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";

const USER_AGENT: &str = concat!("stock-dashboard/", env!("CARGO_PKG_VERSION"));

/// Configuration for the Yahoo Finance client
#[derive(Debug, Clone, PartialEq)]
pub struct DownloaderConfig {
    /// Maximum number of retry attempts after the first request (default: 3)
    pub max_retries: u32,
    /// Rate limit between attempts: requests per second (default: 1.0)
    pub requests_per_second: f64,
    /// Request timeout in seconds (default: 30)
    pub timeout_seconds: u64,
    /// API host, overridable for tests and proxies
    pub base_url: String,
}

impl Default for DownloaderConfig {
    fn default() -> Self {
        DownloaderConfig {
            max_retries: 3,
            requests_per_second: 1.0,
            timeout_seconds: 30,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl DownloaderConfig {
    /// Pause between two attempts, derived from the request rate.
    pub fn retry_delay(&self) -> Duration {
        if self.requests_per_second > 0.0 && self.requests_per_second.is_finite() {
            Duration::from_secs_f64(1.0 / self.requests_per_second)
        } else {
            Duration::ZERO
        }
    }
}

/// Yahoo Finance daily price client.
///
/// Downloads daily close prices from the chart API and turns them into a
/// [`PriceSeries`]. Tickers the API does not know come back as an empty
/// series; only transport and unexpected HTTP failures are errors.
#[derive(Debug, Clone)]
pub struct YahooFinanceClient {
    client: Client,
    config: DownloaderConfig,
}

impl YahooFinanceClient {
    /// Creates a new client with default configuration.
    ///
    /// # Returns
    /// Returns `Ok(YahooFinanceClient)` if successful, or an error if HTTP client creation fails.
    pub fn new() -> Result<Self, DownloadError> {
        Self::with_config(DownloaderConfig::default())
    }

    /// Creates a new client with custom configuration.
    ///
    /// # Arguments
    /// * `config` - Configuration for the client (rate limits, retries, etc.)
    pub fn with_config(config: DownloaderConfig) -> Result<Self, DownloadError> {
        let timeout = Duration::from_secs(config.timeout_seconds);
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| DownloadError::ClientCreation(e.to_string()))?;

        Ok(YahooFinanceClient { client, config })
    }

    /// Builds the chart URL for a symbol and inclusive date range.
    ///
    /// `period1` is midnight UTC of the start date and `period2` the last
    /// second of the end date, so both ends are included.
    pub fn chart_url(&self, symbol: &str, start_date: NaiveDate, end_date: NaiveDate) -> Result<String, DownloadError> {
        let start_timestamp = start_date
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| DownloadError::InvalidDate("Invalid start date".to_string()))?
            .and_utc()
            .timestamp();

        let end_timestamp = end_date
            .and_hms_opt(23, 59, 59)
            .ok_or_else(|| DownloadError::InvalidDate("Invalid end date".to_string()))?
            .and_utc()
            .timestamp();

        Ok(format!(
            "{}/v8/finance/chart/{}?period1={}&period2={}&interval=1d&events=history",
            self.config.base_url.trim_end_matches('/'),
            symbol,
            start_timestamp,
            end_timestamp
        ))
    }

    /// Fetches daily closes for a symbol, retrying transient failures.
    ///
    /// # Errors
    /// Returns `DownloadError` when every attempt failed, or immediately on a
    /// non-retryable HTTP status.
    pub async fn fetch_daily_closes(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<PriceSeries, DownloadError> {
        let url = self.chart_url(symbol, start_date, end_date)?;
        let mut attempt = 0;

        loop {
            match self.fetch_once(&url).await {
                Ok(series) => {
                    tracing::info!(symbol, points = series.len(), "downloaded daily closes");
                    return Ok(series);
                }
                Err(err) if err.is_retryable() && attempt < self.config.max_retries => {
                    attempt += 1;
                    tracing::warn!(symbol, attempt, error = %err, "retrying price download");
                    tokio::time::sleep(self.config.retry_delay()).await;
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn fetch_once(&self, url: &str) -> Result<PriceSeries, DownloadError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DownloadError::Network(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
            return Err(DownloadError::Unavailable(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| DownloadError::Parse(e.to_string()))?;

        // Unknown symbols are reported as 404 with a chart.error payload.
        if !status.is_success() && status != StatusCode::NOT_FOUND {
            return Err(DownloadError::Api(format!(
                "HTTP {}: {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown error")
            )));
        }

        parse_chart_response(&body)
    }

    /// Returns a reference to the configuration.
    pub fn config(&self) -> &DownloaderConfig {
        &self.config
    }
}

#[async_trait]
impl PriceProvider for YahooFinanceClient {
    async fn fetch(&self, ticker: &Ticker, range: &DateRange) -> Result<PriceSeries, DownloadError> {
        self.fetch_daily_closes(ticker.as_str(), range.start, range.end)
            .await
    }
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Default, Deserialize)]
struct ChartMeta {
    #[serde(default)]
    gmtoffset: i64,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<Quote>,
}

#[derive(Debug, Deserialize)]
struct Quote {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

/// Parses a chart API body into a price series.
///
/// Bar timestamps are shifted by the exchange's GMT offset before taking the
/// calendar date. Bars without a close are skipped.
pub fn parse_chart_response(body: &str) -> Result<PriceSeries, DownloadError> {
    let envelope: ChartEnvelope =
        serde_json::from_str(body).map_err(|e| DownloadError::Parse(e.to_string()))?;

    if let Some(error) = envelope.chart.error {
        tracing::debug!(
            code = %error.code,
            description = error.description.as_deref().unwrap_or(""),
            "chart API reported no data"
        );
        return Ok(PriceSeries::empty());
    }

    let Some(result) = envelope.chart.result.and_then(|results| results.into_iter().next()) else {
        return Ok(PriceSeries::empty());
    };

    let closes = result
        .indicators
        .quote
        .into_iter()
        .next()
        .map(|quote| quote.close)
        .unwrap_or_default();

    let mut points = Vec::with_capacity(result.timestamp.len());
    for (timestamp, close) in result.timestamp.iter().zip(closes) {
        let Some(close) = close else { continue };
        let local = timestamp
            .checked_add(result.meta.gmtoffset)
            .and_then(|shifted| DateTime::from_timestamp(shifted, 0))
            .ok_or_else(|| DownloadError::Parse(format!("timestamp out of range: {}", timestamp)))?;
        points.push(PricePoint::new(local.date_naive(), close));
    }

    Ok(PriceSeries::from_unsorted(points))
}

/// Errors that can occur while downloading prices.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DownloadError {
    /// HTTP client creation failed
    #[error("Client creation error: {0}")]
    ClientCreation(String),
    /// Network error occurred
    #[error("Network error: {0}")]
    Network(String),
    /// The API is rate limiting or failing (HTTP 429/5xx)
    #[error("Service unavailable: HTTP {0}")]
    Unavailable(u16),
    /// API returned an error response
    #[error("API error: {0}")]
    Api(String),
    /// Failed to parse response data
    #[error("Parse error: {0}")]
    Parse(String),
    /// Invalid date provided
    #[error("Invalid date: {0}")]
    InvalidDate(String),
}

impl DownloadError {
    /// Whether another attempt might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, DownloadError::Network(_) | DownloadError::Unavailable(_))
    }
}
