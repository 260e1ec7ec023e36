use crate::ticker::Ticker;
use crate::yahoo_finance::DownloadError;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// A single daily observation: trading date and close price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Trading date
    pub date: NaiveDate,
    /// Close price on that date
    pub close: f64,
}

impl PricePoint {
    /// Creates a new PricePoint.
    pub fn new(date: NaiveDate, close: f64) -> Self {
        PricePoint { date, close }
    }
}

/// Date-ordered close prices for one ticker.
///
/// Dates are strictly increasing and every close is a finite positive
/// number. Days without trades are simply absent. An empty series is the
/// "no data" marker returned by providers.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Builds a series from points that must already be ordered and valid.
    ///
    /// # Errors
    /// Returns `SeriesError` on a non-increasing date or a close that is not
    /// a finite positive number.
    pub fn new(points: Vec<PricePoint>) -> Result<Self, SeriesError> {
        for (idx, point) in points.iter().enumerate() {
            if !(point.close.is_finite() && point.close > 0.0) {
                return Err(SeriesError::InvalidClose {
                    date: point.date,
                    close: point.close,
                });
            }
            if idx > 0 && points[idx - 1].date >= point.date {
                return Err(SeriesError::OutOfOrder {
                    previous: points[idx - 1].date,
                    current: point.date,
                });
            }
        }

        Ok(PriceSeries { points })
    }

    /// Builds a series from raw provider rows.
    ///
    /// Rows are sorted by date, invalid closes are dropped and, for duplicate
    /// dates, the last row wins.
    pub fn from_unsorted(mut points: Vec<PricePoint>) -> Self {
        points.retain(|point| point.close.is_finite() && point.close > 0.0);
        // stable sort keeps arrival order within a date
        points.sort_by_key(|point| point.date);

        let mut deduped: Vec<PricePoint> = Vec::with_capacity(points.len());
        for point in points {
            match deduped.last_mut() {
                Some(last) if last.date == point.date => *last = point,
                _ => deduped.push(point),
            }
        }

        PriceSeries { points: deduped }
    }

    /// Creates an empty series.
    pub fn empty() -> Self {
        PriceSeries::default()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn first(&self) -> Option<&PricePoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    /// Close prices in date order.
    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|point| point.close).collect()
    }

    /// Trading dates in order.
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|point| point.date).collect()
    }

    /// Returns the sub-series whose dates fall inside `range`.
    pub fn within(&self, range: &DateRange) -> PriceSeries {
        PriceSeries {
            points: self
                .points
                .iter()
                .filter(|point| range.contains(point.date))
                .copied()
                .collect(),
        }
    }
}

/// Errors raised when a price series violates its ordering or value rules.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SeriesError {
    #[error("dates must be strictly increasing: {current} follows {previous}")]
    OutOfOrder {
        previous: NaiveDate,
        current: NaiveDate,
    },
    #[error("close on {date} must be a positive number, got {close}")]
    InvalidClose { date: NaiveDate, close: f64 },
}

/// Date range for querying prices, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    /// Start date (inclusive)
    pub start: NaiveDate,
    /// End date (inclusive)
    pub end: NaiveDate,
}

impl DateRange {
    /// Creates a new DateRange.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        DateRange { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

/// Source of historical close prices.
///
/// Implementations decide how to reach their data (HTTP API, fixtures) and
/// apply their own retry policy. A ticker with no prices in the range is an
/// empty series, not an error; errors are reserved for failed lookups.
#[async_trait]
pub trait PriceProvider: Send + Sync {
    /// Retrieves daily closes for `ticker` within `range` (inclusive).
    ///
    /// # Errors
    /// Returns `DownloadError` when the source could not be queried.
    async fn fetch(&self, ticker: &Ticker, range: &DateRange) -> Result<PriceSeries, DownloadError>;
}

#[async_trait]
impl<P: PriceProvider + ?Sized> PriceProvider for Box<P> {
    async fn fetch(&self, ticker: &Ticker, range: &DateRange) -> Result<PriceSeries, DownloadError> {
        (**self).fetch(ticker, range).await
    }
}

/// In-memory price provider for tests and offline demos.
///
/// Stores one series per ticker and serves the slice inside the requested
/// range. Unknown tickers yield an empty series.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPriceProvider {
    data: HashMap<Ticker, PriceSeries>,
}

impl InMemoryPriceProvider {
    /// Creates a new empty in-memory provider.
    pub fn new() -> Self {
        InMemoryPriceProvider {
            data: HashMap::new(),
        }
    }

    /// Adds (or replaces) the series for a ticker.
    pub fn add_series(&mut self, ticker: Ticker, series: PriceSeries) {
        self.data.insert(ticker, series);
    }
}

#[async_trait]
impl PriceProvider for InMemoryPriceProvider {
    async fn fetch(&self, ticker: &Ticker, range: &DateRange) -> Result<PriceSeries, DownloadError> {
        Ok(self
            .data
            .get(ticker)
            .map(|series| series.within(range))
            .unwrap_or_default())
    }
}
