#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use stock_dashboard::{
    DateRange, DownloadError, InMemoryPriceProvider, PricePoint, PriceProvider, PriceSeries, Ticker,
};

/// Consecutive daily closes starting at `start`.
pub fn daily_series(start: NaiveDate, closes: &[f64]) -> PriceSeries {
    PriceSeries::new(
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| PricePoint::new(start + Duration::days(i as i64), close))
            .collect(),
    )
    .unwrap()
}

/// In-memory provider wrapper that counts `fetch` calls.
#[derive(Clone)]
pub struct CountingProvider {
    inner: Arc<InMemoryPriceProvider>,
    calls: Arc<AtomicUsize>,
}

impl CountingProvider {
    pub fn new(inner: InMemoryPriceProvider) -> Self {
        CountingProvider {
            inner: Arc::new(inner),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Shared handle to the call counter, usable after the provider is boxed.
    pub fn counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PriceProvider for CountingProvider {
    async fn fetch(&self, ticker: &Ticker, range: &DateRange) -> Result<PriceSeries, DownloadError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.fetch(ticker, range).await
    }
}

/// Provider holding AAPL closes for the first trading days of 2024.
pub fn sample_provider() -> InMemoryPriceProvider {
    let mut provider = InMemoryPriceProvider::new();
    provider.add_series(
        Ticker::parse("AAPL").unwrap(),
        daily_series(
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            &[185.64, 184.25, 181.91, 181.18, 185.56, 185.14, 186.19],
        ),
    );
    provider.add_series(
        Ticker::parse("FLAT").unwrap(),
        daily_series(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(), &[10.0]),
    );
    provider
}
