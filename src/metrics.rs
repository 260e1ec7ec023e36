//! Metrics engine: daily, cumulative and drawdown series plus the summary
//! statistics shown on the dashboard cards.
//!
//! All ratios are plain fractions (`0.05` is 5%). Element `i` of every
//! derived series depends only on prices `0..=i`.

pub mod primitives;

use crate::time_series::PriceSeries;
use primitives::{arith_return, mean, running_max, sample_std_dev};
use serde::Serialize;
use thiserror::Error;

/// Scalar summary of a price series.
///
/// Undefined values are `NaN`; every field is undefined for series shorter
/// than two points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricsSummary {
    /// Cumulative return at the last point
    pub total_return: f64,
    /// Mean of the defined daily returns
    pub avg_daily_return: f64,
    /// Sample standard deviation of the defined daily returns
    pub volatility: f64,
    /// Deepest drawdown (most negative value)
    pub max_drawdown: f64,
}

impl MetricsSummary {
    fn undefined() -> Self {
        MetricsSummary {
            total_return: f64::NAN,
            avg_daily_return: f64::NAN,
            volatility: f64::NAN,
            max_drawdown: f64::NAN,
        }
    }
}

/// Derived series, index-aligned with the source prices, and their summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsResult {
    /// `close[i] / close[i-1] - 1`; absent at index 0
    pub daily_return: Vec<Option<f64>>,
    /// Compounded return since the first point; 0 at index 0
    pub cumulative_return: Vec<f64>,
    /// `close[i] / max(close[0..=i]) - 1`, never positive
    pub drawdown: Vec<f64>,
    pub summary: MetricsSummary,
}

impl MetricsResult {
    pub fn len(&self) -> usize {
        self.daily_return.len()
    }

    pub fn is_empty(&self) -> bool {
        self.daily_return.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MetricsError {
    #[error("no price data to compute metrics from")]
    NoData,
}

/// Computes return and risk metrics for a price series.
///
/// # Errors
/// Returns `MetricsError::NoData` for an empty series. Any non-empty series
/// yields a result, a single point giving undefined summary values.
pub fn compute_metrics(series: &PriceSeries) -> Result<MetricsResult, MetricsError> {
    if series.is_empty() {
        return Err(MetricsError::NoData);
    }

    let closes = series.closes();

    let daily_return: Vec<Option<f64>> = std::iter::once(None)
        .chain(closes.windows(2).map(|pair| arith_return(pair[1], pair[0])))
        .collect();

    let mut growth = 1.0;
    let cumulative_return: Vec<f64> = daily_return
        .iter()
        .map(|value| {
            growth *= 1.0 + value.unwrap_or(0.0);
            growth - 1.0
        })
        .collect();

    let drawdown: Vec<f64> = closes
        .iter()
        .zip(running_max(&closes))
        .map(|(close, peak)| close / peak - 1.0)
        .collect();

    let summary = if closes.len() < 2 {
        MetricsSummary::undefined()
    } else {
        MetricsSummary {
            total_return: cumulative_return.last().copied().unwrap_or(f64::NAN),
            avg_daily_return: mean(&daily_return),
            volatility: sample_std_dev(&daily_return),
            max_drawdown: drawdown.iter().copied().fold(f64::INFINITY, f64::min),
        }
    };

    Ok(MetricsResult {
        daily_return,
        cumulative_return,
        drawdown,
        summary,
    })
}
