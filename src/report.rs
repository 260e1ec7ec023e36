//! Render-ready output of one dashboard request.
//!
//! [`DashboardReport`] is what the pipeline produces; [`DashboardView`] is the
//! serialisable shape the presentation layer draws: chart points, four
//! metric cards and the colour-coded history table.

use crate::metrics::MetricsResult;
use crate::ticker::Ticker;
use crate::time_series::{DateRange, PriceSeries};
use chrono::NaiveDate;
use serde::Serialize;
use std::io::Write;
use std::sync::Arc;

/// Placeholder shown for undefined numbers.
pub const NOT_AVAILABLE: &str = "N/A";

/// Formats a ratio as a percentage with `decimals` places (`0.0123` -> `"1.23%"`).
pub fn format_percent(value: f64, decimals: usize) -> String {
    if value.is_nan() {
        return NOT_AVAILABLE.to_string();
    }
    format!("{:.*}%", decimals, value * 100.0)
}

/// Formats a price in dollars with two decimals.
pub fn format_currency(value: f64) -> String {
    format!("${:.2}", value)
}

fn defined(value: f64) -> Option<f64> {
    (!value.is_nan()).then_some(value)
}

/// Result of a successful pipeline run.
#[derive(Debug, Clone)]
pub struct DashboardReport {
    pub ticker: Ticker,
    pub range: DateRange,
    pub series: Arc<PriceSeries>,
    pub metrics: MetricsResult,
}

/// Display colour class of a daily return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReturnTone {
    /// Zero or positive return
    Positive,
    Negative,
    /// No return on the first day
    Unstyled,
}

impl ReturnTone {
    pub fn of(daily_return: Option<f64>) -> Self {
        match daily_return {
            Some(value) if value >= 0.0 => ReturnTone::Positive,
            Some(value) if value < 0.0 => ReturnTone::Negative,
            _ => ReturnTone::Unstyled,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub date: NaiveDate,
    pub close: f64,
    pub cumulative_return: f64,
    pub drawdown: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricCard {
    pub label: String,
    /// Raw ratio, `null` when undefined
    pub value: Option<f64>,
    pub display: String,
}

impl MetricCard {
    fn new(label: &str, value: f64, decimals: usize) -> Self {
        MetricCard {
            label: label.to_string(),
            value: defined(value),
            display: format_percent(value, decimals),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRow {
    pub date: NaiveDate,
    pub close: f64,
    pub close_display: String,
    pub daily_return: Option<f64>,
    pub daily_return_display: String,
    pub tone: ReturnTone,
}

/// Everything the dashboard page renders for one query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub ticker: Ticker,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub title: String,
    pub chart: Vec<ChartPoint>,
    pub metrics: Vec<MetricCard>,
    pub table: Vec<TableRow>,
}

impl DashboardReport {
    /// Builds the render-ready view.
    pub fn view(&self) -> DashboardView {
        let points = self.series.points();
        let metrics = &self.metrics;
        let summary = &metrics.summary;

        let chart = points
            .iter()
            .zip(&metrics.cumulative_return)
            .zip(&metrics.drawdown)
            .map(|((point, &cumulative_return), &drawdown)| ChartPoint {
                date: point.date,
                close: point.close,
                cumulative_return,
                drawdown,
            })
            .collect();

        let table = points
            .iter()
            .zip(&metrics.daily_return)
            .map(|(point, &daily_return)| TableRow {
                date: point.date,
                close: point.close,
                close_display: format_currency(point.close),
                daily_return,
                daily_return_display: format_percent(daily_return.unwrap_or(f64::NAN), 2),
                tone: ReturnTone::of(daily_return),
            })
            .collect();

        DashboardView {
            ticker: self.ticker.clone(),
            start: self.range.start,
            end: self.range.end,
            title: format!("{} Closing Price", self.ticker),
            chart,
            metrics: vec![
                MetricCard::new("Total Return", summary.total_return, 2),
                MetricCard::new("Avg Daily Return", summary.avg_daily_return, 3),
                MetricCard::new("Volatility", summary.volatility, 3),
                MetricCard::new("Max Drawdown", summary.max_drawdown, 2),
            ],
            table,
        }
    }
}

/// Writes the history table as CSV with raw numeric values.
///
/// The first day's return is left blank.
pub fn write_table_csv<W: Write>(view: &DashboardView, writer: W) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(["Date", "Close Price", "Daily Return"])?;

    for row in &view.table {
        csv_writer.write_record([
            row.date.format("%Y-%m-%d").to_string(),
            row.close.to_string(),
            row.daily_return.map(|value| value.to_string()).unwrap_or_default(),
        ])?;
    }

    csv_writer.flush()?;
    Ok(())
}
