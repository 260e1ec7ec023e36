pub mod ticker;
pub mod time_series;
pub mod yahoo_finance;
pub mod metrics;
pub mod cache;
pub mod validation;
pub mod report;
pub mod pipeline;
pub mod server;

pub use ticker::{Ticker, TickerError};
pub use time_series::{DateRange, InMemoryPriceProvider, PricePoint, PriceProvider, PriceSeries, SeriesError};
pub use yahoo_finance::{DownloadError, DownloaderConfig, YahooFinanceClient};
pub use metrics::{compute_metrics, MetricsError, MetricsResult, MetricsSummary};
pub use cache::{CacheKey, CacheStats, Clock, ManualClock, PriceCache, SystemClock, TtlCache, DEFAULT_TTL_SECONDS};
pub use validation::{validate_range, RangeError};
pub use report::{DashboardReport, DashboardView, MetricCard, ReturnTone, TableRow};
pub use pipeline::{Dashboard, DashboardError, DashboardQuery};
pub use server::{run_server, ApiError, AppState, ServerConfig};
