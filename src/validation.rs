use crate::time_series::DateRange;
use chrono::NaiveDate;
use thiserror::Error;

/// Reasons a requested date range is rejected.
///
/// Every variant carries the same user-facing message; the variant itself
/// says which bound was wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RangeError {
    #[error("Please enter a valid date range.")]
    StartAfterEnd,
    #[error("Please enter a valid date range.")]
    StartInFuture,
    #[error("Please enter a valid date range.")]
    EndInFuture,
}

impl RangeError {
    /// Short description of the failed check, for logs and API details.
    pub fn reason(&self) -> &'static str {
        match self {
            RangeError::StartAfterEnd => "start date is after end date",
            RangeError::StartInFuture => "start date is in the future",
            RangeError::EndInFuture => "end date is in the future",
        }
    }
}

/// Checks a user-supplied range against `today`.
///
/// # Errors
/// Fails when `start > end`, `start > today` or `end > today`. A single-day
/// range ending today is valid.
pub fn validate_range(start: NaiveDate, end: NaiveDate, today: NaiveDate) -> Result<DateRange, RangeError> {
    if start > end {
        return Err(RangeError::StartAfterEnd);
    }
    if start > today {
        return Err(RangeError::StartInFuture);
    }
    if end > today {
        return Err(RangeError::EndInFuture);
    }
    Ok(DateRange::new(start, end))
}
