//! Error types for the dashboard API

use crate::pipeline::DashboardError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    /// A query parameter could not be parsed
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
    /// The date range failed validation
    #[error("{message}")]
    InvalidDateRange { message: String, reason: String },
    /// No prices for the ticker and range
    #[error("{0}")]
    NoData(String),
    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, body) = match &self {
            ApiError::InvalidParameter(msg) => (
                StatusCode::BAD_REQUEST,
                "InvalidParameter",
                json!({ "error": "InvalidParameter", "message": msg }),
            ),
            ApiError::InvalidDateRange { message, reason } => (
                StatusCode::BAD_REQUEST,
                "InvalidDateRange",
                json!({ "error": "InvalidDateRange", "message": message, "reason": reason }),
            ),
            ApiError::NoData(msg) => (
                StatusCode::NOT_FOUND,
                "NoData",
                json!({ "error": "NoData", "message": msg }),
            ),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "InternalError",
                    json!({ "error": "InternalError", "message": msg }),
                )
            }
        };

        tracing::debug!(status = status.as_u16(), error_type, "request failed");
        (status, Json(body)).into_response()
    }
}

impl From<DashboardError> for ApiError {
    fn from(err: DashboardError) -> Self {
        match &err {
            DashboardError::Range(range) => ApiError::InvalidDateRange {
                message: err.to_string(),
                reason: range.reason().to_string(),
            },
            DashboardError::NoData { .. } => ApiError::NoData(err.to_string()),
        }
    }
}

impl From<csv::Error> for ApiError {
    fn from(err: csv::Error) -> Self {
        ApiError::Internal(format!("CSV export failed: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::RangeError;

    #[test]
    fn test_range_error_maps_to_bad_request() {
        let err = ApiError::from(DashboardError::Range(RangeError::StartAfterEnd));
        assert!(matches!(&err, ApiError::InvalidDateRange { reason, .. } if reason == "start date is after end date"));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_no_data_maps_to_not_found() {
        let err = ApiError::from(DashboardError::NoData {
            ticker: "ZZZZ".to_string(),
        });
        assert_eq!(err.to_string(), "No data found. Try a different ticker.");
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }
}
