//! Mapping failures to HTTP statuses for route handlers

use axum::http::StatusCode;
use tracing::error;

use crate::domain::twitter::QueryError;

/// Extension trait for logging errors and converting to StatusCode
pub trait LogErr<T> {
    /// Log error with context and return INTERNAL_SERVER_ERROR
    fn log_500(self, context: &str) -> Result<T, StatusCode>;

    fn log_status(self, context: &str, status: StatusCode) -> Result<T, StatusCode>;
}

impl<T, E: std::fmt::Display> LogErr<T> for Result<T, E> {
    fn log_500(self, context: &str) -> Result<T, StatusCode> {
        self.log_status(context, StatusCode::INTERNAL_SERVER_ERROR)
    }

    fn log_status(self, context: &str, status: StatusCode) -> Result<T, StatusCode> {
        self.map_err(|e| {
            error!("{}: {}", context, e);
            status
        })
    }
}

/// Status for a failed query run.
///
/// Twitter-side failures are a bad gateway; missing credentials mean the
/// service can't run anything until it is configured.
pub fn run_error_status(err: &QueryError) -> StatusCode {
    match err {
        QueryError::Retrieve(_) | QueryError::Api(_) => StatusCode::BAD_GATEWAY,
        QueryError::MissingCredentials => StatusCode::SERVICE_UNAVAILABLE,
        QueryError::InvalidQueryType(_) => StatusCode::UNPROCESSABLE_ENTITY,
        QueryError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Log a failed run and answer with [`run_error_status`]
pub trait LogRunErr<T> {
    fn log_run_err(self, context: &str) -> Result<T, StatusCode>;
}

impl<T> LogRunErr<T> for Result<T, QueryError> {
    fn log_run_err(self, context: &str) -> Result<T, StatusCode> {
        self.map_err(|e| {
            let status = run_error_status(&e);
            error!(status = status.as_u16(), "{}: {}", context, e);
            status
        })
    }
}
