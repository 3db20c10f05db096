use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::application::error::ErrorReport;
use crate::application::source::FetchError;
use crate::domain::error::DomainError;

#[derive(Debug, Serialize)]
pub struct ApiErrorBody {
    pub success: bool,
    pub error: String,
    pub code: &'static str,
}

pub mod codes {
    pub const BAD_REQUEST: &str = "bad_request";
    pub const NOT_FOUND: &str = "not_found";
    pub const UPSTREAM: &str = "upstream_error";
}

/// JSON error for the `/api` surface: `{success: false, error, code}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
    report: ErrorReport,
}

impl ApiError {
    /// A backend fetch failed; the public message names the operation and the
    /// outermost error.
    pub fn upstream(source: &'static str, operation: &str, err: &FetchError) -> Self {
        let status = StatusCode::INTERNAL_SERVER_ERROR;
        Self {
            status,
            code: codes::UPSTREAM,
            message: format!("{operation}: {err}"),
            report: ErrorReport::from_error(source, status, err),
        }
    }

    pub fn bad_request(source: &'static str, message: impl Into<String>) -> Self {
        let status = StatusCode::BAD_REQUEST;
        let message = message.into();
        Self {
            status,
            code: codes::BAD_REQUEST,
            report: ErrorReport::from_message(source, status, message.clone()),
            message,
        }
    }

    pub fn domain(source: &'static str, err: &DomainError) -> Self {
        let (status, code) = match err {
            DomainError::NotFound { .. } => (StatusCode::NOT_FOUND, codes::NOT_FOUND),
            DomainError::Validation { .. } => (StatusCode::BAD_REQUEST, codes::BAD_REQUEST),
        };
        Self {
            status,
            code,
            message: err.to_string(),
            report: ErrorReport::from_error(source, status, err),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiErrorBody {
            success: false,
            error: self.message,
            code: self.code,
        };
        let mut response = (self.status, Json(body)).into_response();
        self.report.attach(&mut response);
        response
    }
}
