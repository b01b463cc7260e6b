use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::{
    models::ApiMessage,
    validation::{Issue, ValidationIssues},
};

pub const NOT_FOUND_MESSAGE: &str = "Movie Not Found";
pub const ORIGIN_REJECTED_MESSAGE: &str = "Not allowed by CORS";

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationIssues),
    #[error("movie not found")]
    NotFound,
    #[error("origin not allowed: {0}")]
    OriginRejected(String),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: Vec<Issue>,
}

impl AppError {
    pub fn malformed_body(message: impl Into<String>) -> Self {
        Self::Validation(ValidationIssues::new(vec![Issue::malformed_body(message)]))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::OriginRejected(_) => StatusCode::FORBIDDEN,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            Self::Validation(issues) => {
                debug!(issues = issues.len(), "rejected movie payload");
                let body = ErrorBody {
                    error: issues.into_issues(),
                };
                (status, Json(body)).into_response()
            }
            Self::NotFound => (status, Json(ApiMessage::new(NOT_FOUND_MESSAGE))).into_response(),
            Self::OriginRejected(_) => {
                (status, Json(ApiMessage::new(ORIGIN_REJECTED_MESSAGE))).into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_the_error_kind() {
        assert_eq!(
            AppError::malformed_body("bad json").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AppError::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::OriginRejected("http://evil.test".into()).status(),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn not_found_response_uses_the_fixed_message() {
        let response = AppError::NotFound.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
