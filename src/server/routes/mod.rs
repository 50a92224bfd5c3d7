mod categories;
mod questions;
mod quizzes;

pub use categories::category_router;
pub use questions::questions_router;
pub use quizzes::quizzes_router;

use std::fmt::Display;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use itertools::Itertools;
use serde::Serialize;

use crate::{db::Question, telemetry::API_ERRORS};

/// Every failure a client can observe. Handlers collapse their internal
/// errors into one of these with [`OrStatus::or_status`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiError {
    BadRequest,
    NotFound,
    MethodNotAllowed,
    Unprocessable,
    InternalServerError,
}

impl ApiError {
    pub fn status(self) -> StatusCode {
        match self {
            ApiError::BadRequest => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Unprocessable => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            ApiError::BadRequest => "bad request",
            ApiError::NotFound => "resource not found",
            ApiError::MethodNotAllowed => "method not allowed",
            ApiError::Unprocessable => "unprocessable",
            ApiError::InternalServerError => "internal server error",
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    error: u16,
    message: &'static str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        API_ERRORS
            .with_label_values(&[status.as_str()])
            .inc();
        let body = ErrorBody {
            success: false,
            error: status.as_u16(),
            message: self.message(),
        };
        (status, Json(body)).into_response()
    }
}

pub trait OrStatus<T> {
    /// Logs the underlying error and replaces it with `error`.
    fn or_status(self, error: ApiError) -> Result<T, ApiError>;
}

impl<T, E: Display> OrStatus<T> for Result<T, E> {
    fn or_status(self, error: ApiError) -> Result<T, ApiError> {
        self.map_err(|cause| {
            tracing::warn!(status = %error.status(), "{cause}");
            error
        })
    }
}

/// The `{"success": true, ...}` envelope around a response body.
#[derive(Serialize, Debug)]
pub struct Success<T> {
    success: bool,
    #[serde(flatten)]
    body: T,
}

pub type ApiResponse<T> = Result<Json<Success<T>>, ApiError>;

pub fn success<T>(body: T) -> ApiResponse<T> {
    Ok(Json(Success {
        success: true,
        body,
    }))
}

pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

/// Plain `OPTIONS` on a known path; CORS preflights are answered before this.
pub async fn options() -> StatusCode {
    StatusCode::OK
}

/// Categories of `questions` without duplicates, in order of first appearance.
fn distinct_categories(questions: &[Question]) -> Vec<i64> {
    questions.iter().map(|q| q.category).unique().collect()
}
