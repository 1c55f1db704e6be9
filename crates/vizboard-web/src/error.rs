use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use vizboard_charts::ChartError;
use vizboard_common::DatasetError;

pub type Result<T> = std::result::Result<T, WebError>;

#[derive(Debug, Error)]
pub enum WebError {
    #[error("Login required")]
    Unauthorized,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Upload error: {0}")]
    Multipart(#[from] MultipartError),

    #[error("Dataset error: {0}")]
    Dataset(#[from] DatasetError),

    #[error(transparent)]
    Chart(#[from] ChartError),

    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl WebError {
    pub fn status(&self) -> StatusCode {
        match self {
            WebError::Unauthorized => StatusCode::UNAUTHORIZED,
            WebError::BadRequest(_) => StatusCode::BAD_REQUEST,
            WebError::Multipart(e) => e.status(),
            WebError::Dataset(_) => StatusCode::UNPROCESSABLE_ENTITY,
            WebError::Chart(ChartError::UnknownColumn(_)) => StatusCode::NOT_FOUND,
            WebError::Chart(ChartError::NoValues(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            WebError::Chart(ChartError::UnknownKind(_)) => StatusCode::BAD_REQUEST,
            WebError::Chart(ChartError::Render(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            WebError::Template(_) => StatusCode::INTERNAL_SERVER_ERROR,
            WebError::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "Request failed");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
