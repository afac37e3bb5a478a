//! Mapping of dashboard errors onto HTTP responses

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use f1dash_core::DashboardError;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Dashboard(#[from] DashboardError),

    #[error("session load task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Dashboard(DashboardError::InvalidSelection(_)) => StatusCode::BAD_REQUEST,
            ApiError::Dashboard(DashboardError::DataUnavailable(_))
            | ApiError::Dashboard(DashboardError::NoLapData { .. }) => StatusCode::NOT_FOUND,
            ApiError::Dashboard(_) | ApiError::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        warn!("Request failed ({}): {}", status, self);
        (status, self.to_string()).into_response()
    }
}
