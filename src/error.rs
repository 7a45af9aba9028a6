//! HTTP-facing error type rendering `{"error": "..."}` payloads.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;
use thiserror::Error;

use crate::chart::ChartError;
use crate::columns::ColumnError;
use crate::favorites::FavoritesError;
use crate::period::PeriodError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Period(#[from] PeriodError),
    #[error(transparent)]
    Chart(#[from] ChartError),
    #[error(transparent)]
    Column(#[from] ColumnError),
    #[error(transparent)]
    Favorites(#[from] FavoritesError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Period(_) | Self::Column(_) => StatusCode::BAD_REQUEST,
            Self::Chart(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Favorites(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}
