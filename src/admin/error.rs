use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::store::{FieldError, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum AdminError {
    #[error("Endpoint not found")]
    NotFound,

    #[error("Invalid endpoint definition")]
    Invalid(Vec<FieldError>),

    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,
}

impl IntoResponse for AdminError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            AdminError::NotFound => (
                StatusCode::NOT_FOUND,
                json!({ "error": "Endpoint not found" }),
            ),
            AdminError::Invalid(errors) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "Invalid endpoint definition", "details": errors }),
            ),
            AdminError::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            AdminError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                json!({ "error": "Unauthorized" }),
            ),
        };

        (status, Json(body)).into_response()
    }
}

impl From<StoreError> for AdminError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(_) => AdminError::NotFound,
        }
    }
}
