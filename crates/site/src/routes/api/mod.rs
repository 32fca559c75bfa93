//! JSON API.
//!
//! Every error body has the shape `{"error": "<message>"}` (see
//! [`AppError`](crate::error::AppError)); the signed-out guard answers
//! `/api/` requests with a 401 rather than a redirect.

pub mod admin;
pub mod auth;
pub mod customers;

use axum::{Json, extract::rejection::JsonRejection};
use serde::Serialize;

use crate::error::AppError;

/// Unknown `/api/` paths answer in JSON like the rest of the API.
pub async fn not_found() -> AppError {
    AppError::NotFound("Not found".to_string())
}

/// `{"message": "..."}` success body.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            message: message.into(),
        })
    }
}

/// Unwrap a JSON body, reporting malformed input in the standard error shape.
pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload.map(|Json(body)| body).map_err(|rejection| {
        tracing::debug!(error = %rejection, "Rejected JSON body");
        AppError::BadRequest("Invalid JSON body".to_string())
    })
}

/// `GET /api/ping`
pub async fn ping() -> Json<MessageResponse> {
    MessageResponse::new("pong")
}
