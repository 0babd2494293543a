// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::blockchain::ChainError;
use crate::storage::{MissingField, PersistenceError};

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, message)
    }

    /// Log `source` in full and answer 500 with a generic message.
    pub fn internal_from(message: &'static str, source: &dyn std::error::Error) -> Self {
        tracing::error!(error = %source, "{message}");
        Self::internal(message)
    }
}

impl From<MissingField> for ApiError {
    fn from(_: MissingField) -> Self {
        Self::bad_request("Missing required fields")
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<ChainError> for ApiError {
    fn from(error: ChainError) -> Self {
        match error {
            ChainError::InvalidAddress(_) => Self::bad_request(error.to_string()),
            other => {
                tracing::warn!(error = %other, "Chain mirror call failed");
                Self::service_unavailable("Chain messaging unavailable")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            error: self.message,
        });
        (self.status, body).into_response()
    }
}

/// Handlers pick the public message; the underlying error is only logged.
pub trait OrInternal<T> {
    fn or_internal(self, message: &'static str) -> Result<T, ApiError>;
}

impl<T> OrInternal<T> for Result<T, PersistenceError> {
    fn or_internal(self, message: &'static str) -> Result<T, ApiError> {
        self.map_err(|e| ApiError::internal_from(message, &e))
    }
}
