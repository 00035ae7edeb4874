//! Typed errors and HTTP mapping.

use crate::response::{error_envelope, Message};
use crate::service::FieldErrors;
use crate::store::StoreError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing setting: {0}")]
    Missing(&'static str),
    #[error("invalid value for {key}: '{value}'")]
    Invalid { key: &'static str, value: String },
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("validation failed on {} field(s)", .0.len())]
    Validation(FieldErrors),
    #[error("{0}")]
    NotFound(String),
    /// Store failure during an operation. `context` is the client-facing message,
    /// `detail` the underlying diagnostic when there is one.
    #[error("{context}")]
    Persistence {
        context: String,
        detail: Option<String>,
    },
    #[error("{0}")]
    BadRequest(String),
}

impl AppError {
    pub fn persistence(context: impl Into<String>, source: &StoreError) -> Self {
        AppError::Persistence {
            context: context.into(),
            detail: Some(source.to_string()),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Persistence { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = ?self, "request failed");
        }
        let (message, detail) = match self {
            AppError::Validation(fields) => (Message::Fields(fields), None),
            AppError::Persistence { context, detail } => (Message::Text(context), detail),
            other => (Message::Text(other.to_string()), None),
        };
        (status, error_envelope(message, detail)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_variant_maps_to_its_status() {
        let fault = StoreError::Unavailable("down".into());
        let cases = [
            (AppError::Validation(FieldErrors::single("name", "x")), StatusCode::BAD_REQUEST),
            (AppError::BadRequest("bad".into()), StatusCode::BAD_REQUEST),
            (AppError::NotFound("gone".into()), StatusCode::NOT_FOUND),
            (AppError::persistence("failed", &fault), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(err.status(), status, "{err}");
            assert_eq!(err.into_response().status(), status);
        }
    }
}
