use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

/// Top-level `error` value for every failure that happens after validation.
pub const CONVERSION_FAILED: &str = "Conversion failed";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Bad request: {0}")]
    BadRequest(anyhow::Error),

    /// Directory creation, upload streaming or file write failed.
    #[error("Storage error: {0:#}")]
    StorageError(anyhow::Error),

    /// The external converter failed, timed out or produced no output.
    #[error("Conversion failed: {0:#}")]
    ConversionFailed(anyhow::Error),

    #[error("Internal server error: {0}")]
    InternalError(#[from] anyhow::Error),

    #[error("Configuration error: {0}")]
    ConfigError(anyhow::Error),
}

impl AppError {
    /// Replaces the cause of storage and conversion failures with a generic
    /// message so nothing about the host leaks into the response body.
    pub fn sanitized(self) -> Self {
        match self {
            AppError::StorageError(_) => {
                AppError::StorageError(anyhow::anyhow!("Failed to store files"))
            }
            AppError::ConversionFailed(_) => {
                AppError::ConversionFailed(anyhow::anyhow!("The converter could not process this file"))
            }
            other => other,
        }
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::ConfigError(anyhow::Error::new(err))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::InternalError(anyhow::Error::new(err))
    }
}

/// Flattens validator errors into `{"field": ["message", ...]}`.
pub fn field_errors(errors: &validator::ValidationErrors) -> BTreeMap<String, Vec<String>> {
    errors
        .field_errors()
        .into_iter()
        .map(|(field, errs)| {
            let messages = errs
                .iter()
                .map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string())
                })
                .collect();
            (field.to_string(), messages)
        })
        .collect()
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorResponse {
            error: String,
            #[serde(skip_serializing_if = "Option::is_none")]
            detail: Option<String>,
        }

        let (status, error_message, detail) = match self {
            AppError::ValidationError(errors) => {
                tracing::debug!(errors = %errors, "Request failed validation");
                return (StatusCode::BAD_REQUEST, Json(field_errors(&errors))).into_response();
            }
            AppError::BadRequest(err) => (StatusCode::BAD_REQUEST, err.to_string(), None),
            AppError::StorageError(err) | AppError::ConversionFailed(err) => (
                StatusCode::BAD_REQUEST,
                CONVERSION_FAILED.to_string(),
                Some(format!("{:#}", err)),
            ),
            AppError::InternalError(err) => {
                tracing::error!("Internal error: {:#}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    None,
                )
            }
            AppError::ConfigError(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Configuration error".to_string(),
                Some(err.to_string()),
            ),
        };

        (
            status,
            Json(ErrorResponse {
                error: error_message,
                detail,
            }),
        )
            .into_response()
    }
}
