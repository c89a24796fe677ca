use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::compile::CompileError;
use crate::llm_client::LlmError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Upstream error (status {status:?}): {message}")]
    Upstream { status: Option<u16>, message: String },

    #[error("Model returned non-JSON output")]
    MalformedOutput { raw: String },

    #[error("Model output did not match the expected schema")]
    SchemaViolation { details: Value, raw: Value },

    #[error("Compile error: {0}")]
    Compile(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<LlmError> for AppError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::MissingApiKey => AppError::Configuration(
                "Missing OPENAI_API_KEY. Add it to the environment or .env and restart the server."
                    .to_string(),
            ),
            LlmError::Api { status, message } => AppError::Upstream {
                status: Some(status),
                message,
            },
            LlmError::EmptyContent => AppError::MalformedOutput { raw: String::new() },
            LlmError::Refusal(raw) => AppError::MalformedOutput { raw },
            other => AppError::Upstream {
                status: None,
                message: other.to_string(),
            },
        }
    }
}

impl From<CompileError> for AppError {
    fn from(err: CompileError) -> Self {
        AppError::Compile(err.diagnostics())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, details, raw) = match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg, None, None),
            AppError::Configuration(msg) => {
                tracing::error!("Configuration error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "CONFIGURATION_ERROR",
                    msg,
                    None,
                    None,
                )
            }
            AppError::Upstream { status, message } => {
                tracing::error!("Upstream error (status {status:?}): {message}");
                let status = status
                    .and_then(|s| StatusCode::from_u16(s).ok())
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                (
                    status,
                    "UPSTREAM_ERROR",
                    "Tailoring failed".to_string(),
                    Some(Value::String(message)),
                    None,
                )
            }
            AppError::MalformedOutput { raw } => {
                tracing::warn!("Model returned non-JSON output ({} bytes)", raw.len());
                (
                    StatusCode::BAD_GATEWAY,
                    "MALFORMED_MODEL_OUTPUT",
                    "Model returned non-JSON output. Try again.".to_string(),
                    None,
                    Some(Value::String(raw)),
                )
            }
            AppError::SchemaViolation { details, raw } => {
                tracing::warn!("Model output failed schema validation: {details}");
                (
                    StatusCode::BAD_GATEWAY,
                    "SCHEMA_MISMATCH",
                    "JSON did not match expected schema.".to_string(),
                    Some(details),
                    Some(raw),
                )
            }
            AppError::Compile(details) => {
                tracing::error!("PDF compilation failed: {details}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "COMPILE_ERROR",
                    "PDF compilation failed".to_string(),
                    Some(Value::String(details)),
                    None,
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                    None,
                    None,
                )
            }
        };

        let mut error = json!({
            "code": code,
            "message": message,
        });
        if let Some(details) = details {
            error["details"] = details;
        }
        if let Some(raw) = raw {
            error["raw"] = raw;
        }

        (status, Json(json!({ "error": error }))).into_response()
    }
}
