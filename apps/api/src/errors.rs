use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::agents::Stage;
use crate::extract::ExtractError;
use crate::llm_client::LlmError;

/// Application-level error type.
/// Every variant renders as a single descriptive message; no partial results
/// accompany an error. Implements `IntoResponse` so handlers can return
/// `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    /// Empty or unusable source text. Raised before any backend call.
    #[error("Input error: {0}")]
    Input(String),

    /// The model reply held no well-formed JSON object.
    #[error("Parse error: {0}")]
    Parse(#[from] ExtractError),

    /// Parsed JSON broke a stage's schema contract.
    #[error("{stage} output invalid: {message}")]
    Validation { stage: Stage, message: String },

    /// Backend call failed after the invoker exhausted its recovery steps.
    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn validation(stage: Stage, message: impl Into<String>) -> Self {
        AppError::Validation {
            stage,
            message: message.into(),
        }
    }

    fn code(&self) -> &'static str {
        match self {
            AppError::Input(_) => "INPUT_ERROR",
            AppError::Parse(_) => "PARSE_ERROR",
            AppError::Validation { .. } => "VALIDATION_ERROR",
            AppError::Backend(_) => "BACKEND_ERROR",
            AppError::Configuration(_) => "CONFIGURATION_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::Input(_) => StatusCode::BAD_REQUEST,
            AppError::Parse(_) | AppError::Validation { .. } | AppError::Backend(_) => {
                StatusCode::BAD_GATEWAY
            }
            AppError::Configuration(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<LlmError> for AppError {
    fn from(err: LlmError) -> Self {
        AppError::Backend(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();

        let message = match &self {
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                "An internal server error occurred".to_string()
            }
            AppError::Input(_) => self.to_string(),
            other => {
                tracing::error!("Pipeline error: {other}");
                other.to_string()
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_names_the_stage() {
        let err = AppError::validation(Stage::Analyst, "no valid skills found");
        assert_eq!(err.to_string(), "Analyst output invalid: no valid skills found");
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AppError::Input("empty".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Parse(ExtractError::EmptyResponse).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            AppError::Backend("down".into()).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            AppError::Configuration("missing".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_llm_error_becomes_backend_error() {
        let err: AppError = LlmError::Api {
            status: 400,
            message: "bad request".into(),
        }
        .into();
        assert!(matches!(err, AppError::Backend(_)));
        assert!(err.to_string().contains("bad request"));
    }
}
