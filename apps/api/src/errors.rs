use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::analysis::extractor::ExtractionError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// A malformed model reply is not represented here: the normalizer absorbs it.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Extraction failed: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Persistence error: {0}")]
    Persistence(anyhow::Error),

    #[error("Aggregation source unavailable: {0}")]
    AggregationSourceUnavailable(anyhow::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Authentication required".to_string(),
            ),
            AppError::Extraction(e) => {
                tracing::warn!("Extraction error: {e}");
                let message = match e {
                    ExtractionError::UnsupportedFormat(_) => e.to_string(),
                    ExtractionError::Corrupt { .. } => {
                        "The uploaded resume could not be read".to_string()
                    }
                };
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "EXTRACTION_FAILED",
                    message,
                )
            }
            AppError::Llm(msg) => {
                tracing::error!("LLM error: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "ANALYSIS_FAILED",
                    "Error analyzing resume".to_string(),
                )
            }
            AppError::Storage(msg) => {
                tracing::error!("Storage error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORAGE_ERROR",
                    "Error uploading resume file".to_string(),
                )
            }
            AppError::Persistence(e) => {
                tracing::error!("Persistence error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "PERSISTENCE_ERROR",
                    "A database error occurred".to_string(),
                )
            }
            AppError::AggregationSourceUnavailable(e) => {
                tracing::error!("Statistics source unavailable: {e:?}");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "STATS_UNAVAILABLE",
                    "Statistics are temporarily unavailable".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
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
    use crate::analysis::extractor::DocumentFormat;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (AppError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (AppError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (AppError::Unauthorized, StatusCode::UNAUTHORIZED),
            (
                AppError::Extraction(ExtractionError::UnsupportedFormat("image/png".into())),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (AppError::Llm("quota".into()), StatusCode::BAD_GATEWAY),
            (AppError::Storage("s3".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (
                AppError::Persistence(anyhow::anyhow!("db down")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                AppError::AggregationSourceUnavailable(anyhow::anyhow!("db down")),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                AppError::Internal(anyhow::anyhow!("boom")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (error, expected) in cases {
            assert_eq!(error.into_response().status(), expected);
        }
    }

    #[tokio::test]
    async fn test_internal_details_are_not_echoed() {
        let response = AppError::Extraction(ExtractionError::Corrupt {
            format: DocumentFormat::Pdf,
            reason: "xref table at offset 8812 is broken".into(),
        })
        .into_response();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["error"]["code"], "EXTRACTION_FAILED");
        assert!(!value["error"]["message"]
            .as_str()
            .unwrap()
            .contains("xref"));
    }
}
