use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use quire::PipelineError;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let (status, error) = match &self {
            Self::InvalidRequest(_) | Self::Pipeline(PipelineError::InputValidation(_)) => {
                (StatusCode::BAD_REQUEST, "Invalid request")
            }
            Self::Pipeline(_) => {
                tracing::error!("PDF generation failed: {}", self);
                (StatusCode::INTERNAL_SERVER_ERROR, "PDF generation failed")
            }
        };

        let details = match &self {
            Self::InvalidRequest(details) => details.clone(),
            Self::Pipeline(e) => e.to_string(),
        };
        (status, Json(json!({ "error": error, "details": details }))).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ServiceError>;
