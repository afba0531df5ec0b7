use crate::error::{Result, ServiceError};
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use quire::{content_disposition, CancellationToken, GenerationRequest};

/// `POST /generate-pdf`: renders the records and returns the PDF as a
/// download, or `204 No Content` when there are no records.
pub async fn generate_pdf(
    State(state): State<AppState>,
    payload: std::result::Result<Json<GenerationRequest>, JsonRejection>,
) -> Result<Response> {
    let Json(request) = payload.map_err(|e| ServiceError::InvalidRequest(e.body_text()))?;
    let job = request.into_job()?;
    let filename = job.filename();
    tracing::info!("Generation request for '{}' ({} records)", filename, job.records.len());

    let Some(document) = state.pipeline.generate(&job, &CancellationToken::new()).await? else {
        tracing::info!("No records for '{}', nothing generated", filename);
        return Ok(StatusCode::NO_CONTENT.into_response());
    };

    tracing::info!(
        "Generated '{}' ({} pages, {} bytes)",
        filename,
        document.page_count(),
        document.bytes().len()
    );
    let disposition = HeaderValue::from_str(&content_disposition(&filename))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment; filename=\"document.pdf\""));
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("application/pdf")),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        document.into_bytes(),
    )
        .into_response())
}

/// Plain `OPTIONS` requests get an empty `200`; CORS preflights are
/// answered by the CORS layer before reaching this.
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}

pub async fn health_check() -> &'static str {
    "ok"
}
