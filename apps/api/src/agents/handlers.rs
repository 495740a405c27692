//! Axum route handlers for the pipeline API.

use axum::{
    extract::{rejection::JsonRejection, Multipart, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, Instrument};
use uuid::Uuid;

use crate::agents::pipeline::{run_pipeline, PipelineReport};
use crate::agents::views::PipelineView;
use crate::errors::AppError;
use crate::resume::pdf::extract_pdf_text;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RunTextRequest {
    pub resume_text: String,
    pub job_description: String,
}

#[derive(Debug, Serialize)]
pub struct RunResponse {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub report: PipelineReport,
    pub view: PipelineView,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/pipeline/run
///
/// Multipart form: `resume` (PDF file) and `job_description` (text).
pub async fn handle_run(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<RunResponse>, AppError> {
    let mut resume_pdf: Option<Vec<u8>> = None;
    let mut job_description: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Input(format!("Invalid multipart body: {e}")))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("resume") => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Input(format!("Failed to read resume upload: {e}")))?;
                resume_pdf = Some(bytes.to_vec());
            }
            Some("job_description") => {
                let text = field.text().await.map_err(|e| {
                    AppError::Input(format!("Failed to read job description: {e}"))
                })?;
                job_description = Some(text);
            }
            _ => {}
        }
    }

    let resume_pdf =
        resume_pdf.ok_or_else(|| AppError::Input("Missing 'resume' PDF upload.".to_string()))?;
    let job_description = job_description
        .ok_or_else(|| AppError::Input("Missing 'job_description' field.".to_string()))?;

    if job_description.trim().is_empty() {
        return Err(AppError::Input("Job description cannot be empty.".to_string()));
    }

    let resume_text = tokio::task::spawn_blocking(move || extract_pdf_text(&resume_pdf))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("PDF extraction task failed: {e}")))??;

    execute(&state, &resume_text, &job_description).await
}

/// POST /api/v1/pipeline/run-text
///
/// Same pipeline for callers that already have the resume as text.
pub async fn handle_run_text(
    State(state): State<AppState>,
    payload: Result<Json<RunTextRequest>, JsonRejection>,
) -> Result<Json<RunResponse>, AppError> {
    let Json(request) =
        payload.map_err(|e| AppError::Input(format!("Invalid request body: {}", e.body_text())))?;
    execute(&state, &request.resume_text, &request.job_description).await
}

/// One isolated run: its own invoker, its own run id, nothing shared.
async fn execute(
    state: &AppState,
    resume_text: &str,
    job_description: &str,
) -> Result<Json<RunResponse>, AppError> {
    let run_id = Uuid::new_v4();
    let started_at = Utc::now();
    let invoker = state.invoker();

    let span = tracing::info_span!("pipeline", %run_id);
    let report = run_pipeline(&invoker, resume_text, job_description)
        .instrument(span)
        .await?;

    let finished_at = Utc::now();
    info!(
        "Pipeline run {} finished in {}ms",
        run_id,
        (finished_at - started_at).num_milliseconds()
    );

    let view = PipelineView::from_report(&report);
    Ok(Json(RunResponse {
        run_id,
        started_at,
        finished_at,
        report,
        view,
    }))
}
