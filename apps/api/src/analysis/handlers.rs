//! Axum route handlers for the Analysis API.

use axum::{
    extract::{Multipart, State},
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::analysis::orchestrator::{AnalysisRecord, AnalysisRequest};
use crate::analysis::parser::{AtsResult, GrammarFeedback};
use crate::analysis::scoring::ScoreBreakdown;
use crate::errors::AppError;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ScoreRequest {
    pub resume_text: String,
    #[serde(default)]
    pub job_title: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GrammarRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct GrammarResponse {
    pub feedback: GrammarFeedback,
}

#[derive(Debug, Deserialize)]
pub struct AtsRequest {
    pub resume_text: String,
    pub job_description: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/analyze
pub async fn handle_analyze(
    State(state): State<AppState>,
    Json(request): Json<AnalysisRequest>,
) -> Result<Json<AnalysisRecord>, AppError> {
    let record = state.analysis.analyze(&request).await?;
    Ok(Json(record))
}

/// POST /api/v1/analyze/upload
///
/// Multipart form: `file` (PDF or plain text), optional `job_title` and `job_description`.
pub async fn handle_analyze_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<AnalysisRecord>, AppError> {
    let mut request = AnalysisRequest::default();
    let mut file_seen = false;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let is_pdf = field.content_type() == Some("application/pdf")
                    || field
                        .file_name()
                        .is_some_and(|f| f.to_lowercase().ends_with(".pdf"));
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Could not read file: {e}")))?;
                request.resume_text = extract_resume_text(data, is_pdf).await?;
                file_seen = true;
            }
            "job_title" | "job_description" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Could not read {name}: {e}")))?;
                if name == "job_title" {
                    request.job_title = Some(value);
                } else {
                    request.job_description = Some(value);
                }
            }
            _ => {}
        }
    }

    if !file_seen {
        return Err(AppError::Validation("Missing 'file' field".to_string()));
    }

    let record = state.analysis.analyze(&request).await?;
    Ok(Json(record))
}

/// POST /api/v1/score
///
/// Heuristic score only; the model is consulted just for the job-fit blend.
pub async fn handle_score(
    State(state): State<AppState>,
    Json(request): Json<ScoreRequest>,
) -> Result<Json<ScoreBreakdown>, AppError> {
    if request.resume_text.trim().is_empty() {
        return Err(AppError::Validation("resume_text cannot be empty".to_string()));
    }
    let breakdown = state
        .analysis
        .score(&request.resume_text, request.job_title.as_deref())
        .await;
    Ok(Json(breakdown))
}

/// POST /api/v1/grammar
///
/// Always succeeds; a failed model call yields default feedback.
pub async fn handle_grammar(
    State(state): State<AppState>,
    Json(request): Json<GrammarRequest>,
) -> Result<Json<GrammarResponse>, AppError> {
    if request.text.trim().is_empty() {
        return Err(AppError::Validation("text cannot be empty".to_string()));
    }
    let feedback = state.analysis.grammar_feedback(&request.text).await;
    Ok(Json(GrammarResponse { feedback }))
}

/// POST /api/v1/ats
pub async fn handle_ats(
    State(state): State<AppState>,
    Json(request): Json<AtsRequest>,
) -> Result<Json<AtsResult>, AppError> {
    if request.resume_text.trim().is_empty() {
        return Err(AppError::Validation("resume_text cannot be empty".to_string()));
    }
    if request.job_description.trim().is_empty() {
        return Err(AppError::Validation(
            "job_description cannot be empty".to_string(),
        ));
    }
    let result = state
        .analysis
        .ats_feedback(&request.resume_text, &request.job_description)
        .await;
    Ok(Json(result))
}

/// Text of an uploaded resume. PDF parsing is CPU-bound and runs on the blocking pool.
async fn extract_resume_text(data: Bytes, is_pdf: bool) -> Result<String, AppError> {
    let is_pdf = is_pdf || data.starts_with(b"%PDF");
    if !is_pdf {
        return String::from_utf8(data.to_vec()).map_err(|_| {
            AppError::UnprocessableEntity("File is neither a PDF nor UTF-8 text".to_string())
        });
    }

    let size = data.len();
    let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&data))
        .await
        .map_err(|e| {
            // pdf-extract panics on some malformed documents
            if e.is_panic() {
                AppError::UnprocessableEntity("Could not read PDF".to_string())
            } else {
                AppError::Internal(e.into())
            }
        })?
        .map_err(|e| AppError::UnprocessableEntity(format!("Could not read PDF: {e}")))?;

    info!(bytes = size, chars = text.len(), "Extracted text from uploaded PDF");
    Ok(text)
}
