//! Axum route handlers for stored resumes.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::analysis::orchestrator::{AnalysisRecord, AnalysisRequest};
use crate::errors::AppError;
use crate::state::AppState;
use crate::storage::StoredResume;

#[derive(Debug, Deserialize)]
pub struct SaveResumeRequest {
    pub text: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct AnalyzeStoredRequest {
    #[serde(default)]
    pub job_title: Option<String>,
    #[serde(default)]
    pub job_description: Option<String>,
}

/// PUT /api/v1/resumes/:id
pub async fn handle_save_resume(
    State(state): State<AppState>,
    Path(resume_id): Path<Uuid>,
    Json(request): Json<SaveResumeRequest>,
) -> Result<Json<StoredResume>, AppError> {
    if request.text.trim().is_empty() {
        return Err(AppError::Validation("text cannot be empty".to_string()));
    }
    let stored = state.store.save(resume_id, request.text).await?;
    Ok(Json(stored))
}

/// GET /api/v1/resumes/:id
pub async fn handle_get_resume(
    State(state): State<AppState>,
    Path(resume_id): Path<Uuid>,
) -> Result<Json<StoredResume>, AppError> {
    let stored = state
        .store
        .fetch(resume_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Resume {resume_id} not found")))?;
    Ok(Json(stored))
}

/// POST /api/v1/resumes/:id/analyze
///
/// Runs the full analysis over the stored text of the resume.
pub async fn handle_analyze_stored(
    State(state): State<AppState>,
    Path(resume_id): Path<Uuid>,
    Json(request): Json<AnalyzeStoredRequest>,
) -> Result<Json<AnalysisRecord>, AppError> {
    let stored = state
        .store
        .fetch(resume_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Resume {resume_id} not found")))?;

    let record = state
        .analysis
        .analyze(&AnalysisRequest {
            resume_text: stored.text,
            job_title: request.job_title,
            job_description: request.job_description,
        })
        .await?;
    Ok(Json(record))
}
