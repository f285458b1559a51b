//! Axum route handlers for the resume assistant.

use std::fmt;

use axum::{extract::State, Json};
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::info;
use uuid::Uuid;

use crate::assistant::prompts::{
    EXPORT_PROMPT_FOOTER, EXPORT_PROMPT_HEADER, RESUME_CONTEXT_TEMPLATE,
};
use crate::errors::AppError;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub prompt: String,
    #[serde(default)]
    pub resume_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
}

#[derive(Debug, Deserialize)]
pub struct ExportRequest {
    #[serde(alias = "resumeInfo", default)]
    pub resume_info: ResumeSections,
}

#[derive(Debug, Serialize)]
pub struct ExportResponse {
    pub resume: String,
}

/// Resume sections in the order the client sent them. Non-string content is
/// kept as its JSON text; null and blank sections are dropped.
#[derive(Debug, Default, PartialEq)]
pub struct ResumeSections(pub Vec<(String, String)>);

impl<'de> Deserialize<'de> for ResumeSections {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SectionsVisitor;

        impl<'de> Visitor<'de> for SectionsVisitor {
            type Value = ResumeSections;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of section name to content")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut sections = Vec::new();
                while let Some((name, content)) = map.next_entry::<String, Value>()? {
                    let content = match content {
                        Value::Null => continue,
                        Value::String(s) => s,
                        other => other.to_string(),
                    };
                    if !content.trim().is_empty() {
                        sections.push((name, content));
                    }
                }
                Ok(ResumeSections(sections))
            }
        }

        deserializer.deserialize_map(SectionsVisitor)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/assistant/chat
///
/// Forwards the prompt to the model, with the stored resume appended when `resume_id` is given.
pub async fn handle_chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    if request.prompt.trim().is_empty() {
        return Err(AppError::Validation("prompt cannot be empty".to_string()));
    }

    let mut prompt = request.prompt;
    if let Some(resume_id) = request.resume_id {
        let stored = state
            .store
            .fetch(resume_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Resume {resume_id} not found")))?;
        prompt.push_str(&RESUME_CONTEXT_TEMPLATE.replace("{resume_text}", &stored.text));
    }

    let response = state.llm.complete(&prompt).await?;
    Ok(Json(ChatResponse { response }))
}

/// POST /api/v1/assistant/export
///
/// Asks the model to compile the given sections into one formatted resume.
pub async fn handle_export(
    State(state): State<AppState>,
    Json(request): Json<ExportRequest>,
) -> Result<Json<ExportResponse>, AppError> {
    if request.resume_info.0.is_empty() {
        return Err(AppError::Validation(
            "resume_info must contain at least one section".to_string(),
        ));
    }

    info!(
        sections = request.resume_info.0.len(),
        "Exporting resume"
    );
    let prompt = build_export_prompt(&request.resume_info);
    let resume = state.llm.complete(&prompt).await?;
    Ok(Json(ExportResponse { resume }))
}

fn build_export_prompt(sections: &ResumeSections) -> String {
    let mut prompt = EXPORT_PROMPT_HEADER.to_string();
    for (name, content) in &sections.0 {
        prompt.push_str(&format!("\n{name}:\n{content}\n"));
    }
    prompt.push_str(EXPORT_PROMPT_FOOTER);
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sections_keep_client_order() {
        let request: ExportRequest = serde_json::from_str(
            r#"{"resumeInfo": {"Summary": "Backend engineer", "Experience": "Acme 2019-2024", "Awards": null, "Hobbies": "  ", "Skills": ["Rust", "SQL"]}}"#,
        )
        .unwrap();

        let names: Vec<&str> = request
            .resume_info
            .0
            .iter()
            .map(|(name, _)| name.as_str())
            .collect();
        assert_eq!(names, vec!["Summary", "Experience", "Skills"]);
        assert_eq!(request.resume_info.0[2].1, r#"["Rust","SQL"]"#);
    }

    #[test]
    fn test_missing_resume_info_is_empty() {
        let request: ExportRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(request.resume_info, ResumeSections::default());
    }

    #[test]
    fn test_export_prompt_lists_sections_in_order() {
        let sections = ResumeSections(vec![
            ("Summary".to_string(), "Backend engineer".to_string()),
            ("Education".to_string(), "BSc, 2015".to_string()),
        ]);
        let prompt = build_export_prompt(&sections);

        assert!(prompt.starts_with(EXPORT_PROMPT_HEADER));
        assert!(prompt.ends_with(EXPORT_PROMPT_FOOTER));
        let summary = prompt.find("\nSummary:\nBackend engineer\n").unwrap();
        let education = prompt.find("\nEducation:\nBSc, 2015\n").unwrap();
        assert!(summary < education);
    }
}
