pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::analysis::handlers as analysis;
use crate::assistant::handlers as assistant;
use crate::state::AppState;
use crate::storage::handlers as storage;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Analysis API
        .route("/api/v1/analyze", post(analysis::handle_analyze))
        .route(
            "/api/v1/analyze/upload",
            post(analysis::handle_analyze_upload),
        )
        .route("/api/v1/score", post(analysis::handle_score))
        .route("/api/v1/grammar", post(analysis::handle_grammar))
        .route("/api/v1/ats", post(analysis::handle_ats))
        // Assistant API
        .route("/api/v1/assistant/chat", post(assistant::handle_chat))
        .route("/api/v1/assistant/export", post(assistant::handle_export))
        // Stored resumes
        .route(
            "/api/v1/resumes/:id",
            get(storage::handle_get_resume).put(storage::handle_save_resume),
        )
        .route(
            "/api/v1/resumes/:id/analyze",
            post(storage::handle_analyze_stored),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::analysis::keywords::KeywordExtractor;
    use crate::analysis::orchestrator::AnalysisService;
    use crate::config::Config;
    use crate::llm_client::{CompletionClient, CompletionError};
    use crate::storage::InMemoryResumeStore;

    struct FailingClient;

    #[async_trait]
    impl CompletionClient for FailingClient {
        async fn complete(&self, _prompt: &str) -> Result<String, CompletionError> {
            Err(CompletionError::EmptyContent)
        }
    }

    /// Replies with the prompt it was given.
    struct EchoClient;

    #[async_trait]
    impl CompletionClient for EchoClient {
        async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
            Ok(prompt.to_string())
        }
    }

    fn test_config() -> Config {
        Config {
            llm_api_url: "http://localhost:1234/v1/chat/completions".to_string(),
            llm_model: "test-model".to_string(),
            llm_temperature: 0.7,
            llm_timeout: Duration::from_secs(5),
            redis_url: None,
            extra_keywords: Vec::new(),
            port: 0,
            rust_log: "info".to_string(),
        }
    }

    fn app(llm: Arc<dyn CompletionClient>) -> Router {
        let config = test_config();
        let analysis = AnalysisService::new(
            llm.clone(),
            KeywordExtractor::default(),
            config.llm_timeout,
        );
        build_router(AppState {
            analysis: Arc::new(analysis),
            llm,
            store: Arc::new(InMemoryResumeStore::default()),
            config,
        })
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        let response = app
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn test_health() {
        let app = app(Arc::new(FailingClient));
        let (status, body) = send(&app, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["service"], "resume-coach");
        assert_eq!(body["model"], "test-model");
    }

    #[tokio::test]
    async fn test_analyze_rejects_blank_resume() {
        let app = app(Arc::new(FailingClient));
        let (status, body) = send(
            &app,
            "POST",
            "/api/v1/analyze",
            Some(json!({"resume_text": "   "})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_analyze_survives_model_outage() {
        let app = app(Arc::new(FailingClient));
        let (status, body) = send(
            &app,
            "POST",
            "/api/v1/analyze",
            Some(json!({
                "resume_text": "• Led a team of 4 engineers\n• Developed a billing service in Python",
                "job_title": "Backend Engineer",
                "job_description": "Python and SQL developer"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["score"].as_u64().unwrap() <= 100);
        assert_eq!(body["ats"]["keyword_match_score"], "N/A");
        assert_eq!(body["ats"]["missing_keywords"], json!(["sql"]));
        assert!(body["recommendations"].as_array().unwrap().len() >= 3);
    }

    #[tokio::test]
    async fn test_stored_resume_lifecycle() {
        let app = app(Arc::new(FailingClient));
        let uri = "/api/v1/resumes/6f1c1d52-8a4b-4a52-9a53-2f6f0f3b8f10";

        let (status, _) = send(&app, "GET", uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = send(&app, "PUT", uri, Some(json!({"text": "Led a team of 4"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["text"], "Led a team of 4");

        let (status, body) = send(&app, "GET", uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["resume_id"], "6f1c1d52-8a4b-4a52-9a53-2f6f0f3b8f10");

        let (status, body) = send(&app, "POST", &format!("{uri}/analyze"), Some(json!({}))).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["ats"].is_null());
    }

    #[tokio::test]
    async fn test_chat_surfaces_model_failure() {
        let app = app(Arc::new(FailingClient));
        let (status, body) = send(
            &app,
            "POST",
            "/api/v1/assistant/chat",
            Some(json!({"prompt": "How do I list certifications?"})),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["code"], "LLM_ERROR");
    }

    #[tokio::test]
    async fn test_chat_includes_stored_resume() {
        let app = app(Arc::new(EchoClient));
        let uri = "/api/v1/resumes/0b7e4f9e-3c0a-4d3e-8a8e-5d1f6c2b9a77";
        send(&app, "PUT", uri, Some(json!({"text": "Managed SQL migrations"}))).await;

        let (status, body) = send(
            &app,
            "POST",
            "/api/v1/assistant/chat",
            Some(json!({
                "prompt": "Improve my summary",
                "resume_id": "0b7e4f9e-3c0a-4d3e-8a8e-5d1f6c2b9a77"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let response = body["response"].as_str().unwrap();
        assert!(response.starts_with("Improve my summary"));
        assert!(response.contains("Managed SQL migrations"));
    }

    #[tokio::test]
    async fn test_export_requires_sections() {
        let app = app(Arc::new(EchoClient));
        let (status, _) = send(
            &app,
            "POST",
            "/api/v1/assistant/export",
            Some(json!({"resume_info": {}})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send(
            &app,
            "POST",
            "/api/v1/assistant/export",
            Some(json!({"resumeInfo": {"Summary": "Backend engineer"}})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["resume"].as_str().unwrap().contains("Summary:\nBackend engineer"));
    }

    fn multipart_request(body: &'static str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/v1/analyze/upload")
            .header("content-type", "multipart/form-data; boundary=BOUNDARY")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_upload_plain_text_resume() {
        let app = app(Arc::new(FailingClient));
        let request = multipart_request(
            "--BOUNDARY\r\n\
             Content-Disposition: form-data; name=\"file\"; filename=\"resume.txt\"\r\n\
             Content-Type: text/plain\r\n\r\n\
             • Led a team of 4 engineers\r\n\
             --BOUNDARY\r\n\
             Content-Disposition: form-data; name=\"job_description\"\r\n\r\n\
             Scrum master\r\n\
             --BOUNDARY--\r\n",
        );

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["metrics"]["word_count"], 7);
        assert_eq!(body["metrics"]["bullet_count"], 1);
        assert_eq!(body["ats"]["missing_keywords"], json!(["scrum"]));
    }

    #[tokio::test]
    async fn test_upload_requires_file() {
        let app = app(Arc::new(FailingClient));
        let request = multipart_request(
            "--BOUNDARY\r\n\
             Content-Disposition: form-data; name=\"job_title\"\r\n\r\n\
             Engineer\r\n\
             --BOUNDARY--\r\n",
        );

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_score_without_job_title() {
        let app = app(Arc::new(FailingClient));
        let (status, body) = send(
            &app,
            "POST",
            "/api/v1/score",
            Some(json!({"resume_text": "Led a team of 4 engineers"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["length_verdict"], "Short");
        assert!(body["job_specific_score"].is_null());
    }

    #[tokio::test]
    async fn test_ats_requires_job_description() {
        let app = app(Arc::new(FailingClient));
        let (status, _) = send(
            &app,
            "POST",
            "/api/v1/ats",
            Some(json!({"resume_text": "Python developer", "job_description": ""})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_grammar_defaults_on_model_failure() {
        let app = app(Arc::new(FailingClient));
        let (status, body) = send(
            &app,
            "POST",
            "/api/v1/grammar",
            Some(json!({"text": "Responsible for things"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["feedback"]["section_feedback"]["general"].is_object());
        assert_eq!(
            body["feedback"]["recommendations"].as_array().unwrap().len(),
            3
        );
    }
}
