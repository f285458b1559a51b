use std::sync::Arc;

use crate::analysis::orchestrator::AnalysisService;
use crate::config::Config;
use crate::llm_client::CompletionClient;
use crate::storage::ResumeStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub analysis: Arc<AnalysisService>,
    /// Direct model access for the assistant endpoints; analysis goes through `analysis`.
    pub llm: Arc<dyn CompletionClient>,
    /// Redis-backed when `REDIS_URL` is set, in-memory otherwise.
    pub store: Arc<dyn ResumeStore>,
    pub config: Config,
}
