mod analysis;
mod assistant;
mod config;
mod errors;
mod llm_client;
mod routes;
mod state;
mod storage;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::keywords::KeywordExtractor;
use crate::analysis::orchestrator::AnalysisService;
use crate::config::Config;
use crate::llm_client::{CompletionClient, LmStudioClient};
use crate::routes::build_router;
use crate::state::AppState;
use crate::storage::{InMemoryResumeStore, RedisResumeStore, ResumeStore};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting resume-coach v{}", env!("CARGO_PKG_VERSION"));

    // Initialize LLM client
    let lm_studio = LmStudioClient::new(&config).context("Failed to build LLM client")?;
    info!(
        "LLM client initialized (model: {}, endpoint: {})",
        lm_studio.model(),
        config.llm_api_url
    );
    let llm: Arc<dyn CompletionClient> = Arc::new(lm_studio);

    // Initialize resume storage
    let store: Arc<dyn ResumeStore> = match &config.redis_url {
        Some(url) => Arc::new(
            RedisResumeStore::connect(url)
                .await
                .context("Failed to connect to Redis")?,
        ),
        None => {
            info!("REDIS_URL not set; storing resumes in memory");
            Arc::new(InMemoryResumeStore::default())
        }
    };

    let keywords = KeywordExtractor::with_extra_keywords(&config.extra_keywords);
    info!("Keyword vocabulary: {} entries", keywords.vocabulary_len());

    let analysis = AnalysisService::new(llm.clone(), keywords, config.llm_timeout);

    let state = AppState {
        analysis: Arc::new(analysis),
        llm,
        store,
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the frontend host is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
