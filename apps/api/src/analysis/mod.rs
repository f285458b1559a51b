// Resume analysis engine.
// Pure heuristics (metrics, keywords, scoring, sentiment) plus the model-assisted
// pipeline in orchestrator. Model calls go through llm_client only.

pub mod handlers;
pub mod keywords;
pub mod metrics;
pub mod orchestrator;
pub mod parser;
pub mod prompts;
pub mod scoring;
pub mod sentiment;
