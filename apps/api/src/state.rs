use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::resumes::pipeline::ResumePipeline;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Render, typeset and persist. Holds the parsed template and the typesetter.
    pub pipeline: ResumePipeline,
    /// `None` when `ANTHROPIC_API_KEY` is unset; `/improve-summary` then answers 503.
    pub llm: Option<LlmClient>,
}
