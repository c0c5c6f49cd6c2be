mod config;
mod errors;
mod llm_client;
mod models;
mod render;
mod resumes;
mod routes;
mod state;
mod summary;
mod typeset;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::render::{RenderOptions, Template};
use crate::resumes::pipeline::ResumePipeline;
use crate::routes::build_router;
use crate::state::AppState;
use crate::typeset::LatexTypesetter;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting cvgen v{}", env!("CARGO_PKG_VERSION"));

    // Parse the template once; a broken template is a startup error
    let source = tokio::fs::read_to_string(&config.template_path)
        .await
        .with_context(|| format!("Failed to read template {}", config.template_path.display()))?;
    let template = Template::parse(&source)
        .with_context(|| format!("Invalid template {}", config.template_path.display()))?;
    info!("Template loaded from {}", config.template_path.display());

    tokio::fs::create_dir_all(&config.output_dir)
        .await
        .with_context(|| format!("Failed to create {}", config.output_dir.display()))?;

    let typesetter = Arc::new(LatexTypesetter::new(
        config.latex_bin.clone(),
        Duration::from_secs(config.latex_timeout_secs),
    ));
    let options = RenderOptions {
        highlight_authors: config.highlight_authors.clone(),
    };
    let mut pipeline =
        ResumePipeline::new(template, options, typesetter, config.output_dir.clone());
    if config.artifact_ttl_secs > 0 {
        pipeline = pipeline.with_artifact_ttl(Duration::from_secs(config.artifact_ttl_secs));
    }
    info!(
        "Typesetting with {} into {}",
        config.latex_bin,
        config.output_dir.display()
    );

    // LLM client is optional; without a key /improve-summary answers 503
    let llm = match &config.anthropic_api_key {
        Some(key) => {
            let client = LlmClient::new(key.clone())?;
            info!("LLM client initialized (model: {})", llm_client::MODEL);
            Some(client)
        }
        None => {
            warn!("ANTHROPIC_API_KEY not set, summary improvement disabled");
            None
        }
    };

    let state = AppState {
        config: config.clone(),
        pipeline,
        llm,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
