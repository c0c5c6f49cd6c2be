//! Axum route handler for the summary rewriting endpoint.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::state::AppState;
use crate::summary::improver::{improve_summary, validate_summary};

#[derive(Debug, Deserialize)]
pub struct ImproveSummaryRequest {
    #[serde(default)]
    pub instructions: Option<String>,
    pub summary: String,
}

#[derive(Debug, Serialize)]
pub struct ImproveSummaryResponse {
    pub message: String,
    pub improved_summary: String,
}

/// POST /improve-summary
///
/// Rewrites a résumé summary with the text-generation API.
pub async fn handle_improve_summary(
    State(state): State<AppState>,
    Json(request): Json<ImproveSummaryRequest>,
) -> Result<Json<ImproveSummaryResponse>, AppError> {
    validate_summary(&request.summary)?;

    let llm = state.llm.as_ref().ok_or_else(|| {
        AppError::Unavailable("Summary improvement requires ANTHROPIC_API_KEY to be set".to_string())
    })?;

    let improved_summary =
        improve_summary(llm, request.instructions.as_deref(), &request.summary).await?;

    Ok(Json(ImproveSummaryResponse {
        message: "Summary improved successfully".to_string(),
        improved_summary,
    }))
}
