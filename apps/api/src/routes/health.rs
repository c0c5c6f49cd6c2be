use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /
/// Service banner with the list of endpoints.
pub async fn index_handler() -> Json<Value> {
    Json(json!({
        "service": "cvgen",
        "version": env!("CARGO_PKG_VERSION"),
        "message": "Resume builder API: JSON or YAML record in, LaTeX and PDF out",
        "endpoints": {
            "health": "GET /health",
            "generate_resume": "POST /generate-resume",
            "upload_json": "POST /upload-json",
            "generate_from_json": "POST /generate-from-json",
            "download": "GET /download/{filename}",
            "template": "GET /template",
            "sample_data": "GET /sample-data",
            "cleanup": "DELETE /cleanup",
            "improve_summary": "POST /improve-summary"
        }
    }))
}

/// GET /health
/// Returns status, version and a few environment checks.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let output_dir = state.pipeline.output_dir();
    let output_dir_ok = tokio::fs::metadata(output_dir)
        .await
        .map(|meta| meta.is_dir() && !meta.permissions().readonly())
        .unwrap_or(false);
    let sample_data_ok = tokio::fs::try_exists(&state.config.sample_data_path)
        .await
        .unwrap_or(false);

    Json(json!({
        "status": if output_dir_ok { "ok" } else { "degraded" },
        "version": env!("CARGO_PKG_VERSION"),
        "service": "cvgen",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "checks": {
            "output_dir": output_dir.display().to_string(),
            "output_dir_writable": output_dir_ok,
            "sample_data_present": sample_data_ok,
            "typesetter": state.pipeline.typesetter_name(),
            "summary_improvement_enabled": state.llm.is_some()
        }
    }))
}
