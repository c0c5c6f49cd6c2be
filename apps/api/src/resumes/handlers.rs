//! Axum route handlers for résumé generation and artifact management.

use axum::{
    body::Bytes,
    extract::{Multipart, Path, State},
    http::header,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::errors::AppError;
use crate::models::resume::{DataFormat, LoadError, ResumeData};
use crate::resumes::pipeline::{ArtifactKind, GeneratedResume};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub message: String,
    pub filename: String,
    pub download_url: String,
    pub latex_url: String,
}

impl GenerateResponse {
    fn from_generated(generated: &GeneratedResume) -> Self {
        let filename = generated.file_name(ArtifactKind::Pdf);
        Self {
            message: "Resume generated successfully".to_string(),
            download_url: format!("/download/{filename}"),
            latex_url: format!("/download/{}", generated.file_name(ArtifactKind::Tex)),
            filename,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TemplateResponse {
    pub template: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct SampleDataResponse {
    pub sample_data: Value,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct CleanupResponse {
    pub message: String,
    pub status: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /generate-resume
///
/// Body is a JSON résumé record. Parsed by hand so malformed records get the
/// usual error body instead of axum's plain-text rejection.
pub async fn handle_generate_resume(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<GenerateResponse>, AppError> {
    let data = ResumeData::from_slice(&body, DataFormat::Json)?;
    let generated = state.pipeline.run(&data).await?;
    Ok(Json(GenerateResponse::from_generated(&generated)))
}

/// POST /upload-json
///
/// Multipart upload with a `file` field holding a `.json`, `.yaml` or `.yml` record.
pub async fn handle_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<GenerateResponse>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        let format = DataFormat::from_file_name(&file_name).ok_or_else(|| {
            AppError::Validation(format!(
                "Unsupported file '{file_name}': expected .json, .yaml or .yml"
            ))
        })?;
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Could not read upload: {e}")))?;

        info!("Received upload '{file_name}' ({} bytes)", bytes.len());

        let data = ResumeData::from_slice(&bytes, format)?;
        let generated = state.pipeline.run(&data).await?;
        return Ok(Json(GenerateResponse::from_generated(&generated)));
    }

    Err(AppError::Validation("Missing 'file' field".to_string()))
}

/// POST /generate-from-json
///
/// Renders the sample record configured by `SAMPLE_DATA_PATH`.
pub async fn handle_generate_from_sample(
    State(state): State<AppState>,
) -> Result<Json<GenerateResponse>, AppError> {
    let path = &state.config.sample_data_path;
    let data = ResumeData::from_path(path).await.map_err(|e| match e {
        LoadError::Io { ref source, .. } if source.kind() == std::io::ErrorKind::NotFound => {
            AppError::NotFound(format!("Sample data file {} not found", path.display()))
        }
        other => AppError::Load(other),
    })?;
    let generated = state.pipeline.run(&data).await?;
    Ok(Json(GenerateResponse::from_generated(&generated)))
}

/// GET /download/:filename
pub async fn handle_download(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let (bytes, kind) = state.pipeline.read_artifact(&filename).await?;
    let headers = [
        (header::CONTENT_TYPE, kind.content_type().to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{filename}\""),
        ),
    ];
    Ok((headers, bytes))
}

/// GET /template
pub async fn handle_get_template(State(state): State<AppState>) -> Json<TemplateResponse> {
    Json(TemplateResponse {
        template: state.pipeline.template().source().to_string(),
        message: "Template retrieved successfully".to_string(),
    })
}

/// GET /sample-data
///
/// Returns the sample record as stored on disk, after checking that it loads.
pub async fn handle_get_sample_data(
    State(state): State<AppState>,
) -> Result<Json<SampleDataResponse>, AppError> {
    let path = &state.config.sample_data_path;
    let display = path.display().to_string();
    let format = DataFormat::from_file_name(&display)
        .ok_or_else(|| AppError::Load(LoadError::UnsupportedFormat(display.clone())))?;
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(AppError::NotFound(format!("Sample data file {display} not found")))
        }
        Err(source) => {
            return Err(AppError::Load(LoadError::Io {
                path: display,
                source,
            }))
        }
    };

    ResumeData::from_slice(&bytes, format)?;
    let sample_data: Value = match format {
        DataFormat::Json => serde_json::from_slice(&bytes).map_err(LoadError::from)?,
        DataFormat::Yaml => serde_yaml::from_slice(&bytes).map_err(LoadError::from)?,
    };

    Ok(Json(SampleDataResponse {
        sample_data,
        message: "Sample data retrieved successfully".to_string(),
    }))
}

/// DELETE /cleanup
pub async fn handle_cleanup(
    State(state): State<AppState>,
) -> Result<Json<CleanupResponse>, AppError> {
    let removed = state.pipeline.clear_output().await?;
    Ok(Json(CleanupResponse {
        message: format!("Removed {removed} generated files"),
        status: "success".to_string(),
    }))
}
