use std::path::PathBuf;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Every setting has a default; `ANTHROPIC_API_KEY` only gates `/improve-summary`.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// LaTeX template with `<<slot>>` placeholders.
    pub template_path: PathBuf,
    /// Record served by `/sample-data` and rendered by `/generate-from-json`.
    pub sample_data_path: PathBuf,
    /// Where generated `.tex` and `.pdf` files are kept for download.
    pub output_dir: PathBuf,
    pub latex_bin: String,
    pub latex_timeout_secs: u64,
    /// Generated files older than this are deleted on the next run. `0` keeps them.
    pub artifact_ttl_secs: u64,
    /// Author names to set in bold in the publications section.
    pub highlight_authors: Vec<String>,
    pub anthropic_api_key: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            port: parse_env("PORT", 8000)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            template_path: optional_env("TEMPLATE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("templates/resume.tex")),
            sample_data_path: optional_env("SAMPLE_DATA_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("data/sample_resume.json")),
            output_dir: optional_env("OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| std::env::temp_dir().join("resume_builder")),
            latex_bin: optional_env("LATEX_BIN").unwrap_or_else(|| "pdflatex".to_string()),
            latex_timeout_secs: parse_env("LATEX_TIMEOUT_SECS", 60)?,
            artifact_ttl_secs: parse_env("ARTIFACT_TTL_SECS", 86_400)?,
            highlight_authors: optional_env("HIGHLIGHT_AUTHORS")
                .map(|v| split_list(&v))
                .unwrap_or_default(),
            anthropic_api_key: optional_env("ANTHROPIC_API_KEY"),
        })
    }
}

/// Value of `key`, treating an empty variable as unset.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value '{raw}'")),
        None => Ok(default),
    }
}

/// Splits a comma-separated list, dropping blank entries.
fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
