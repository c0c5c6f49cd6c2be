//! Summary rewriting through the LLM client.

use tracing::info;

use crate::errors::AppError;
use crate::llm_client::prompts::PLAIN_TEXT_ONLY;
use crate::llm_client::LlmClient;
use crate::summary::prompts::{DEFAULT_INSTRUCTIONS, SUMMARY_PROMPT_TEMPLATE};

/// Upper bound on the summary accepted for rewriting, in characters.
pub const MAX_SUMMARY_CHARS: usize = 5_000;

/// Builds the system prompt and user message for one rewrite.
pub fn build_prompts(instructions: Option<&str>, summary: &str) -> (String, String) {
    let instructions = instructions
        .map(str::trim)
        .filter(|i| !i.is_empty())
        .unwrap_or(DEFAULT_INSTRUCTIONS);
    let system = format!("{instructions}\n\n{PLAIN_TEXT_ONLY}");
    let prompt = SUMMARY_PROMPT_TEMPLATE.replace("{summary}", summary.trim());
    (system, prompt)
}

/// Removes wrapping quotes the model sometimes adds around the paragraph.
pub fn clean_summary(text: &str) -> String {
    let text = text.trim();
    for (open, close) in [('"', '"'), ('“', '”'), ('\'', '\'')] {
        if let Some(inner) = text
            .strip_prefix(open)
            .and_then(|t| t.strip_suffix(close))
        {
            if !inner.contains(close) {
                return inner.trim().to_string();
            }
        }
    }
    text.to_string()
}

pub fn validate_summary(summary: &str) -> Result<(), AppError> {
    if summary.trim().is_empty() {
        return Err(AppError::Validation("summary cannot be empty".to_string()));
    }
    if summary.chars().count() > MAX_SUMMARY_CHARS {
        return Err(AppError::Validation(format!(
            "summary must be at most {MAX_SUMMARY_CHARS} characters"
        )));
    }
    Ok(())
}

/// Rewrites `summary` according to `instructions`.
///
/// Callers run [`validate_summary`] first.
pub async fn improve_summary(
    llm: &LlmClient,
    instructions: Option<&str>,
    summary: &str,
) -> Result<String, AppError> {
    let (system, prompt) = build_prompts(instructions, summary);
    info!("Improving summary ({} chars)", summary.chars().count());

    let text = llm
        .call_text(&prompt, &system)
        .await
        .map_err(|e| AppError::Llm(format!("Failed to improve summary: {e}")))?;

    Ok(clean_summary(&text))
}
