// Shared prompt fragments.
// Each service that needs LLM calls defines its own prompts.rs alongside it.

/// System prompt fragment that keeps responses to the rewritten text alone.
pub const PLAIN_TEXT_ONLY: &str = "\
    Respond with the rewritten text only. \
    Do NOT add a preamble, headings, quotes, or commentary. \
    Do NOT use markdown formatting or code fences.";
