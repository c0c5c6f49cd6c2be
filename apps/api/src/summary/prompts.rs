/// Instructions used when the caller does not supply any.
pub const DEFAULT_INSTRUCTIONS: &str = "\
    You are a professional recruiter. Improve the writing style of the following \
    summary section to be more professional and concise. Focus on action verbs and \
    quantifiable achievements. Don't provide any other text than the improved summary section.";

/// User message wrapping the summary to rewrite. `{summary}` is replaced verbatim.
pub const SUMMARY_PROMPT_TEMPLATE: &str = "\
Rewrite the résumé summary below following your instructions.

<summary>
{summary}
</summary>";
