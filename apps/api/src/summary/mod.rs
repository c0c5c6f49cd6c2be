// Summary rewriting: proxies a summary paragraph to the LLM client.
// All LLM calls go through llm_client.

pub mod handlers;
pub mod improver;
pub mod prompts;
