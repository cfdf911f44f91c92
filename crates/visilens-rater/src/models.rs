//! Static mapping from short rater ids to OpenRouter model names.

/// Built-in rater table: short id, OpenRouter model name.
const MODEL_TABLE: &[(&str, &str)] = &[
    ("chatgpt-4o", "openai/gpt-4o"),
    ("gemini-2.5", "google/gemini-2.5-flash"),
    ("claude-sonnet", "anthropic/claude-sonnet-4"),
    ("deepseek-v3", "deepseek/deepseek-chat-v3"),
];

/// Resolve a short rater id to its OpenRouter model name. Unknown ids pass
/// through unchanged so callers can address models the table doesn't know.
#[must_use]
pub fn resolve_model(rater_id: &str) -> &str {
    MODEL_TABLE
        .iter()
        .find(|(id, _)| *id == rater_id)
        .map_or(rater_id, |(_, name)| name)
}

/// The full built-in rater id list, in table order.
#[must_use]
pub fn default_raters() -> Vec<String> {
    MODEL_TABLE.iter().map(|(id, _)| (*id).to_string()).collect()
}
