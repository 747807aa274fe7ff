// Shared prompt fragments.
// Each module that needs LLM calls defines its own prompts.rs alongside it.

/// System prompt fragment that asks for JSON-only output. The model does not
/// always comply; callers must still tolerate fences and commentary.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured assistant. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";
