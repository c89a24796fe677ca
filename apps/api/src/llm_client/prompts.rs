// Shared prompt fragments. Each service that calls the model keeps its own
// prompts.rs alongside it; cross-cutting instructions live here.

/// Appended to every system prompt that requests structured output.
pub const JSON_SCHEMA_INSTRUCTION: &str =
    "Output MUST be valid JSON matching the provided JSON schema.";

/// Hard truthfulness rule shared by all resume-editing prompts.
pub const NO_FABRICATION_INSTRUCTION: &str =
    "- Do NOT invent any employers, degrees, dates, tools, or achievements.";
