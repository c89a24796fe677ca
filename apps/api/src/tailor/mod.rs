// Resume tailoring: prompt construction around a single structured-output
// completion, followed by strict validation of the returned JSON.
// All model calls go through llm_client, never directly.

pub mod handlers;
pub mod prompts;
pub mod schema;
pub mod track;

/// Minimum resume length, in characters, accepted by the tailoring and analysis endpoints.
pub const MIN_RESUME_CHARS: usize = 200;
/// Minimum job description length, in characters.
pub const MIN_JOB_DESCRIPTION_CHARS: usize = 100;
