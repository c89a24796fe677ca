// All prompt text for the tailoring endpoint.
// Reuses cross-cutting fragments from llm_client::prompts.

use crate::llm_client::prompts::{JSON_SCHEMA_INSTRUCTION, NO_FABRICATION_INSTRUCTION};
use crate::tailor::track::Track;

/// Name reported to the completion API for the structured-output schema.
pub const TAILOR_SCHEMA_NAME: &str = "tailor_result";

const TAILOR_SYSTEM_HEADER: &str = "You are an expert engineering resume writer.

HARD CONSTRAINTS (must follow):
- The output MUST compile to exactly ONE page on US Letter (8.5x11).
- If content would overflow, you MUST shorten bullets (not margins), remove least relevant bullets, and/or compress wording.
- Keep margins and font size exactly as in the provided LaTeX template.
- Keep total bullets per role/project to a maximum of 4 unless explicitly instructed otherwise.
- Prefer: numbers/metrics, short phrases, remove adjectives.";

const TAILOR_RULES: &str = "- Output a FULL LaTeX document that compiles.
- Preserve formatting and structure; make targeted edits (keywords, bullet wording, ordering).
- Keep it one page.
- Add ATS keywords naturally.";

/// Builds the system instruction for one tailoring request.
pub fn build_system_prompt(track: Track) -> String {
    format!(
        "{TAILOR_SYSTEM_HEADER}\n\nRules:\n{NO_FABRICATION_INSTRUCTION}\n{TAILOR_RULES}\n\n\
         Track guidance:\n{}\n\n{JSON_SCHEMA_INSTRUCTION}",
        track.guidance()
    )
}

/// Builds the user message carrying the two documents.
pub fn build_user_prompt(resume_latex: &str, job_description: &str) -> String {
    format!("RESUME_LATEX:\n{resume_latex}\n\nJOB_DESCRIPTION:\n{job_description}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_prompt_embeds_track_guidance() {
        for track in [Track::Embedded, Track::HardwarePower, Track::Software] {
            let prompt = build_system_prompt(track);
            assert!(prompt.contains(track.guidance()));
        }
    }

    #[test]
    fn test_system_prompt_carries_hard_constraints() {
        let prompt = build_system_prompt(Track::Software);
        assert!(prompt.contains("exactly ONE page"));
        assert!(prompt.contains("Keep margins and font size"));
        assert!(prompt.contains("maximum of 4"));
        assert!(prompt.contains("Do NOT invent"));
        assert!(prompt.ends_with(JSON_SCHEMA_INSTRUCTION));
    }

    #[test]
    fn test_user_prompt_layout() {
        let prompt = build_user_prompt("\\documentclass{article}", "Firmware engineer");
        assert_eq!(
            prompt,
            "RESUME_LATEX:\n\\documentclass{article}\n\nJOB_DESCRIPTION:\nFirmware engineer"
        );
    }
}
