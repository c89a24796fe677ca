//! LLM prompt text for the refinement loop.
//!
//! One shared system prompt per track; the user message carries the mode's
//! instruction block followed by the job description and the LaTeX to rewrite.

use crate::llm_client::prompts::{JSON_SCHEMA_INSTRUCTION, NO_FABRICATION_INSTRUCTION};
use crate::refine::RefineMode;
use crate::tailor::track::Track;

// ────────────────────────────────────────────────────────────────────────────
// System prompt
// ────────────────────────────────────────────────────────────────────────────

const REFINE_SYSTEM_HEADER: &str = "\
You are an assistant that edits LaTeX resumes for job alignment.";

const REFINE_RULES: &str = "\
- Do NOT invent experience, metrics, tools, or claims not supported by the original resume text.
- Preserve LaTeX validity. Do not break braces or commands.
- Prefer concrete technical specificity (tools, interfaces, constraints, validation) over vague claims.
- Avoid fluff: do not add generic collaboration/communication lines unless already present.
- Keep overall layout similar; adjust bullets and skills for alignment.
- HARD CONSTRAINT: Output must fit on ONE page when compiled to PDF.
- Do NOT add new sections. Avoid adding new bullets; prefer rewriting/condensing existing bullets.";

// ────────────────────────────────────────────────────────────────────────────
// Mode instructions
// ────────────────────────────────────────────────────────────────────────────

const DEFAULT_INSTRUCTIONS: &str = "\
Make the resume more aligned to the job description while staying truthful.
Improve bullet specificity and add relevant keywords ONLY if supported by resume.
Ensure the output can fit on one page by keeping bullets concise.";

const DEPTH_INSTRUCTIONS: &str = "\
Increase technical depth WITHOUT adding fluff:
- Add implementation details (interfaces, components, constraints, tools) ONLY if implied by existing resume.
- Add validation/testing language ONLY if implied (e.g., \"validated\", \"bench\", \"debugged\").
- Prefer specifying mechanisms over general outcomes.
- Do not add soft-skill filler.
Keep it one-page: do not increase bullet count; shorten wording if needed.";

const TIGHTEN_INSTRUCTIONS: &str = "\
The resume exceeds one page. Tighten it to fit on ONE PAGE when compiled.

Rules:
- Do NOT add new bullets or sections.
- Prefer removing weakest/least relevant bullets first (older/less aligned).
- Shorten bullets aggressively (remove adjectives, compress clauses).
- Keep formatting/template intact (do not change margins/font sizes unless already present).
- Keep bullets to ~1 line when possible.";

const EXPAND_INSTRUCTIONS: &str = "\
The resume is underfilled (too much whitespace) but must remain ONE PAGE.

Rules:
- Do NOT add new experience or claims.
- You may slightly expand bullets by adding technical mechanisms, constraints, validation steps ONLY if already implied by the resume.
- Prefer improving specificity over adding new bullets.
- If adding length, do it evenly across the most relevant sections.
- Do NOT change margins/font sizes.";

const OUTPUT_INSTRUCTIONS: &str = "\
Put the full LaTeX document, from \\documentclass through \\end{document}, in the tailored_latex field.
Do NOT include any explanation or markdown inside it.";

impl RefineMode {
    /// Instruction block placed at the top of the user message.
    pub fn instructions(self) -> &'static str {
        match self {
            RefineMode::Default => DEFAULT_INSTRUCTIONS,
            RefineMode::IncreaseTechnicalDepth => DEPTH_INSTRUCTIONS,
            RefineMode::TightenToOnePage => TIGHTEN_INSTRUCTIONS,
            RefineMode::ExpandToFillOnePage => EXPAND_INSTRUCTIONS,
        }
    }
}

/// System instruction shared by every generation in one refinement run.
pub fn build_refine_system_prompt(track: Track) -> String {
    format!(
        "{REFINE_SYSTEM_HEADER}\n\nHard rules:\n{NO_FABRICATION_INSTRUCTION}\n{REFINE_RULES}\n\n\
         Track guidance:\n{}\n\n{JSON_SCHEMA_INSTRUCTION}",
        track.guidance()
    )
}

/// User message for one generation. `resume_latex` is the version being rewritten,
/// which for tighten and expand is the current draft rather than the original.
pub fn build_refine_user_prompt(
    mode: RefineMode,
    resume_latex: &str,
    job_description: &str,
) -> String {
    format!(
        "{}\n\n{OUTPUT_INSTRUCTIONS}\n\n=== JOB DESCRIPTION ===\n{job_description}\n\n\
         === RESUME (LATEX) ===\n{resume_latex}",
        mode.instructions()
    )
}
