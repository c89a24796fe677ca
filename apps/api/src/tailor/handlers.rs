//! Axum route handler for the Tailoring API.

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::Deserialize;
use tracing::info;

use crate::errors::AppError;
use crate::llm_client::CompletionRequest;
use crate::state::AppState;
use crate::tailor::prompts::{build_system_prompt, build_user_prompt, TAILOR_SCHEMA_NAME};
use crate::tailor::schema::{parse_tailor_output, tailor_result_schema, TailorResult};
use crate::tailor::track::Track;
use crate::tailor::{MIN_JOB_DESCRIPTION_CHARS, MIN_RESUME_CHARS};

#[derive(Debug, Deserialize)]
pub struct TailorRequest {
    #[serde(default)]
    pub resume_latex: String,
    #[serde(default)]
    pub job_description: String,
    #[serde(default)]
    pub track: Track,
}

/// Character counts of the two input documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentSizes {
    pub resume_chars: usize,
    pub job_description_chars: usize,
}

/// Rejects undersized documents before any external call.
pub fn validate_documents(
    resume_latex: &str,
    job_description: &str,
) -> Result<DocumentSizes, AppError> {
    let sizes = DocumentSizes {
        resume_chars: resume_latex.chars().count(),
        job_description_chars: job_description.chars().count(),
    };
    if sizes.resume_chars < MIN_RESUME_CHARS
        || sizes.job_description_chars < MIN_JOB_DESCRIPTION_CHARS
    {
        return Err(AppError::Validation(format!(
            "Please provide your full LaTeX resume (at least {MIN_RESUME_CHARS} characters) \
             and a job description (at least {MIN_JOB_DESCRIPTION_CHARS} characters)."
        )));
    }
    Ok(sizes)
}

/// POST /api/tailor
///
/// One structured-output completion per request. The model's JSON is validated and
/// returned as-is; anything that fails the contract is a 502.
pub async fn handle_tailor(
    State(state): State<AppState>,
    payload: Result<Json<TailorRequest>, JsonRejection>,
) -> Result<Json<TailorResult>, AppError> {
    let Json(request) = payload.map_err(|e| AppError::Validation(e.body_text()))?;
    let sizes = validate_documents(&request.resume_latex, &request.job_description)?;

    info!(
        track = request.track.as_str(),
        resume_chars = sizes.resume_chars,
        job_description_chars = sizes.job_description_chars,
        "Tailoring resume"
    );

    let system = build_system_prompt(request.track);
    let user = build_user_prompt(&request.resume_latex, &request.job_description);

    let raw = state
        .llm
        .complete_json(CompletionRequest {
            system: &system,
            user: &user,
            schema_name: TAILOR_SCHEMA_NAME,
            schema: tailor_result_schema(),
        })
        .await?;

    let result = parse_tailor_output(&raw)?;

    info!(
        keywords = result.keywords.len(),
        changes = result.change_summary.len(),
        "Tailoring complete"
    );

    Ok(Json(result))
}
