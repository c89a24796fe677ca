//! Axum route handler for the Refinement API.

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::Deserialize;
use tracing::info;

use crate::errors::AppError;
use crate::refine::pipeline::{RefineResponse, Refiner, Thresholds};
use crate::state::AppState;
use crate::tailor::handlers::validate_documents;
use crate::tailor::track::Track;

const MAX_PASSES_LIMIT: u8 = 3;

#[derive(Debug, Deserialize)]
pub struct RefineRequest {
    #[serde(default)]
    pub resume_latex: String,
    #[serde(default)]
    pub job_description: String,
    #[serde(default)]
    pub track: Track,
    #[serde(default = "default_min_signal_density")]
    pub min_signal_density: f64,
    #[serde(default = "default_min_keyword_alignment")]
    pub min_keyword_alignment: f64,
    #[serde(default = "default_max_passes")]
    pub max_passes: u8,
}

fn default_min_signal_density() -> f64 {
    Thresholds::default().min_signal_density
}

fn default_min_keyword_alignment() -> f64 {
    Thresholds::default().min_keyword_alignment
}

fn default_max_passes() -> u8 {
    2
}

impl RefineRequest {
    /// Range checks for the loop knobs.
    pub fn thresholds(&self) -> Result<Thresholds, AppError> {
        if !(0.0..=10.0).contains(&self.min_signal_density) {
            return Err(AppError::Validation(
                "min_signal_density must be between 0 and 10.".to_string(),
            ));
        }
        if !(0.0..=100.0).contains(&self.min_keyword_alignment) {
            return Err(AppError::Validation(
                "min_keyword_alignment must be between 0 and 100.".to_string(),
            ));
        }
        if !(1..=MAX_PASSES_LIMIT).contains(&self.max_passes) {
            return Err(AppError::Validation(format!(
                "max_passes must be between 1 and {MAX_PASSES_LIMIT}."
            )));
        }
        Ok(Thresholds {
            min_signal_density: self.min_signal_density,
            min_keyword_alignment: self.min_keyword_alignment,
        })
    }
}

/// POST /api/tailor/refine
///
/// Tailors, compiles and regenerates until the resume fits one page, optionally runs a
/// technical-depth pass, and returns every pass with the best one picked out.
pub async fn handle_refine(
    State(state): State<AppState>,
    payload: Result<Json<RefineRequest>, JsonRejection>,
) -> Result<Json<RefineResponse>, AppError> {
    let Json(request) = payload.map_err(|e| AppError::Validation(e.body_text()))?;
    let sizes = validate_documents(&request.resume_latex, &request.job_description)?;
    let thresholds = request.thresholds()?;

    info!(
        track = request.track.as_str(),
        resume_chars = sizes.resume_chars,
        job_description_chars = sizes.job_description_chars,
        max_passes = request.max_passes,
        "Refining resume"
    );

    let refiner = Refiner::new(&state, request.track, &request.job_description);
    let response = refiner
        .run(&request.resume_latex, thresholds, request.max_passes)
        .await?;

    info!(
        best_pass = response.best.pass_index,
        passes = response.all_passes.len(),
        page_count = ?response.decision.page_count,
        tighten_attempts = response.decision.tighten_attempts,
        "Refinement complete"
    );

    Ok(Json(response))
}
