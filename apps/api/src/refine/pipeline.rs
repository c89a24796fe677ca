//! Refinement pipeline: the compile-measure-regenerate loop behind `/api/tailor/refine`.
//!
//! Every generation is one structured completion; every measurement is one sandboxed
//! compile plus a page count. A draft that fails to compile never replaces one that did.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::analysis::metrics::{compute_metrics, Level, Metrics};
use crate::analysis::text::strip_latex_commands;
use crate::compile::pages::page_count;
use crate::compile::sanitize::sanitize_latex;
use crate::compile::LatexCompiler;
use crate::errors::AppError;
use crate::llm_client::{CompletionRequest, CompletionService};
use crate::refine::prompts::{build_refine_system_prompt, build_refine_user_prompt};
use crate::refine::schema::{parse_refined_output, refined_resume_schema, REFINE_SCHEMA_NAME};
use crate::refine::RefineMode;
use crate::state::AppState;
use crate::tailor::track::Track;

pub const PAGE_LIMIT: usize = 1;
/// Tighten regenerations allowed per pass.
pub const MAX_TIGHTEN_ATTEMPTS: usize = 2;
/// A one-page draft with fewer stripped words than this gets one expansion attempt.
pub const MIN_FILLED_WORDS: usize = 600;
const FAILURE_SNIPPET_CHARS: usize = 200;

// ────────────────────────────────────────────────────────────────────────────
// Types
// ────────────────────────────────────────────────────────────────────────────

/// Metric floors below which a technical-depth pass is attempted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub min_signal_density: f64,
    pub min_keyword_alignment: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            min_signal_density: 7.6,
            min_keyword_alignment: 82.0,
        }
    }
}

impl Thresholds {
    pub fn requires_regeneration(&self, metrics: &Metrics) -> bool {
        metrics.signal_density < self.min_signal_density
            || metrics.keyword_alignment < self.min_keyword_alignment
    }
}

/// Final LaTeX of one pass with its metrics.
#[derive(Debug, Clone, Serialize)]
pub struct PassResult {
    pub pass_index: u8,
    pub mode: RefineMode,
    pub tailored_latex: String,
    pub metrics: Metrics,
}

/// What the loop did and why. Page count and tighten attempts describe pass 1.
#[derive(Debug, Clone, Serialize)]
pub struct RefineDecision {
    pub ran_second_pass: bool,
    pub reason: Option<String>,
    pub thresholds: Thresholds,
    pub page_limit: usize,
    pub page_count: Option<usize>,
    pub tighten_attempts: usize,
    pub expanded_to_fill: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct RefineResponse {
    pub best: PassResult,
    pub all_passes: Vec<PassResult>,
    pub decision: RefineDecision,
}

/// A draft after the tighten loop.
#[derive(Debug)]
struct FittedDraft {
    latex: String,
    /// Pages of `latex`; `None` when even the first draft failed to compile.
    pages: Option<usize>,
    tighten_attempts: usize,
    failure: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Pipeline
// ────────────────────────────────────────────────────────────────────────────

/// One refinement run over a resume and job description.
pub struct Refiner<'a> {
    llm: &'a dyn CompletionService,
    compiler: &'a dyn LatexCompiler,
    system: String,
    job_description: &'a str,
}

impl<'a> Refiner<'a> {
    pub fn new(state: &'a AppState, track: Track, job_description: &'a str) -> Self {
        Self {
            llm: state.llm.as_ref(),
            compiler: state.compiler.as_ref(),
            system: build_refine_system_prompt(track),
            job_description,
        }
    }

    /// Runs pass 1 and, when its metrics fall short and `max_passes` allows, pass 2.
    pub async fn run(
        &self,
        resume_latex: &str,
        thresholds: Thresholds,
        max_passes: u8,
    ) -> Result<RefineResponse, AppError> {
        let mut decision = RefineDecision {
            ran_second_pass: false,
            reason: None,
            thresholds,
            page_limit: PAGE_LIMIT,
            page_count: None,
            tighten_attempts: 0,
            expanded_to_fill: false,
        };

        // Pass 1: default draft, fitted to the page, then filled if it runs short.
        let draft = self.generate(resume_latex, RefineMode::Default).await?;
        let fitted = self.fit_to_page(draft).await?;
        decision.page_count = fitted.pages;
        decision.tighten_attempts = fitted.tighten_attempts;
        decision.reason = fitted.failure;

        let mut latex = fitted.latex;
        if fitted.pages == Some(PAGE_LIMIT) {
            if let Some(expanded) = self.expand_to_fill(&latex).await? {
                latex = expanded;
                decision.expanded_to_fill = true;
            }
        }

        let metrics = self.metrics_for(&latex).await?;
        let run_depth_pass = max_passes >= 2 && thresholds.requires_regeneration(&metrics);
        let mut passes = vec![PassResult {
            pass_index: 1,
            mode: RefineMode::Default,
            tailored_latex: latex,
            metrics,
        }];

        // Pass 2: start over from the original resume with more technical depth.
        if run_depth_pass {
            decision.ran_second_pass = true;
            decision.reason = Some(
                "Below thresholds; regenerating with increase_technical_depth mode.".to_string(),
            );
            info!("Pass 1 below thresholds; running technical-depth pass");

            let mode = RefineMode::IncreaseTechnicalDepth;
            let draft = self.generate(resume_latex, mode).await?;
            let fitted = self.fit_to_page(draft).await?;
            let metrics = self.metrics_for(&fitted.latex).await?;
            passes.push(PassResult {
                pass_index: 2,
                mode,
                tailored_latex: fitted.latex,
                metrics,
            });
        }

        let best = choose_best(&passes).cloned().ok_or_else(|| {
            AppError::Internal(anyhow::anyhow!("refinement produced no passes"))
        })?;

        Ok(RefineResponse {
            best,
            all_passes: passes,
            decision,
        })
    }

    /// One structured completion in the given mode.
    async fn generate(&self, resume_latex: &str, mode: RefineMode) -> Result<String, AppError> {
        let user = build_refine_user_prompt(mode, resume_latex, self.job_description);
        let raw = self
            .llm
            .complete_json(CompletionRequest {
                system: &self.system,
                user: &user,
                schema_name: REFINE_SCHEMA_NAME,
                schema: refined_resume_schema(),
            })
            .await?;
        parse_refined_output(&raw)
    }

    /// Compiles `latex` and counts its pages. Failures come back as diagnostic text.
    async fn measure(&self, latex: &str) -> Result<usize, String> {
        let pdf = self
            .compiler
            .compile(&sanitize_latex(latex))
            .await
            .map_err(|e| e.diagnostics())?;
        page_count(Bytes::from(pdf))
            .await
            .ok_or_else(|| "compiled PDF has no countable pages".to_string())
    }

    /// Tightens `draft` until it fits the page limit or the attempts run out.
    /// A draft that fails to measure is discarded in favor of the last one that did.
    async fn fit_to_page(&self, draft: String) -> Result<FittedDraft, AppError> {
        let mut accepted = draft.clone();
        let mut candidate = draft;
        let mut pages = None;
        let mut attempts = 0;
        let mut failure = None;

        loop {
            let count = match self.measure(&candidate).await {
                Ok(count) => count,
                Err(diagnostics) => {
                    warn!(
                        attempt = attempts,
                        "Draft failed to compile; keeping the last good version"
                    );
                    let snippet: String =
                        diagnostics.chars().take(FAILURE_SNIPPET_CHARS).collect();
                    failure = Some(format!(
                        "Compile failed during tighten attempt {attempts}: {snippet}"
                    ));
                    break;
                }
            };

            accepted = candidate;
            pages = Some(count);
            if count <= PAGE_LIMIT || attempts == MAX_TIGHTEN_ATTEMPTS {
                break;
            }

            attempts += 1;
            info!(pages = count, attempt = attempts, "Draft over page limit; tightening");
            candidate = self.generate(&accepted, RefineMode::TightenToOnePage).await?;
        }

        Ok(FittedDraft {
            latex: accepted,
            pages,
            tighten_attempts: attempts,
            failure,
        })
    }

    /// One expansion attempt for an underfilled one-page draft.
    /// Returns the expanded LaTeX only if it still measures exactly one page.
    async fn expand_to_fill(&self, latex: &str) -> Result<Option<String>, AppError> {
        let words = strip_latex_commands(latex).split_whitespace().count();
        if words >= MIN_FILLED_WORDS {
            return Ok(None);
        }

        info!(words, "Draft underfills the page; expanding");
        let expanded = self.generate(latex, RefineMode::ExpandToFillOnePage).await?;
        match self.measure(&expanded).await {
            Ok(PAGE_LIMIT) => Ok(Some(expanded)),
            Ok(pages) => {
                info!(pages, "Expanded draft overflowed; keeping the shorter version");
                Ok(None)
            }
            Err(_) => {
                warn!("Expanded draft failed to compile; keeping the shorter version");
                Ok(None)
            }
        }
    }

    async fn metrics_for(&self, latex: &str) -> Result<Metrics, AppError> {
        let latex = latex.to_string();
        let job_description = self.job_description.to_string();
        // Fuzzy matching is CPU-bound; keep it off the async executor.
        tokio::task::spawn_blocking(move || compute_metrics(&latex, &job_description))
            .await
            .map_err(|e| {
                AppError::Internal(anyhow::anyhow!("spawn_blocking failed in refinement: {e}"))
            })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Scoring
// ────────────────────────────────────────────────────────────────────────────

/// Ranking score for a pass: alignment and signal density, less a redundancy penalty.
pub fn pass_score(metrics: &Metrics) -> f64 {
    let redundancy_penalty = match metrics.redundancy {
        Level::High => 0.8,
        Level::Med => 0.3,
        Level::Low => 0.0,
    };
    metrics.keyword_alignment * 0.65 + metrics.signal_density * 3.5 - redundancy_penalty
}

/// Highest-scoring pass. `min_by` keeps the first of equals, so earlier passes win ties.
pub fn choose_best(passes: &[PassResult]) -> Option<&PassResult> {
    passes
        .iter()
        .min_by(|a, b| pass_score(&b.metrics).total_cmp(&pass_score(&a.metrics)))
}
