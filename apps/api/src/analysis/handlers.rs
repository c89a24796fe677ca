//! Axum route handler for the Analysis API.

use axum::{extract::rejection::JsonRejection, Json};
use serde::Deserialize;
use tracing::info;

use crate::analysis::metrics::{compute_metrics, Metrics};
use crate::errors::AppError;
use crate::tailor::handlers::validate_documents;

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub resume_latex: String,
    #[serde(default)]
    pub job_description: String,
}

/// POST /api/analyze
///
/// Scores a LaTeX resume against a job description. Useful for comparing the base
/// resume with a tailored one before compiling.
pub async fn handle_analyze(
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<Metrics>, AppError> {
    let Json(request) = payload.map_err(|e| AppError::Validation(e.body_text()))?;
    validate_documents(&request.resume_latex, &request.job_description)?;

    // Fuzzy matching is CPU-bound; keep it off the async executor.
    let metrics = tokio::task::spawn_blocking(move || {
        compute_metrics(&request.resume_latex, &request.job_description)
    })
    .await
    .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in analysis: {e}")))?;

    info!(
        keyword_alignment = metrics.keyword_alignment,
        signal_density = metrics.signal_density,
        bullets = metrics.bullet_count,
        "Analysis complete"
    );

    Ok(Json(metrics))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::testing::{post_json, read_json, stub_state, valid_tailor_output, StubCompletion};

    const RESUME: &str = r"\documentclass[letterpaper,11pt]{article}
        \begin{document}
        Skills: Embedded Linux, RTOS, CAN, GTest, GDB, C, C++
        \section{Experience}
        \resumeItemListStart
          \resumeItem{Implemented CAN bus driver on STM32 with 1 Mbps throughput}
          \resumeItem{Validated firmware with GTest unit tests in CI on Embedded Linux}
          \resumeItem{Debugged RTOS timing issues with GDB and a logic analyzer}
        \resumeItemListEnd
        \end{document}";

    const JOB: &str = "Firmware Engineer. Develop device drivers for Embedded Linux and RTOS \
        targets in C and C++. Experience with CAN, GTest and GDB required.";

    #[tokio::test]
    async fn test_analyze_returns_metrics() {
        let (app, llm, _) = stub_state(StubCompletion::returning(valid_tailor_output()));
        let response = post_json(
            app,
            "/api/analyze",
            json!({"resume_latex": RESUME, "job_description": JOB}),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(llm.calls(), 0);

        let payload = read_json(response).await;
        assert_eq!(payload["bullet_count"], 3);
        let matched = payload["matched_keywords"].as_array().unwrap();
        assert!(matched.iter().any(|k| k == "embedded linux"));
        assert!(payload["signal_density"].as_f64().unwrap() > 0.0);
    }

    #[tokio::test]
    async fn test_analyze_rejects_short_input() {
        let (app, _, _) = stub_state(StubCompletion::returning(valid_tailor_output()));
        let response = post_json(
            app,
            "/api/analyze",
            json!({"resume_latex": "short", "job_description": JOB}),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
