//! Axum route handler for the Compilation API.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{
        header::{CACHE_CONTROL, CONTENT_DISPOSITION, CONTENT_TYPE},
        HeaderMap, HeaderValue, StatusCode,
    },
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use serde::Deserialize;
use tracing::info;

use crate::compile::pages::page_count;
use crate::compile::sanitize::sanitize_latex;
use crate::compile::MIN_LATEX_CHARS;
use crate::errors::AppError;
use crate::state::AppState;

/// Response header carrying the page count of the compiled PDF, when known.
pub const PAGE_COUNT_HEADER: &str = "x-pdf-pages";

#[derive(Debug, Deserialize)]
pub struct CompileRequest {
    #[serde(default)]
    pub latex: String,
}

/// POST /api/compile
///
/// Sanitizes the source, compiles it in a per-request scratch directory and streams
/// back the PDF. The page count header is omitted when the PDF cannot be parsed.
pub async fn handle_compile(
    State(state): State<AppState>,
    payload: Result<Json<CompileRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(request) = payload.map_err(|e| AppError::Validation(e.body_text()))?;

    if request.latex.chars().count() < MIN_LATEX_CHARS {
        return Err(AppError::Validation(format!(
            "Missing LaTeX content (at least {MIN_LATEX_CHARS} characters required)."
        )));
    }

    let sanitized = sanitize_latex(&request.latex);
    info!(
        source_bytes = request.latex.len(),
        removed_bytes = request.latex.len() - sanitized.len(),
        "Compiling LaTeX"
    );

    let pdf = Bytes::from(state.compiler.compile(&sanitized).await?);
    let pages = page_count(pdf.clone()).await;

    info!(pdf_bytes = pdf.len(), pages = ?pages, "Compilation complete");

    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/pdf"));
    headers.insert(
        CONTENT_DISPOSITION,
        HeaderValue::from_static("attachment; filename=\"resume.pdf\""),
    );
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));
    if let Some(pages) = pages {
        headers.insert(PAGE_COUNT_HEADER, HeaderValue::from(pages));
    }

    Ok((StatusCode::OK, headers, pdf).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    use crate::testing::{
        pdf_with_pages, post_json, read_bytes, read_json, stub_app, StubCompiler, StubCompletion,
    };

    fn latex_of_len(len: usize) -> String {
        let mut s = String::from("\\documentclass{article}\n\\begin{document}\n");
        while s.chars().count() < len {
            s.push('x');
        }
        s
    }

    fn app_with(compiler: StubCompiler) -> (axum::Router, std::sync::Arc<StubCompiler>) {
        let (app, _, compiler) = stub_app(StubCompletion::missing_key(), compiler);
        (app, compiler)
    }

    #[tokio::test]
    async fn test_short_latex_returns_400_without_compiling() {
        let (app, compiler) = app_with(StubCompiler::returning(pdf_with_pages(1)));
        let response = post_json(app, "/api/compile", json!({"latex": latex_of_len(199)})).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(compiler.calls(), 0);
    }

    #[tokio::test]
    async fn test_missing_latex_field_is_400() {
        let (app, compiler) = app_with(StubCompiler::returning(pdf_with_pages(1)));
        let response = post_json(app, "/api/compile", json!({})).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(compiler.calls(), 0);
    }

    #[tokio::test]
    async fn test_success_sets_pdf_headers_and_page_count() {
        let pdf = pdf_with_pages(1);
        let (app, compiler) = app_with(StubCompiler::returning(pdf.clone()));
        let response = post_json(app, "/api/compile", json!({"latex": latex_of_len(200)})).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(compiler.calls(), 1);
        let headers = response.headers();
        assert_eq!(headers[CONTENT_TYPE], "application/pdf");
        assert_eq!(headers[CONTENT_DISPOSITION], "attachment; filename=\"resume.pdf\"");
        assert_eq!(headers[CACHE_CONTROL], "no-store");
        assert_eq!(headers[PAGE_COUNT_HEADER], "1");

        let body = read_bytes(response).await;
        assert_eq!(body.as_ref(), pdf.as_slice());
    }

    #[tokio::test]
    async fn test_unparseable_pdf_omits_page_count() {
        let (app, _) = app_with(StubCompiler::returning(b"%PDF-not-really".to_vec()));
        let response = post_json(app, "/api/compile", json!({"latex": latex_of_len(400)})).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_TYPE], "application/pdf");
        assert!(response.headers().get(PAGE_COUNT_HEADER).is_none());
    }

    #[tokio::test]
    async fn test_source_is_sanitized_before_compiling() {
        let (app, compiler) = app_with(StubCompiler::returning(pdf_with_pages(1)));
        let latex = format!(
            "\\pdfminorversion=7\n{}\n\\input{{glyphtounicode}}\\pdfgentounicode=1",
            latex_of_len(250)
        );
        let response = post_json(app, "/api/compile", json!({ "latex": latex })).await;
        assert_eq!(response.status(), StatusCode::OK);

        let compiled = compiler.last_source().unwrap();
        assert!(!compiled.contains("\\pdfminorversion=7"));
        assert!(!compiled.contains("\\input{glyphtounicode}"));
        assert!(!compiled.contains("\\pdfgentounicode=1"));
        assert!(compiled.contains("\\documentclass{article}"));
    }

    #[tokio::test]
    async fn test_compiler_failure_is_500_with_diagnostics() {
        let (app, _) = app_with(StubCompiler::failing("! LaTeX Error: File `fontawesome5.sty' not found."));
        let response = post_json(app, "/api/compile", json!({"latex": latex_of_len(300)})).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let payload = read_json(response).await;
        assert_eq!(payload["error"]["code"], "COMPILE_ERROR");
        assert_eq!(
            payload["error"]["details"],
            "! LaTeX Error: File `fontawesome5.sty' not found."
        );
    }
}
