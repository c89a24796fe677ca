//! Shared fixtures for handler tests: stub backends that count invocations,
//! request helpers, and small generated PDFs.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::{Body, Bytes},
    http::{header::CONTENT_TYPE, Request},
    response::Response,
    Router,
};
use lopdf::{dictionary, Document, Object};
use serde_json::{json, Value};
use tower::ServiceExt;

use crate::compile::{CompileError, LatexCompiler};
use crate::llm_client::{CompletionRequest, CompletionService, LlmError};
use crate::routes::build_router;
use crate::state::AppState;

enum CompletionOutcome {
    /// Answers in order; the last one repeats once the script runs out.
    Script(Vec<String>),
    MissingKey,
    Api { status: u16, message: String },
}

pub struct StubCompletion {
    outcome: CompletionOutcome,
    calls: AtomicUsize,
    last_system: Mutex<Option<String>>,
    user_prompts: Mutex<Vec<String>>,
}

impl StubCompletion {
    fn with(outcome: CompletionOutcome) -> Self {
        Self {
            outcome,
            calls: AtomicUsize::new(0),
            last_system: Mutex::new(None),
            user_prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn returning(text: String) -> Self {
        Self::scripted(vec![text])
    }

    pub fn scripted(answers: Vec<String>) -> Self {
        assert!(!answers.is_empty(), "script needs at least one answer");
        Self::with(CompletionOutcome::Script(answers))
    }

    pub fn missing_key() -> Self {
        Self::with(CompletionOutcome::MissingKey)
    }

    pub fn api_error(status: u16, message: &str) -> Self {
        Self::with(CompletionOutcome::Api {
            status,
            message: message.to_string(),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_system(&self) -> Option<String> {
        self.last_system.lock().unwrap().clone()
    }

    /// User messages received so far, in call order.
    pub fn user_prompts(&self) -> Vec<String> {
        self.user_prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionService for StubCompletion {
    async fn complete_json(&self, request: CompletionRequest<'_>) -> Result<String, LlmError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_system.lock().unwrap() = Some(request.system.to_string());
        self.user_prompts.lock().unwrap().push(request.user.to_string());
        match &self.outcome {
            CompletionOutcome::Script(answers) => Ok(answers[call.min(answers.len() - 1)].clone()),
            CompletionOutcome::MissingKey => Err(LlmError::MissingApiKey),
            CompletionOutcome::Api { status, message } => Err(LlmError::Api {
                status: *status,
                message: message.clone(),
            }),
        }
    }
}

pub struct StubCompiler {
    /// Results in call order; the last one repeats once the script runs out.
    outcomes: Vec<Result<Vec<u8>, String>>,
    calls: AtomicUsize,
    sources: Mutex<Vec<String>>,
}

impl StubCompiler {
    pub fn returning(pdf: Vec<u8>) -> Self {
        Self::scripted(vec![Ok(pdf)])
    }

    pub fn failing(stderr: &str) -> Self {
        Self::scripted(vec![Err(stderr.to_string())])
    }

    pub fn scripted(outcomes: Vec<Result<Vec<u8>, String>>) -> Self {
        assert!(!outcomes.is_empty(), "script needs at least one outcome");
        Self {
            outcomes,
            calls: AtomicUsize::new(0),
            sources: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_source(&self) -> Option<String> {
        self.sources.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl LatexCompiler for StubCompiler {
    async fn compile(&self, latex: &str) -> Result<Vec<u8>, CompileError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        self.sources.lock().unwrap().push(latex.to_string());
        match &self.outcomes[call.min(self.outcomes.len() - 1)] {
            Ok(pdf) => Ok(pdf.clone()),
            Err(stderr) => Err(CompileError::Failed {
                status: "exit status: 1".to_string(),
                stdout: String::new(),
                stderr: stderr.clone(),
            }),
        }
    }
}

/// Router wired to the given stubs; the stubs are returned for call inspection.
pub fn stub_app(
    llm: StubCompletion,
    compiler: StubCompiler,
) -> (Router, Arc<StubCompletion>, Arc<StubCompiler>) {
    let llm = Arc::new(llm);
    let compiler = Arc::new(compiler);
    let state = AppState {
        llm: llm.clone(),
        compiler: compiler.clone(),
    };
    (build_router(state), llm, compiler)
}

/// Router with the given completion stub and a compiler that returns a one-page PDF.
pub fn stub_state(llm: StubCompletion) -> (Router, Arc<StubCompletion>, Arc<StubCompiler>) {
    stub_app(llm, StubCompiler::returning(pdf_with_pages(1)))
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response {
    let request = Request::post(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn read_bytes(response: Response) -> Bytes {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
}

pub async fn read_json(response: Response) -> Value {
    serde_json::from_slice(&read_bytes(response).await).unwrap()
}

/// A model answer that satisfies the tailoring contract.
pub fn valid_tailor_output() -> String {
    json!({
        "keywords": ["RTOS", "CAN", "embedded C", "device drivers", "board bring-up"],
        "change_summary": [
            "Moved firmware experience above coursework",
            "Rewrote CAN driver bullet to lead with throughput",
            "Added RTOS to skills line"
        ],
        "tailored_latex": format!(
            "\\documentclass[letterpaper,11pt]{{article}}\n\\begin{{document}}\n{}\n\\end{{document}}",
            "Firmware engineer with CAN and RTOS experience. ".repeat(5)
        ),
    })
    .to_string()
}

/// Minimal valid PDF with `pages` empty US Letter pages.
pub fn pdf_with_pages(pages: usize) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let kids: Vec<Object> = (0..pages)
        .map(|_| {
            doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![0_i64.into(), 0_i64.into(), 612_i64.into(), 792_i64.into()],
            })
            .into()
        })
        .collect();

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => pages as i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf).unwrap();
    buf
}
