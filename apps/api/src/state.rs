use std::sync::Arc;

use crate::compile::LatexCompiler;
use crate::llm_client::CompletionService;

/// Shared application state injected into all route handlers via Axum extractors.
/// Holds only stateless backends: nothing here is mutated per request.
#[derive(Clone)]
pub struct AppState {
    /// Completion backend. Default: `OpenAiClient`.
    pub llm: Arc<dyn CompletionService>,
    /// LaTeX engine. Default: `TectonicCompiler`.
    pub compiler: Arc<dyn LatexCompiler>,
}
