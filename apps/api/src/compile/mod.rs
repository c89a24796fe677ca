// LaTeX → PDF compilation through an external engine.
// Every request gets its own scratch directory, removed when the request ends.

use async_trait::async_trait;
use thiserror::Error;

pub mod handlers;
pub mod pages;
pub mod sanitize;
pub mod tectonic;

pub use tectonic::TectonicCompiler;

/// Minimum LaTeX source length, in characters, accepted by the compile endpoint.
pub const MIN_LATEX_CHARS: usize = 200;

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("failed to start compiler '{binary}': {source}")]
    Spawn {
        binary: String,
        #[source]
        source: std::io::Error,
    },

    #[error("compiler timed out after {secs}s")]
    Timeout { secs: u64 },

    #[error("compiler exited with {status}")]
    Failed {
        status: String,
        stdout: String,
        stderr: String,
    },

    #[error("compiler output exceeded {limit} bytes")]
    OutputLimit { limit: usize },

    #[error("compiler finished but produced no PDF")]
    MissingOutput { stdout: String, stderr: String },

    #[error("scratch I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CompileError {
    /// Best available diagnostic text: stderr, then stdout, then the error itself.
    pub fn diagnostics(&self) -> String {
        let streams = match self {
            CompileError::Failed { stdout, stderr, .. }
            | CompileError::MissingOutput { stdout, stderr } => Some((stdout, stderr)),
            _ => None,
        };

        if let Some((stdout, stderr)) = streams {
            if !stderr.trim().is_empty() {
                return stderr.clone();
            }
            if !stdout.trim().is_empty() {
                return stdout.clone();
            }
        }
        self.to_string()
    }
}

/// LaTeX engine backend. Receives already-sanitized source and returns PDF bytes.
#[async_trait]
pub trait LatexCompiler: Send + Sync {
    async fn compile(&self, latex: &str) -> Result<Vec<u8>, CompileError>;
}
