//! Tectonic subprocess driver.
//!
//! Each compile writes `resume.tex` into a fresh `latex-*` scratch directory, runs
//! `tectonic -X compile --untrusted resume.tex` there and reads back `resume.pdf`.
//! `--untrusted` keeps shell-escape and other insecure engine features off.
//! The scratch directory is a `TempDir` guard, so it is removed on every return path.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tracing::debug;

use crate::compile::{CompileError, LatexCompiler};
use crate::config::Config;

const SOURCE_FILE: &str = "resume.tex";
const OUTPUT_FILE: &str = "resume.pdf";
const SCRATCH_PREFIX: &str = "latex-";

#[derive(Debug, Clone)]
pub struct TectonicCompiler {
    binary: String,
    timeout: Duration,
    max_output_bytes: usize,
}

struct CapturedOutput {
    stdout: String,
    stderr: String,
}

impl TectonicCompiler {
    pub fn new(binary: impl Into<String>, timeout: Duration, max_output_bytes: usize) -> Self {
        Self {
            binary: binary.into(),
            timeout,
            max_output_bytes,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.tectonic_bin.clone(),
            config.compile_timeout,
            config.compile_max_output_bytes,
        )
    }

    pub fn binary(&self) -> &str {
        &self.binary
    }

    async fn run(&self, workdir: &Path) -> Result<CapturedOutput, CompileError> {
        let mut child = Command::new(&self.binary)
            .args(["-X", "compile", "--untrusted", SOURCE_FILE])
            .current_dir(workdir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| CompileError::Spawn {
                binary: self.binary.clone(),
                source,
            })?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let limit = self.max_output_bytes;

        // Owns the child: dropping this future on timeout kills the process.
        let run = async move {
            tokio::try_join!(
                read_capped(stdout, limit),
                read_capped(stderr, limit),
                async { child.wait().await.map_err(CompileError::from) },
            )
        };

        let (stdout, stderr, status) = tokio::time::timeout(self.timeout, run)
            .await
            .map_err(|_| CompileError::Timeout {
                secs: self.timeout.as_secs(),
            })??;

        if !status.success() {
            return Err(CompileError::Failed {
                status: status.to_string(),
                stdout,
                stderr,
            });
        }

        Ok(CapturedOutput { stdout, stderr })
    }
}

#[async_trait]
impl LatexCompiler for TectonicCompiler {
    async fn compile(&self, latex: &str) -> Result<Vec<u8>, CompileError> {
        let scratch = tempfile::Builder::new()
            .prefix(SCRATCH_PREFIX)
            .tempdir()?;
        tokio::fs::write(scratch.path().join(SOURCE_FILE), latex).await?;

        debug!(dir = %scratch.path().display(), "Running {}", self.binary);
        let output = self.run(scratch.path()).await?;

        match tokio::fs::read(scratch.path().join(OUTPUT_FILE)).await {
            Ok(pdf) => Ok(pdf),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(CompileError::MissingOutput {
                stdout: output.stdout,
                stderr: output.stderr,
            }),
            Err(e) => Err(e.into()),
        }
    }
}

/// Reads a child stream to the end, failing once it exceeds `limit` bytes.
async fn read_capped<R>(stream: Option<R>, limit: usize) -> Result<String, CompileError>
where
    R: AsyncRead + Unpin,
{
    let Some(stream) = stream else {
        return Ok(String::new());
    };

    let mut buf = Vec::new();
    let mut capped = stream.take(limit as u64 + 1);
    capped.read_to_end(&mut buf).await?;

    if buf.len() > limit {
        return Err(CompileError::OutputLimit { limit });
    }
    Ok(String::from_utf8_lossy(&buf).into_owned())
}
