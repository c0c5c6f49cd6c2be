//! Typesetting: turns rendered LaTeX into PDF bytes.
//!
//! Default: `LatexTypesetter`, which runs `pdflatex` as a subprocess inside a
//! throwaway directory, so auxiliary files (`.aux`, `.log`, `.out`, ...) never
//! outlive a job and concurrent jobs never share a working directory.
//!
//! `ResumePipeline` holds an `Arc<dyn Typesetter>`; tests swap in a fake.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, warn};

/// Job name passed to the compiler; output files are `resume.*`.
const JOB_NAME: &str = "resume";

/// Lines of compiler log kept in error messages.
const LOG_TAIL_LINES: usize = 20;

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("I/O error during typesetting: {0}")]
    Io(#[from] std::io::Error),

    #[error("Typesetting tool '{0}' is not installed or not on PATH")]
    NotInstalled(String),

    #[error("Typesetting timed out after {0}s")]
    TimedOut(u64),

    #[error("LaTeX compilation failed with exit code {code:?}: {log_tail}")]
    Failed { code: Option<i32>, log_tail: String },

    #[error("Typesetting finished but produced no PDF")]
    MissingOutput,
}

/// Compiles a LaTeX document to PDF.
#[async_trait]
pub trait Typesetter: Send + Sync {
    async fn typeset(&self, source: &str) -> Result<Vec<u8>, CompileError>;

    /// Short label for logs and the health endpoint.
    fn name(&self) -> &str;
}

/// `pdflatex` (or a compatible binary) invoked once per document.
pub struct LatexTypesetter {
    bin: String,
    timeout: Duration,
}

impl LatexTypesetter {
    pub fn new(bin: impl Into<String>, timeout: Duration) -> Self {
        Self {
            bin: bin.into(),
            timeout,
        }
    }

    async fn run(&self, workdir: &Path) -> Result<std::process::Output, CompileError> {
        let mut command = Command::new(&self.bin);
        command
            .arg("-interaction=nonstopmode")
            .arg("-halt-on-error")
            .arg(format!("-jobname={JOB_NAME}"))
            .arg(format!("-output-directory={}", workdir.display()))
            .arg(format!("{JOB_NAME}.tex"))
            .current_dir(workdir)
            .stdin(Stdio::null())
            .kill_on_drop(true);

        debug!("Running {} in {}", self.bin, workdir.display());

        match tokio::time::timeout(self.timeout, command.output()).await {
            Err(_) => Err(CompileError::TimedOut(self.timeout.as_secs())),
            Ok(Err(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(CompileError::NotInstalled(self.bin.clone()))
            }
            Ok(result) => Ok(result?),
        }
    }
}

#[async_trait]
impl Typesetter for LatexTypesetter {
    async fn typeset(&self, source: &str) -> Result<Vec<u8>, CompileError> {
        let workdir = tempfile::tempdir()?;
        tokio::fs::write(workdir.path().join(format!("{JOB_NAME}.tex")), source).await?;

        let output = self.run(workdir.path()).await?;

        if !output.status.success() {
            // pdflatex reports errors on stdout and in the .log file, rarely on stderr.
            let log = tokio::fs::read_to_string(workdir.path().join(format!("{JOB_NAME}.log")))
                .await
                .unwrap_or_else(|_| String::from_utf8_lossy(&output.stdout).into_owned());
            let log_tail = tail(&log, LOG_TAIL_LINES);
            warn!("{} exited with {:?}", self.bin, output.status.code());
            return Err(CompileError::Failed {
                code: output.status.code(),
                log_tail,
            });
        }

        match tokio::fs::read(workdir.path().join(format!("{JOB_NAME}.pdf"))).await {
            Ok(pdf) => Ok(pdf),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(CompileError::MissingOutput),
            Err(e) => Err(e.into()),
        }
    }

    fn name(&self) -> &str {
        &self.bin
    }
}

fn tail(text: &str, lines: usize) -> String {
    let all: Vec<&str> = text.lines().collect();
    all[all.len().saturating_sub(lines)..].join("\n")
}
