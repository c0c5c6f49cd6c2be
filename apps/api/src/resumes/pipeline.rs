//! Render, typeset, persist.
//!
//! Every run gets a fresh `resume-<uuid>` stem, so concurrent requests never
//! write to the same files in the output directory.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::resume::ResumeData;
use crate::render::{render_resume, RenderOptions, Template};
use crate::typeset::Typesetter;

/// Kinds of artifact kept in the output directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Pdf,
    Tex,
}

impl ArtifactKind {
    pub fn from_file_name(name: &str) -> Option<Self> {
        let ext = Path::new(name).extension()?.to_str()?;
        match ext {
            "pdf" => Some(ArtifactKind::Pdf),
            "tex" => Some(ArtifactKind::Tex),
            _ => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ArtifactKind::Pdf => "pdf",
            ArtifactKind::Tex => "tex",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            ArtifactKind::Pdf => "application/pdf",
            ArtifactKind::Tex => "application/x-tex",
        }
    }
}

/// Files written by one successful run.
#[derive(Debug, Clone)]
pub struct GeneratedResume {
    pub stem: String,
    pub pdf_path: PathBuf,
    pub tex_path: PathBuf,
}

impl GeneratedResume {
    pub fn file_name(&self, kind: ArtifactKind) -> String {
        format!("{}.{}", self.stem, kind.extension())
    }
}

#[derive(Clone)]
pub struct ResumePipeline {
    template: Arc<Template>,
    options: RenderOptions,
    typesetter: Arc<dyn Typesetter>,
    output_dir: PathBuf,
    /// Age after which generated files are pruned; `None` keeps them until `/cleanup`.
    artifact_ttl: Option<Duration>,
}

impl ResumePipeline {
    pub fn new(
        template: Template,
        options: RenderOptions,
        typesetter: Arc<dyn Typesetter>,
        output_dir: PathBuf,
    ) -> Self {
        Self {
            template: Arc::new(template),
            options,
            typesetter,
            output_dir,
            artifact_ttl: None,
        }
    }

    pub fn with_artifact_ttl(mut self, ttl: Duration) -> Self {
        self.artifact_ttl = Some(ttl);
        self
    }

    pub fn template(&self) -> &Template {
        &self.template
    }

    pub fn typesetter_name(&self) -> &str {
        self.typesetter.name()
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Renders `data`, compiles it and stores both the source and the PDF.
    ///
    /// The `.tex` file is written before compiling so a failed run can be
    /// inspected.
    pub async fn run(&self, data: &ResumeData) -> Result<GeneratedResume, AppError> {
        let source = render_resume(data, &self.template, &self.options);

        let stem = format!("resume-{}", Uuid::new_v4());
        let tex_path = self.output_dir.join(format!("{stem}.tex"));
        let pdf_path = self.output_dir.join(format!("{stem}.pdf"));

        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .with_context(|| format!("Failed to create {}", self.output_dir.display()))?;
        if let Some(ttl) = self.artifact_ttl {
            self.prune_expired(ttl).await;
        }
        tokio::fs::write(&tex_path, &source)
            .await
            .with_context(|| format!("Failed to write {}", tex_path.display()))?;

        let pdf = self.typesetter.typeset(&source).await.map_err(|e| {
            warn!("Typesetting {stem} with {} failed", self.typesetter.name());
            AppError::Compile(e)
        })?;

        tokio::fs::write(&pdf_path, &pdf)
            .await
            .with_context(|| format!("Failed to write {}", pdf_path.display()))?;

        info!("Generated {stem} ({} bytes of PDF)", pdf.len());

        Ok(GeneratedResume {
            stem,
            pdf_path,
            tex_path,
        })
    }

    /// Reads a generated artifact by bare file name.
    ///
    /// Names containing path separators or `..`, or with an extension other
    /// than `.pdf`/`.tex`, are rejected before touching the filesystem.
    pub async fn read_artifact(&self, file_name: &str) -> Result<(Vec<u8>, ArtifactKind), AppError> {
        if file_name.is_empty()
            || file_name.contains('/')
            || file_name.contains('\\')
            || file_name.contains("..")
        {
            return Err(AppError::Validation(format!(
                "Invalid file name '{file_name}'"
            )));
        }
        let kind = ArtifactKind::from_file_name(file_name).ok_or_else(|| {
            AppError::Validation(format!("Only .pdf and .tex files can be downloaded, got '{file_name}'"))
        })?;

        let path = self.output_dir.join(file_name);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok((bytes, kind)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(AppError::NotFound(format!("File '{file_name}' not found")))
            }
            Err(e) => Err(anyhow::Error::new(e)
                .context(format!("Failed to read {}", path.display()))
                .into()),
        }
    }

    /// Removes generated `resume-*` files last modified more than `ttl` ago.
    ///
    /// Failures are logged and skipped; pruning never fails a run.
    async fn prune_expired(&self, ttl: Duration) -> usize {
        let mut entries = match tokio::fs::read_dir(&self.output_dir).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Could not list {} for pruning: {e}", self.output_dir.display());
                return 0;
            }
        };

        let mut pruned = 0;
        while let Ok(Some(entry)) = entries.next_entry().await {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if !name.starts_with("resume-") || ArtifactKind::from_file_name(&name).is_none() {
                continue;
            }
            let expired = match entry.metadata().await.and_then(|m| m.modified()) {
                Ok(modified) => modified.elapsed().map_or(false, |age| age >= ttl),
                Err(_) => false,
            };
            if !expired {
                continue;
            }
            match tokio::fs::remove_file(entry.path()).await {
                Ok(()) => pruned += 1,
                Err(e) => warn!("Could not prune {name}: {e}"),
            }
        }

        if pruned > 0 {
            info!("Pruned {pruned} expired files from {}", self.output_dir.display());
        }
        pruned
    }

    /// Deletes every regular file in the output directory. Returns how many went.
    pub async fn clear_output(&self) -> Result<usize, AppError> {
        let mut entries = match tokio::fs::read_dir(&self.output_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => {
                return Err(anyhow::Error::new(e)
                    .context(format!("Failed to list {}", self.output_dir.display()))
                    .into())
            }
        };

        let mut removed = 0;
        while let Some(entry) = entries.next_entry().await.context("Failed to list output dir")? {
            let path = entry.path();
            if !entry.file_type().await.context("Failed to stat output file")?.is_file() {
                continue;
            }
            match tokio::fs::remove_file(&path).await {
                Ok(()) => removed += 1,
                Err(e) => warn!("Could not remove {}: {e}", path.display()),
            }
        }

        info!("Removed {removed} files from {}", self.output_dir.display());
        Ok(removed)
    }
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use crate::typeset::testing::FakeTypesetter;

    pub const TEMPLATE: &str = include_str!("../../templates/resume.tex");

    /// Pipeline over the bundled template and a fake typesetter.
    pub fn pipeline_with(typesetter: Arc<FakeTypesetter>, output_dir: &Path) -> ResumePipeline {
        ResumePipeline::new(
            Template::parse(TEMPLATE).unwrap(),
            RenderOptions::default(),
            typesetter,
            output_dir.to_path_buf(),
        )
    }
}
