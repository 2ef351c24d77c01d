//! Marp CLI subprocess renderer.

use async_trait::async_trait;
use slidesmith_error::SlidesmithResult;
use slidesmith_interface::{DeckRenderer, OutputFormat, RenderJob};
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// Renders deck source through the `marp` command-line tool.
///
/// The deck source is written next to the artifact as a Markdown file so the
/// exact renderer input survives for inspection.
#[derive(Debug, Clone)]
pub struct MarpRenderer {
    binary: PathBuf,
}

impl MarpRenderer {
    /// Create a renderer invoking a specific `marp` binary.
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Create a renderer from the environment.
    ///
    /// Loads `.env` if present; `MARP_PATH` overrides the binary, which
    /// otherwise resolves as `marp` on the `PATH`.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let binary = std::env::var("MARP_PATH").unwrap_or_else(|_| "marp".to_string());
        Self::new(binary)
    }

    fn format_args(format: OutputFormat) -> &'static [&'static str] {
        match format {
            OutputFormat::Pdf => &["--pdf"],
            OutputFormat::Html => &["--html"],
            OutputFormat::Pptx => &["--pptx"],
            // One image per slide; -o supplies the name stem.
            OutputFormat::Png => &["--images", "png"],
        }
    }
}

#[async_trait]
impl DeckRenderer for MarpRenderer {
    #[tracing::instrument(skip_all, fields(format = %job.format, output = %job.output_filename))]
    async fn render(&self, job: &RenderJob, output_dir: &Path) -> SlidesmithResult<PathBuf> {
        tokio::fs::create_dir_all(output_dir).await?;

        let stem = Path::new(&job.output_filename)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("deck");
        let source_path = output_dir.join(format!("{stem}.md"));
        tokio::fs::write(&source_path, &job.deck_source).await?;

        let output_path = output_dir.join(&job.output_filename);

        let mut command = Command::new(&self.binary);
        command
            .arg(&source_path)
            .args(Self::format_args(job.format))
            .arg("-o")
            .arg(&output_path);
        if let Some(theme) = &job.theme {
            command.arg("--theme").arg(theme);
        }

        tracing::info!(binary = %self.binary.display(), "Invoking marp");
        let output = command.output().await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::error!(status = %output.status, "marp failed: {}", stderr.trim());
            return Err(std::io::Error::other(format!(
                "marp exited with {}: {}",
                output.status,
                stderr.trim()
            ))
            .into());
        }

        tracing::info!(artifact = %output_path.display(), "Deck rendered");
        Ok(output_path)
    }
}
