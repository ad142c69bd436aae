//! PDF text extraction
//!
//! Two strategies are available and one is chosen per deployment:
//! structural parsing with `pdf-extract`, or OCR of rendered page images with
//! `pdftoppm` and `tesseract`.

use anyhow::{Context, Result};
use async_trait::async_trait;
use imdg_utils::{ExtractionConfig, ExtractionMode};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::process::Command;
use tokio::sync::Semaphore;
use uuid::Uuid;

#[async_trait]
pub trait TextExtractor: Send + Sync {
    fn name(&self) -> &'static str;

    /// Full text of the PDF at `path`. Empty text is an error.
    async fn extract(&self, path: &Path) -> Result<String>;
}

pub fn extractor_from_config(config: &ExtractionConfig) -> Arc<dyn TextExtractor> {
    match config.mode {
        ExtractionMode::Parse => Arc::new(PdfTextParser::new()),
        ExtractionMode::Ocr => Arc::new(OcrExtractor::from_config(config)),
    }
}

/// Structural text parsing.
#[derive(Debug, Default, Clone)]
pub struct PdfTextParser;

impl PdfTextParser {
    pub fn new() -> Self {
        Self
    }

    pub fn extract_from_mem(data: &[u8]) -> Result<String> {
        let text = pdf_extract::extract_text_from_mem(data)
            .context("Failed to extract text from PDF")?;
        ensure_text(text)
    }
}

#[async_trait]
impl TextExtractor for PdfTextParser {
    fn name(&self) -> &'static str {
        "parse"
    }

    async fn extract(&self, path: &Path) -> Result<String> {
        let data = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;

        tokio::task::spawn_blocking(move || Self::extract_from_mem(&data))
            .await
            .context("PDF parsing task failed")?
    }
}

/// Page-image OCR.
///
/// Pages are rasterised at a fixed DPI, recognised concurrently and joined
/// with single spaces in page order. The result is lower-cased.
#[derive(Debug, Clone)]
pub struct OcrExtractor {
    pdftoppm: String,
    tesseract: String,
    language: String,
    dpi: u32,
    workers: usize,
}

impl OcrExtractor {
    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self {
            pdftoppm: config.pdftoppm_path.clone(),
            tesseract: config.tesseract_path.clone(),
            language: config.ocr_language.clone(),
            dpi: config.ocr_dpi,
            workers: config.ocr_workers.max(1),
        }
    }

    async fn render_pages(&self, pdf: &Path, out_dir: &Path) -> Result<Vec<PathBuf>> {
        let output = Command::new(&self.pdftoppm)
            .arg("-r")
            .arg(self.dpi.to_string())
            .arg("-png")
            .arg(pdf)
            .arg(out_dir.join("page"))
            .kill_on_drop(true)
            .output()
            .await
            .with_context(|| format!("Failed to run {}", self.pdftoppm))?;

        if !output.status.success() {
            anyhow::bail!(
                "{} exited with {}: {}",
                self.pdftoppm,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        let mut pages = Vec::new();
        let mut entries = tokio::fs::read_dir(out_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some("png") {
                pages.push(path);
            }
        }
        sort_pages(&mut pages);
        Ok(pages)
    }

    async fn recognize(&self, image: PathBuf, permits: Arc<Semaphore>) -> Result<String> {
        let _permit = permits.acquire_owned().await.context("OCR pool closed")?;

        let output = Command::new(&self.tesseract)
            .arg(&image)
            .arg("stdout")
            .arg("-l")
            .arg(&self.language)
            .kill_on_drop(true)
            .output()
            .await
            .with_context(|| format!("Failed to run {}", self.tesseract))?;

        if !output.status.success() {
            anyhow::bail!(
                "{} failed on {}: {}",
                self.tesseract,
                image.display(),
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    async fn ocr_in(&self, pdf: &Path, work_dir: &Path) -> Result<String> {
        let pages = self.render_pages(pdf, work_dir).await?;
        if pages.is_empty() {
            anyhow::bail!("PDF rendered to zero pages");
        }
        tracing::debug!(pages = pages.len(), "Running OCR on rendered pages");

        let permits = Arc::new(Semaphore::new(self.workers));
        let texts = futures::future::try_join_all(
            pages
                .into_iter()
                .map(|page| self.recognize(page, permits.clone())),
        )
        .await?;

        ensure_text(texts.join(" ").to_lowercase())
    }
}

#[async_trait]
impl TextExtractor for OcrExtractor {
    fn name(&self) -> &'static str {
        "ocr"
    }

    async fn extract(&self, path: &Path) -> Result<String> {
        let work_dir = std::env::temp_dir().join(format!("imdg-ocr-{}", Uuid::new_v4()));
        tokio::fs::create_dir_all(&work_dir).await?;

        let result = self.ocr_in(path, &work_dir).await;

        if let Err(e) = tokio::fs::remove_dir_all(&work_dir).await {
            tracing::warn!(error = %e, dir = %work_dir.display(), "Failed to clean OCR work directory");
        }
        result
    }
}

fn ensure_text(text: String) -> Result<String> {
    if text.trim().is_empty() {
        anyhow::bail!("No text could be extracted from the document");
    }
    Ok(text)
}

/// `page-2.png` before `page-10.png`.
fn sort_pages(pages: &mut [PathBuf]) {
    pages.sort_by_key(|p| {
        p.file_stem()
            .and_then(|s| s.to_str())
            .and_then(|s| s.rsplit('-').next())
            .and_then(|n| n.parse::<u32>().ok())
            .unwrap_or(u32::MAX)
    });
}
