use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use leptess::{LepTess, Variable};
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::config::OcrConfig;
use crate::error::{ReaderError, Result};

use super::engine::OcrEngine;

/// `--oem 3`: LSTM recognition. This is what `LepTess::new` initializes with.
pub const ENGINE_MODE: u32 = 3;

/// `--psm 3`: fully automatic page segmentation, no OSD.
pub const PAGE_SEG_MODE: u32 = 3;

/// Local Tesseract engine via leptess.
///
/// A fresh `LepTess` handle is created per call because the language is a
/// per-request parameter and Tesseract binds languages at init time.
#[derive(Debug, Clone)]
pub struct TesseractEngine {
    tessdata_prefix: Option<String>,
    timeout: Duration,
}

impl TesseractEngine {
    pub fn new(config: &OcrConfig) -> Self {
        Self {
            tessdata_prefix: config.tessdata_prefix.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    fn recognize_blocking(
        tessdata_prefix: Option<&str>,
        image_path: &Path,
        language: &str,
    ) -> Result<String> {
        let mut lt = LepTess::new(tessdata_prefix, language).map_err(|e| {
            ReaderError::Ocr(format!(
                "Failed to initialize Tesseract with language '{language}': {e}"
            ))
        })?;

        lt.set_variable(Variable::TesseditPagesegMode, &PAGE_SEG_MODE.to_string())
            .map_err(|e| ReaderError::Ocr(format!("Failed to set page segmentation mode: {e}")))?;

        lt.set_image(image_path)
            .map_err(|e| ReaderError::Ocr(format!("Failed to load image for OCR: {e}")))?;

        let text = lt
            .get_utf8_text()
            .map_err(|e| ReaderError::Ocr(format!("Failed to extract text: {e}")))?;

        Ok(text.trim().to_string())
    }
}

#[async_trait]
impl OcrEngine for TesseractEngine {
    async fn recognize(&self, image_path: &Path, language: &str) -> Result<String> {
        let path: PathBuf = image_path.to_path_buf();
        let lang = language.to_string();
        let prefix = self.tessdata_prefix.clone();

        debug!(path = %path.display(), lang = %lang, oem = ENGINE_MODE, psm = PAGE_SEG_MODE, "Running Tesseract");

        run_with_timeout(self.timeout, move || {
            Self::recognize_blocking(prefix.as_deref(), &path, &lang)
        })
        .await
    }

    async fn installed_languages(&self) -> Result<Vec<String>> {
        let mut command = Command::new("tesseract");
        if let Some(prefix) = &self.tessdata_prefix {
            command.arg("--tessdata-dir").arg(prefix);
        }
        command.arg("--list-langs");

        let output = command
            .output()
            .await
            .map_err(|e| ReaderError::Ocr(format!("Cannot run tesseract: {e}")))?;

        if !output.status.success() {
            return Err(ReaderError::Ocr(format!(
                "tesseract --list-langs failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        // Older releases print the listing on stderr.
        let listing = if output.stdout.is_empty() {
            String::from_utf8_lossy(&output.stderr).into_owned()
        } else {
            String::from_utf8_lossy(&output.stdout).into_owned()
        };

        let languages = parse_list_langs(&listing);
        info!(count = languages.len(), "Discovered installed Tesseract languages");
        Ok(languages)
    }
}

/// Run a blocking OCR job on the blocking pool with a deadline.
///
/// A blocking thread cannot be interrupted: on timeout the caller gets an
/// error immediately and the job is left to finish in the background. Its
/// input file may be deleted meanwhile; Tesseract has normally loaded the
/// image by then, and an unlinked file stays readable through open handles.
async fn run_with_timeout<F>(timeout: Duration, job: F) -> Result<String>
where
    F: FnOnce() -> Result<String> + Send + 'static,
{
    let mut task = tokio::task::spawn_blocking(job);

    match tokio::time::timeout(timeout, &mut task).await {
        Ok(joined) => joined.map_err(|e| ReaderError::Ocr(format!("OCR task panicked: {e}")))?,
        Err(_) => {
            warn!(timeout_ms = timeout.as_millis() as u64, "OCR timed out, detaching job");
            tokio::spawn(async move {
                if task.await.is_ok() {
                    debug!("Detached OCR job finished");
                }
            });
            Err(ReaderError::Ocr(format!(
                "OCR operation timed out after {} seconds",
                timeout.as_secs()
            )))
        }
    }
}

/// Parse the output of `tesseract --list-langs`.
///
/// ```text
/// List of available languages in "/usr/share/tessdata/" (3):
/// eng
/// osd
/// spa
/// ```
pub fn parse_list_langs(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| !line.starts_with("List of available languages"))
        .filter(|line| !line.contains(char::is_whitespace))
        .map(str::to_string)
        .collect()
}
