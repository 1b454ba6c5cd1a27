use std::path::Path;

use async_trait::async_trait;

use crate::error::Result;

/// External OCR collaborator.
///
/// Implementations must return `ReaderError::Ocr` for engine failures so the
/// HTTP layer can surface them as 500s with the engine's message.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    /// Recognize the image stored at `image_path` and return the trimmed text.
    ///
    /// An empty string means no text was found and is not an error.
    async fn recognize(&self, image_path: &Path, language: &str) -> Result<String>;

    /// Language codes the engine has data for.
    async fn installed_languages(&self) -> Result<Vec<String>>;
}
