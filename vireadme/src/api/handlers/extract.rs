use std::path::Path;

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use tracing::{info, warn};

use crate::api::extractors::ExtractTextForm;
use crate::api::state::AppState;
use crate::error::{ReaderError, Result};
use crate::ocr;
use crate::uploads;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct ExtractTextResponse {
    pub success: bool,
    /// Recognized text, trimmed. Empty when the image contains no text.
    pub text: String,
    pub message: String,
}

impl ExtractTextResponse {
    pub fn from_text(text: String) -> Self {
        let message = if text.is_empty() {
            "No text found in image"
        } else {
            "Text extracted successfully"
        };

        Self {
            success: true,
            text,
            message: message.to_string(),
        }
    }
}

/// `POST /extract-text`
///
/// Accepts a multipart `image` file or an `imageData` data URL, plus optional
/// `lang` (default `eng`) and `preprocess` (default `true`) fields. The temp
/// file is deleted before the response is sent, whether OCR succeeded or not.
#[utoipa::path(
    post,
    path = "/extract-text",
    tag = "ocr",
    request_body(content_type = "multipart/form-data", content = String, description = "`image` file or `imageData` data URL, optional `lang` and `preprocess`"),
    responses(
        (status = 200, description = "Text extracted (possibly empty)", body = ExtractTextResponse),
        (status = 400, description = "Missing or invalid image", body = crate::error::ErrorBody),
        (status = 413, description = "Request body too large", body = crate::error::ErrorBody),
        (status = 500, description = "OCR engine failure", body = crate::error::ErrorBody),
    )
)]
pub async fn extract_text(
    State(state): State<AppState>,
    form: ExtractTextForm,
) -> Result<Json<ExtractTextResponse>> {
    let preprocess = form.preprocess_enabled();
    let lang = form
        .language_or(&state.config.ocr.default_language)
        .to_string();
    let source = form.source.ok_or_else(ReaderError::no_image_provided)?;

    let upload = uploads::persist(source, &state.uploads).await?;

    let outcome = recognize(&state, upload.path(), &lang, preprocess).await;
    upload.release().await;

    if let Err(e) = &outcome {
        warn!(lang = %lang, "Text extraction failed: {}", e);
    }
    let text = outcome?;
    info!(lang = %lang, preprocess, chars = text.chars().count(), "Text extracted");

    Ok(Json(ExtractTextResponse::from_text(text)))
}

/// Preprocess (optionally) and run OCR on the stored upload.
async fn recognize(state: &AppState, path: &Path, lang: &str, preprocess: bool) -> Result<String> {
    if preprocess {
        let target = path.to_path_buf();
        tokio::task::spawn_blocking(move || ocr::preprocess_file(&target))
            .await
            .map_err(|e| ReaderError::Internal(format!("Preprocessing task failed: {e}")))??;
    }

    state.ocr.recognize(path, lang).await
}
