use std::collections::HashMap;

use axum::extract::multipart::MultipartError;
use axum::extract::{FromRequest, Multipart, Request};
use axum::http::{header, StatusCode};
use axum::Form;

use crate::error::ReaderError;
use crate::uploads::ImageSource;

use super::AppState;

/// Raw `/extract-text` form, accepted as `multipart/form-data` or
/// `application/x-www-form-urlencoded`.
///
/// A multipart `image` part wins over `imageData` when both are sent.
#[derive(Debug, Default)]
pub struct ExtractTextForm {
    pub source: Option<ImageSource>,
    pub lang: Option<String>,
    pub preprocess: Option<String>,
}

impl ExtractTextForm {
    /// `preprocess` is on unless the field is present and not `"true"`
    /// (case-insensitive).
    pub fn preprocess_enabled(&self) -> bool {
        self.preprocess
            .as_deref()
            .map_or(true, |value| value.eq_ignore_ascii_case("true"))
    }

    pub fn language_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.lang.as_deref().unwrap_or(default)
    }
}

impl FromRequest<AppState> for ExtractTextForm {
    type Rejection = ReaderError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let limit = state.config.server.max_content_length;

        // Reject oversized bodies up front so nothing is buffered or written.
        let declared_length = req
            .headers()
            .get(header::CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok());
        if declared_length.is_some_and(|len| len > limit as u64) {
            return Err(ReaderError::PayloadTooLarge { limit });
        }

        let content_type = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        if content_type.starts_with("multipart/form-data") {
            let multipart = Multipart::from_request(req, state).await.map_err(|e| {
                ReaderError::Input(format!("Invalid multipart body: {}", e.body_text()))
            })?;
            read_multipart(multipart, limit).await
        } else if content_type.starts_with("application/x-www-form-urlencoded") {
            let Form(mut fields) = Form::<HashMap<String, String>>::from_request(req, state)
                .await
                .map_err(|e| {
                    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
                        ReaderError::PayloadTooLarge { limit }
                    } else {
                        ReaderError::Input(format!("Invalid form body: {}", e.body_text()))
                    }
                })?;

            Ok(Self {
                source: fields.remove("imageData").map(ImageSource::DataUrl),
                lang: fields.remove("lang"),
                preprocess: fields.remove("preprocess"),
            })
        } else {
            Ok(Self::default())
        }
    }
}

async fn read_multipart(mut multipart: Multipart, limit: usize) -> Result<ExtractTextForm, ReaderError> {
    let mut file: Option<ImageSource> = None;
    let mut image_data: Option<String> = None;
    let mut form = ExtractTextForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, limit))?
    {
        let name = field.name().unwrap_or_default().to_string();

        match name.as_str() {
            // Only parts carrying a `filename` attribute count as uploads.
            "image" if file.is_none() && field.file_name().is_some() => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await.map_err(|e| multipart_error(e, limit))?;
                file = Some(ImageSource::File { filename, bytes });
            }
            "imageData" if image_data.is_none() => {
                image_data = Some(field.text().await.map_err(|e| multipart_error(e, limit))?);
            }
            "lang" if form.lang.is_none() => {
                form.lang = Some(field.text().await.map_err(|e| multipart_error(e, limit))?);
            }
            "preprocess" if form.preprocess.is_none() => {
                form.preprocess = Some(field.text().await.map_err(|e| multipart_error(e, limit))?);
            }
            _ => {}
        }
    }

    form.source = file.or(image_data.map(ImageSource::DataUrl));
    Ok(form)
}

fn multipart_error(err: MultipartError, limit: usize) -> ReaderError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ReaderError::PayloadTooLarge { limit }
    } else {
        ReaderError::Input(format!("Invalid multipart body: {}", err.body_text()))
    }
}
