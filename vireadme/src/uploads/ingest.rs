use std::io::Cursor;

use axum::body::Bytes;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine as _;
use image::{DynamicImage, ImageFormat};
use tracing::{debug, info};

use crate::error::{ReaderError, Result};

use super::filename::{camera_filename, upload_filename};
use super::tracker::{TempUpload, UploadTracker};

/// Standard alphabet, padding optional: browsers and hand-rolled clients
/// disagree on whether to pad camera captures.
const LENIENT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// The two input shapes `/extract-text` accepts.
#[derive(Debug, Clone)]
pub enum ImageSource {
    /// Multipart `image` part, stored byte-for-byte.
    File { filename: String, bytes: Bytes },
    /// `imageData` form field: a data URL or bare base64.
    DataUrl(String),
}

/// Drop everything up to and including the first comma, if any.
///
/// `data:image/jpeg;base64,/9j/4AAQ...` becomes `/9j/4AAQ...`; bare base64 is
/// returned unchanged.
pub fn strip_data_url_prefix(data: &str) -> &str {
    match data.split_once(',') {
        Some((_, payload)) => payload,
        None => data,
    }
}

/// Decode a data URL or bare base64 string into raw bytes.
pub fn decode_data_url(data: &str) -> Result<Vec<u8>> {
    let payload: String = strip_data_url_prefix(data)
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();

    LENIENT_BASE64.decode(payload.as_bytes()).map_err(|e| {
        debug!("Invalid base64 image payload: {}", e);
        ReaderError::invalid_image_data()
    })
}

/// Decode a camera capture and re-encode it as JPEG.
///
/// JPEG has no alpha channel, so the image is flattened to RGB first.
pub fn camera_capture_to_jpeg(data: &str) -> Result<Vec<u8>> {
    let raw = decode_data_url(data)?;
    let img = image::load_from_memory(&raw).map_err(|e| {
        debug!("Undecodable camera image: {}", e);
        ReaderError::invalid_image_data()
    })?;

    let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
    let mut jpeg = Vec::new();
    rgb.write_to(&mut Cursor::new(&mut jpeg), ImageFormat::Jpeg)?;
    Ok(jpeg)
}

/// Write exactly one temp file for `source` and hand back its scoped handle.
///
/// Nothing touches the disk until the input has been validated; if the write
/// itself fails the partial file is released before the error is returned.
pub async fn persist(source: ImageSource, tracker: &UploadTracker) -> Result<TempUpload> {
    let (filename, bytes) = match source {
        ImageSource::File { filename, bytes } => {
            if filename.is_empty() {
                return Err(ReaderError::no_file_selected());
            }
            (upload_filename(&filename), bytes.to_vec())
        }
        ImageSource::DataUrl(data) => {
            let jpeg = tokio::task::spawn_blocking(move || camera_capture_to_jpeg(&data))
                .await
                .map_err(|e| ReaderError::Internal(format!("Image decoding task failed: {e}")))??;
            (camera_filename(), jpeg)
        }
    };

    let path = tracker.upload_dir().join(filename);
    let upload = tracker.track(path);

    if let Err(e) = tokio::fs::write(upload.path(), &bytes).await {
        upload.release().await;
        return Err(e.into());
    }

    info!(path = %upload.path().display(), size = bytes.len(), "Stored upload");
    Ok(upload)
}
