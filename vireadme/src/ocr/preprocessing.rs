use std::path::Path;

use image::{DynamicImage, GrayImage, ImageError, ImageFormat, ImageReader};
use tracing::debug;

use crate::error::{ReaderError, Result};

/// Fixed contrast multiplier applied before OCR.
pub const CONTRAST_FACTOR: f32 = 2.0;

/// Preprocess an image for OCR.
///
/// 1. Converts to single-channel grayscale
/// 2. Scales contrast around the mean luminance by [`CONTRAST_FACTOR`]
///
/// Pure and deterministic: the same input always yields the same output.
pub fn preprocess_image(img: &DynamicImage) -> DynamicImage {
    let gray = img.to_luma8();
    DynamicImage::ImageLuma8(enhance_contrast(&gray, CONTRAST_FACTOR))
}

/// Decode the image at `path`, preprocess it and overwrite the file in place.
///
/// The file keeps the format implied by its extension; when that format has no
/// encoder (or cannot hold 8-bit grayscale) the result is written as PNG.
pub fn preprocess_file(path: &Path) -> Result<()> {
    let img = ImageReader::open(path)?
        .with_guessed_format()?
        .decode()
        .map_err(|e| {
            debug!(path = %path.display(), "Failed to decode image: {}", e);
            ReaderError::invalid_image_data()
        })?;

    let processed = preprocess_image(&img);

    let format = ImageFormat::from_path(path)
        .ok()
        .filter(|f| f.writing_enabled())
        .unwrap_or(ImageFormat::Png);

    match processed.save_with_format(path, format) {
        Ok(()) => {}
        Err(ImageError::Unsupported(e)) if format != ImageFormat::Png => {
            debug!(?format, "Encoder rejected grayscale output ({}), writing PNG", e);
            processed.save_with_format(path, ImageFormat::Png)?;
        }
        Err(e) => return Err(e.into()),
    }

    debug!(path = %path.display(), "Preprocessed image in place");
    Ok(())
}

/// Contrast enhancement around the mean gray level.
///
/// Each pixel becomes `mean + factor * (pixel - mean)`, clamped to `0..=255`,
/// where `mean` is the image's average luminance rounded to the nearest
/// integer. A factor of 1.0 is the identity; a flat image stays flat.
pub fn enhance_contrast(gray: &GrayImage, factor: f32) -> GrayImage {
    let count = u64::from(gray.width()) * u64::from(gray.height());
    if count == 0 {
        return gray.clone();
    }

    let sum: u64 = gray.pixels().map(|p| u64::from(p[0])).sum();
    let mean = (sum as f64 / count as f64 + 0.5) as f32;
    let mean = mean.floor();

    let mut out = gray.clone();
    for pixel in out.pixels_mut() {
        let value = mean + factor * (f32::from(pixel[0]) - mean);
        pixel[0] = value.clamp(0.0, 255.0) as u8;
    }
    out
}
