//! OCR (Optical Character Recognition) Module
//!
//! Text extraction is delegated to an external engine behind the [`OcrEngine`]
//! trait. The production engine is Tesseract via `leptess`; tests swap in a
//! fake engine.
//!
//! # Engine configuration
//!
//! Every recognition runs with the same fixed flags:
//! - OEM 3: LSTM-based recognition (Tesseract's default engine mode)
//! - PSM 3: fully automatic page segmentation
//!
//! The language code comes from the request and is handed to the engine
//! without validation; unsupported codes fail inside the engine call.
//!
//! # Preprocessing
//!
//! [`preprocess_file`] converts an image to grayscale and doubles its
//! contrast, overwriting the file in place before recognition.

mod engine;
pub mod languages;
mod preprocessing;
mod tesseract;

pub use engine::OcrEngine;
pub use languages::{describe_languages, fallback_languages, language_name, LanguageInfo};
pub use preprocessing::{enhance_contrast, preprocess_file, preprocess_image, CONTRAST_FACTOR};
pub use tesseract::{parse_list_langs, TesseractEngine, ENGINE_MODE, PAGE_SEG_MODE};
