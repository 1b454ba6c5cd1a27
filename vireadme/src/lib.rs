//! VI-ReadMe: a small OCR web service for reading printed text aloud.
//!
//! The browser sends a photo (file upload or camera data URL), the service
//! extracts its text with Tesseract, and the page speaks the result with the
//! Web Speech API.

pub mod api;
pub mod config;
pub mod error;
pub mod ocr;
pub mod uploads;
