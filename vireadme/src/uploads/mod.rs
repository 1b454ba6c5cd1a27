//! Temp-file ingestion and lifecycle.
//!
//! Every `/extract-text` request writes exactly one file under the upload
//! directory:
//!
//! - [`ingest`] turns a multipart file or a base64 data URL into that file
//! - [`tracker`] records it and guarantees deletion, immediately after OCR and
//!   again after a fixed delay as a safety net
//!
//! ```text
//! Created ──(OCR done / failed)──▶ Deleted
//!    └──────(fallback timer)──────▶ Deleted   (no-op if already deleted)
//! ```

pub mod filename;
pub mod ingest;
pub mod tracker;

pub use ingest::{decode_data_url, persist, strip_data_url_prefix, ImageSource};
pub use tracker::{TempUpload, UploadRecord, UploadTracker};
