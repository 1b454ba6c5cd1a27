// Common test utilities for integration tests
#![allow(dead_code)]

use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, Once};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use axum::Router;
use image::{ColorType, DynamicImage, ImageFormat, Rgb, RgbImage};

use vireadme::api::{create_router, AppState};
use vireadme::config::{
    Config, LogFormat, LoggingConfig, OcrConfig, ServerConfig, UploadConfig,
    DEFAULT_MAX_CONTENT_LENGTH,
};
use vireadme::error::{ReaderError, Result};
use vireadme::ocr::OcrEngine;

static INIT: Once = Once::new();

/// Initialize tracing subscriber once for tests
pub fn init_test_logger() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    });
}

/// What the fake engine saw when it was asked to recognize a file.
#[derive(Debug, Clone)]
pub struct RecognizeCall {
    pub path: PathBuf,
    pub language: String,
    pub existed: bool,
    pub color: Option<ColorType>,
}

/// Scripted stand-in for Tesseract.
pub struct FakeEngine {
    output: std::result::Result<String, String>,
    languages: std::result::Result<Vec<String>, String>,
    calls: Mutex<Vec<RecognizeCall>>,
}

impl FakeEngine {
    pub fn returning(text: &str) -> Self {
        Self {
            output: Ok(text.to_string()),
            languages: Ok(vec!["eng".to_string()]),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            output: Err(message.to_string()),
            ..Self::returning("")
        }
    }

    pub fn with_languages(mut self, codes: &[&str]) -> Self {
        self.languages = Ok(codes.iter().map(|c| c.to_string()).collect());
        self
    }

    pub fn without_language_listing(mut self, message: &str) -> Self {
        self.languages = Err(message.to_string());
        self
    }

    pub fn calls(&self) -> Vec<RecognizeCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl OcrEngine for FakeEngine {
    async fn recognize(&self, image_path: &Path, language: &str) -> Result<String> {
        let existed = image_path.exists();
        let color = image::open(image_path).ok().map(|img| img.color());
        self.calls.lock().unwrap().push(RecognizeCall {
            path: image_path.to_path_buf(),
            language: language.to_string(),
            existed,
            color,
        });

        self.output
            .clone()
            .map(|text| text.trim().to_string())
            .map_err(ReaderError::Ocr)
    }

    async fn installed_languages(&self) -> Result<Vec<String>> {
        self.languages.clone().map_err(ReaderError::Ocr)
    }
}

pub fn test_config(upload_dir: &Path) -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 5000,
            max_content_length: DEFAULT_MAX_CONTENT_LENGTH,
        },
        uploads: UploadConfig {
            folder: upload_dir.to_path_buf(),
            cleanup_delay_secs: 300,
        },
        ocr: OcrConfig {
            tessdata_prefix: None,
            default_language: "eng".to_string(),
            timeout_secs: 60,
        },
        logging: LoggingConfig {
            format: LogFormat::Pretty,
        },
    }
}

pub fn test_app(config: Config, engine: Arc<FakeEngine>) -> (Router, AppState) {
    init_test_logger();
    let state = AppState::new(config, engine);
    (create_router(state.clone()), state)
}

pub fn sample_png(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x * 7 % 256) as u8, (y * 13 % 256) as u8, 180])
    });
    let mut out = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
        .unwrap();
    out
}

pub fn sample_jpeg(width: u32, height: u32) -> Vec<u8> {
    let img = image::load_from_memory(&sample_png(width, height)).unwrap();
    let mut out = Vec::new();
    img.write_to(&mut Cursor::new(&mut out), ImageFormat::Jpeg)
        .unwrap();
    out
}

pub fn files_in(dir: &Path) -> Vec<PathBuf> {
    std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .collect()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Minimal `multipart/form-data` encoder.
pub struct MultipartBody {
    boundary: String,
    body: Vec<u8>,
}

impl MultipartBody {
    pub fn new() -> Self {
        Self {
            boundary: "----vireadme-test-boundary".to_string(),
            body: Vec::new(),
        }
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                self.boundary, name, value
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, filename: &str, content_type: &str, data: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                self.boundary, name, filename, content_type
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(data);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    pub fn into_request(mut self, uri: &str) -> Request<Body> {
        self.body
            .extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());
        let len = self.body.len();
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                "content-type",
                format!("multipart/form-data; boundary={}", self.boundary),
            )
            .header("content-length", len.to_string())
            .body(Body::from(self.body))
            .unwrap()
    }

    /// Same request without a `Content-Length` header, as with chunked uploads.
    pub fn into_streaming_request(self, uri: &str) -> Request<Body> {
        let mut request = self.into_request(uri);
        request.headers_mut().remove("content-length");
        request
    }
}

/// Percent-encode a base64 payload for an urlencoded form body.
pub fn form_encode(value: &str) -> String {
    value
        .replace('%', "%25")
        .replace('+', "%2B")
        .replace('/', "%2F")
        .replace('=', "%3D")
        .replace(',', "%2C")
        .replace(';', "%3B")
        .replace(':', "%3A")
}
