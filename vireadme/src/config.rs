use serde::Deserialize;
use std::env;
use std::path::PathBuf;

/// Default request body limit (16 MiB).
pub const DEFAULT_MAX_CONTENT_LENGTH: usize = 16 * 1024 * 1024;

fn parse_env_or<T: std::str::FromStr>(var: &str, default: T) -> T
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Using default.", val, var, e);
                default
            }
        },
        Err(_) => default,
    }
}

fn non_empty_env(var: &str) -> Option<String> {
    env::var(var).ok().filter(|v| !v.trim().is_empty())
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub uploads: UploadConfig,
    pub ocr: OcrConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Requests with a larger body are rejected before any file is written.
    pub max_content_length: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    pub folder: PathBuf,
    /// Delay before the fallback deletion of a temp file.
    pub cleanup_delay_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OcrConfig {
    /// Directory holding `*.traineddata`; `None` lets Tesseract use its built-in path.
    pub tessdata_prefix: Option<String>,
    pub default_language: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format '{other}' (expected pretty or json)")),
        }
    }
}

impl LogFormat {
    /// Read `LOG_FORMAT` on its own, so logging can be set up before the
    /// rest of the config is parsed.
    pub fn from_env() -> Self {
        parse_env_or("LOG_FORMAT", LogFormat::Pretty)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_env_or("PORT", 5000),
                max_content_length: parse_env_or(
                    "MAX_CONTENT_LENGTH",
                    DEFAULT_MAX_CONTENT_LENGTH,
                ),
            },
            uploads: UploadConfig {
                folder: non_empty_env("UPLOAD_FOLDER")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from("uploads")),
                cleanup_delay_secs: parse_env_or("CLEANUP_DELAY_SECS", 300),
            },
            ocr: OcrConfig {
                tessdata_prefix: non_empty_env("TESSDATA_PREFIX"),
                default_language: non_empty_env("OCR_DEFAULT_LANGUAGE")
                    .unwrap_or_else(|| "eng".to_string()),
                timeout_secs: parse_env_or("OCR_TIMEOUT", 60),
            },
            logging: LoggingConfig {
                format: LogFormat::from_env(),
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::default()
    }
}
