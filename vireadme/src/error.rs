use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReaderError {
    /// Missing or malformed image input. Rendered verbatim to the client.
    #[error("{0}")]
    Input(String),

    #[error("File too large: request body exceeds {limit} bytes")]
    PayloadTooLarge { limit: usize },

    /// OCR engine failure, including unsupported language codes.
    #[error("{0}")]
    Ocr(String),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ReaderError {
    pub fn no_image_provided() -> Self {
        Self::Input("No image provided".to_string())
    }

    pub fn no_file_selected() -> Self {
        Self::Input("No file selected".to_string())
    }

    pub fn invalid_image_data() -> Self {
        Self::Input("Invalid image data".to_string())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ReaderError::Input(_) => StatusCode::BAD_REQUEST,
            ReaderError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            ReaderError::Ocr(_)
            | ReaderError::Image(_)
            | ReaderError::Io(_)
            | ReaderError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Failure body shared by every endpoint: `{"success": false, "error": "..."}`.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
}

impl IntoResponse for ReaderError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(%status, "Request failed: {}", self);
        } else {
            tracing::debug!(%status, "Request rejected: {}", self);
        }

        let body = Json(ErrorBody {
            success: false,
            error: self.to_string(),
        });

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ReaderError>;
