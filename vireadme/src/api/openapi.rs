use axum::Json;
use utoipa::OpenApi;
use utoipa_redoc::{Redoc, Servable};

use super::handlers;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "VI-ReadMe API",
        version = "1.0.0",
        description = "Extracts text from photos and camera captures so the browser can read it aloud.",
    ),
    paths(
        handlers::health::health_check,
        handlers::extract::extract_text,
        handlers::languages::supported_languages,
    ),
    components(schemas(
        crate::error::ErrorBody,
        crate::ocr::LanguageInfo,
        handlers::health::HealthResponse,
        handlers::extract::ExtractTextResponse,
        handlers::languages::LanguagesResponse,
    )),
    tags(
        (name = "health", description = "Health check"),
        (name = "ocr", description = "Text extraction and language discovery"),
    ),
)]
pub struct ApiDoc;

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

pub fn redoc_router<S: Clone + Send + Sync + 'static>() -> axum::Router<S> {
    Redoc::with_url("/docs", ApiDoc::openapi()).into()
}
