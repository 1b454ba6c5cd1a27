use axum::extract::State;
use axum::Json;
use serde::Serialize;
use tracing::warn;

use crate::api::state::AppState;
use crate::ocr::{describe_languages, fallback_languages, LanguageInfo};

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct LanguagesResponse {
    pub success: bool,
    pub languages: Vec<LanguageInfo>,
}

/// `GET /supported-languages`
///
/// Lists the engine's installed languages. Never fails: when the engine
/// cannot report them, English alone is returned.
#[utoipa::path(
    get,
    path = "/supported-languages",
    tag = "ocr",
    responses(
        (status = 200, description = "Installed OCR languages", body = LanguagesResponse),
    )
)]
pub async fn supported_languages(State(state): State<AppState>) -> Json<LanguagesResponse> {
    let languages = match state.ocr.installed_languages().await {
        Ok(codes) => describe_languages(codes),
        Err(e) => {
            warn!("Could not list installed OCR languages, using fallback: {}", e);
            fallback_languages()
        }
    };

    Json(LanguagesResponse {
        success: true,
        languages,
    })
}
