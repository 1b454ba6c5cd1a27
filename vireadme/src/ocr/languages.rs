use serde::Serialize;

/// Display names for the Tesseract language packs the web UI offers.
const LANGUAGE_NAMES: &[(&str, &str)] = &[
    ("eng", "English"),
    ("spa", "Spanish"),
    ("fra", "French"),
    ("deu", "German"),
    ("ita", "Italian"),
    ("por", "Portuguese"),
    ("rus", "Russian"),
    ("chi_sim", "Chinese (Simplified)"),
    ("chi_tra", "Chinese (Traditional)"),
    ("jpn", "Japanese"),
    ("kor", "Korean"),
    ("ara", "Arabic"),
    ("hin", "Hindi"),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct LanguageInfo {
    pub code: String,
    pub name: String,
}

/// Human-readable name for a language code; unknown codes are upper-cased.
pub fn language_name(code: &str) -> String {
    LANGUAGE_NAMES
        .iter()
        .find(|(known, _)| *known == code)
        .map(|(_, name)| (*name).to_string())
        .unwrap_or_else(|| code.to_uppercase())
}

pub fn describe_languages<I, S>(codes: I) -> Vec<LanguageInfo>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    codes
        .into_iter()
        .map(|code| {
            let code = code.as_ref();
            LanguageInfo {
                code: code.to_string(),
                name: language_name(code),
            }
        })
        .collect()
}

/// Reported when the engine cannot list its installed languages.
pub fn fallback_languages() -> Vec<LanguageInfo> {
    describe_languages(["eng"])
}
