use chrono::Utc;
use nanoid::nanoid;

const FALLBACK_NAME: &str = "upload";

/// Reduce a client-supplied filename to a safe, flat name.
///
/// Path components are discarded, whitespace becomes `_`, and anything outside
/// `[A-Za-z0-9._-]` is dropped. Leading and trailing dots/underscores are
/// trimmed so the result can never be `.`, `..` or a hidden file. Returns an
/// empty string when nothing safe remains.
pub fn secure_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();

    let cleaned: String = base
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();

    cleaned.trim_matches(|c| c == '.' || c == '_').to_string()
}

/// Time-derived prefix that keeps concurrent uploads from colliding.
///
/// Milliseconds since the epoch plus a short random suffix; collision
/// avoidance only, not a security token.
pub fn unique_prefix() -> String {
    const ALPHABET: [char; 36] = [
        '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h',
        'i', 'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z',
    ];
    format!("{}_{}", Utc::now().timestamp_millis(), nanoid!(8, &ALPHABET))
}

/// On-disk name for a multipart upload.
pub fn upload_filename(original: &str) -> String {
    let safe = secure_filename(original);
    let safe = if safe.is_empty() {
        FALLBACK_NAME
    } else {
        safe.as_str()
    };
    format!("{}_{}", unique_prefix(), safe)
}

/// On-disk name for a camera capture; always JPEG.
pub fn camera_filename() -> String {
    format!("{}_camera.jpg", unique_prefix())
}
