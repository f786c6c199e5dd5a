use chrono::{DateTime, Utc};

pub const ALLOWED_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "gif", "pdf", "txt"];

/// Checks the substring after the last dot against the allow-list, ignoring case.
pub fn allowed_file(filename: &str) -> bool {
    match filename.rsplit_once('.') {
        Some((_, ext)) => {
            let ext = ext.to_ascii_lowercase();
            ALLOWED_EXTENSIONS.contains(&ext.as_str())
        }
        None => false,
    }
}

/// Reduces a client-supplied name to `[A-Za-z0-9_.-]`, turning path separators
/// and whitespace runs into a single `_` and trimming leading/trailing `.`/`_`.
/// Returns an empty string when nothing usable remains.
pub fn sanitize_filename(filename: &str) -> String {
    let spaced = filename.replace(['/', '\\'], " ");
    let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");
    let kept: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect();
    kept.trim_matches(|c| c == '.' || c == '_').to_string()
}

/// Prefixes with `YYYYMMDD_HHMMSS_` so repeated uploads of one name don't collide.
pub fn timestamped_name(sanitized: &str, now: DateTime<Utc>) -> String {
    format!("{}_{}", now.format("%Y%m%d_%H%M%S"), sanitized)
}
