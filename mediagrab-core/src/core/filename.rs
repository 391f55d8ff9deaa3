use unicode_normalization::UnicodeNormalization;

pub const MAX_TITLE_CHARS: usize = 180;
pub const DEFAULT_TITLE: &str = "video";

const FORBIDDEN: [char; 9] = ['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

pub fn sanitize_title(title: Option<&str>) -> String {
    let title = match title {
        Some(t) if !t.is_empty() => t,
        _ => return DEFAULT_TITLE.to_string(),
    };

    let normalized: String = title
        .nfc()
        .map(|c| if FORBIDDEN.contains(&c) { '_' } else { c })
        .collect();

    let result: String = normalized.trim().chars().take(MAX_TITLE_CHARS).collect();
    if result.is_empty() {
        DEFAULT_TITLE.to_string()
    } else {
        result
    }
}
