//! Title fingerprint used for duplicate detection.

/// Normalizes a title into a comparable key.
///
/// ASCII-lowercases the title and keeps only ASCII letters and digits, so
/// case, whitespace and punctuation never affect equality. Output is stable
/// across processes and locales. Used for comparison only, never display.
pub fn fingerprint(title: &str) -> String {
    title
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|ch| ch.to_ascii_lowercase())
        .collect()
}
