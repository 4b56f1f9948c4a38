// src/utils/html.rs

/// Sentinel returned when no title can be extracted.
pub const NO_TITLE: &str = "No Title Found";

/// Best-effort page title extraction.
///
/// Case-insensitive scan for the first `<title>` marker and the first
/// `</title>` after it; returns the trimmed text between them. Not a
/// parser: nested or attribute-bearing title tags are out of scope.
pub fn extract_title(html: &str) -> String {
    // ASCII lowering preserves byte offsets, so positions found in the
    // lowered copy index the original safely.
    let lowered = html.to_ascii_lowercase();

    let start = match lowered.find("<title>") {
        Some(i) => i + "<title>".len(),
        None => return NO_TITLE.to_string(),
    };

    let end = match lowered[start..].find("</title>") {
        Some(i) => start + i,
        None => return NO_TITLE.to_string(),
    };

    html[start..end].trim().to_string()
}
