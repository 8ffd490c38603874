/// Base address of the ads library search page
pub const LIBRARY_BASE_URL: &str = "https://www.facebook.com/ads/library/";

/// Builds the ads library search URL for a keyword
///
/// The parameter order matches what the library page itself produces, the
/// keyword is percent-encoded into `q`.
pub fn search_url(keyword: &str) -> String {
    format!(
        "{}?active_status=active&ad_type=all&country=ALL&q={}&search_type=keyword_unordered&media_type=all",
        LIBRARY_BASE_URL,
        urlencoding::encode(keyword)
    )
}

/// Truncates a string to at most `max` characters
pub fn clamp_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((byte_index, _)) => text[..byte_index].to_string(),
        None => text.to_string(),
    }
}

/// Convert a keyword to a sanitized report filename
pub fn report_filename(keyword: &str) -> String {
    let mut name = keyword.replace("http://", "").replace("https://", "");
    name = name.replace(['/', ':', '?', '&', '=', '#', '%', ' ', '\\'], "_");

    // Limit filename length
    let name = clamp_chars(&name, 100);
    format!("ads_{name}.json")
}
