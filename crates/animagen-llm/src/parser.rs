//! Tagged-section extraction from backend responses
//!
//! Backend responses are untrusted free text that is merely expected to
//! contain `<tag>...</tag>` sections. The extractor tolerates surrounding
//! prose and malformed markup: a missing closing tag yields `None` and the
//! caller decides the fallback.

use regex::Regex;

/// Extract the first closed `<tag>...</tag>` section, trimmed
///
/// Case-sensitive; content may span multiple lines. Returns `None` when no
/// properly closed pair exists.
pub fn extract_tag(text: &str, tag: &str) -> Option<String> {
    let pattern = format!("(?s)<{0}>(.*?)</{0}>", regex::escape(tag));
    // The pattern is built from a fixed escaped tag name; it always compiles.
    let re = Regex::new(&pattern).ok()?;
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
}
