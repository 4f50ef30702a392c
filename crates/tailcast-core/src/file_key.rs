use std::sync::LazyLock;

use regex::Regex;

/// Marker that identifies a pasted Figma web URL.
const FIGMA_HOST: &str = "figma.com";

static RE_FILE_SEGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"file/([^/?]+)").unwrap());

/// Resolve a raw key or Figma URL to the canonical file key.
///
/// URLs yield the path segment after `/file/`. Anything else, including
/// URLs without a `/file/` segment, is returned unchanged; the key format
/// is not validated.
pub fn resolve(raw_key: &str) -> String {
    if raw_key.contains(FIGMA_HOST) {
        if let Some(caps) = RE_FILE_SEGMENT.captures(raw_key) {
            return caps[1].to_string();
        }
    }
    raw_key.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_url() {
        assert_eq!(resolve("https://www.figma.com/file/ABC123/My-Design"), "ABC123");
    }

    #[test]
    fn test_url_with_query() {
        assert_eq!(
            resolve("https://www.figma.com/file/XyZ789?node-id=1%3A2"),
            "XyZ789"
        );
    }

    #[test]
    fn test_canonical_key_is_idempotent() {
        assert_eq!(resolve("ABC123"), "ABC123");
        assert_eq!(resolve(&resolve("ABC123")), "ABC123");
    }

    #[test]
    fn test_url_without_file_segment_unchanged() {
        let raw = "https://www.figma.com/community/plugin/123";
        assert_eq!(resolve(raw), raw);
    }

    #[test]
    fn test_file_segment_without_figma_host_unchanged() {
        assert_eq!(resolve("example.org/file/ABC"), "example.org/file/ABC");
    }
}
