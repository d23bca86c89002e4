//! Ordered-fallback regex extraction.
//!
//! Sources and scrapers extract each field with an ordered list of patterns;
//! the first pattern whose first capture group matches wins. Patterns are
//! site-specific and live next to the parse code that uses them.

use regex::Regex;

/// Return the first capture group of the first pattern that matches `html`,
/// trimmed. Patterns that fail to compile are skipped.
pub fn first_capture(html: &str, patterns: &[&str]) -> Option<String> {
    patterns
        .iter()
        .filter_map(|pattern| Regex::new(pattern).ok())
        .find_map(|re| {
            re.captures(html)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().trim().to_string())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_pattern_wins() {
        let html = r#"<meta property="og:title" content="From Meta"><h1>From H1</h1>"#;
        let got = first_capture(
            html,
            &[
                r#"<meta property="og:title" content="([^"]+)""#,
                r"<h1>([^<]+)</h1>",
            ],
        );
        assert_eq!(got.as_deref(), Some("From Meta"));
    }

    #[test]
    fn falls_back_to_later_patterns() {
        let html = "<h1>Only Heading</h1>";
        let got = first_capture(
            html,
            &[
                r#"<meta property="og:title" content="([^"]+)""#,
                r"<h1>([^<]+)</h1>",
            ],
        );
        assert_eq!(got.as_deref(), Some("Only Heading"));
    }

    #[test]
    fn no_match_returns_none() {
        assert!(first_capture("<body></body>", &[r"<h1>([^<]+)</h1>"]).is_none());
    }

    #[test]
    fn capture_is_trimmed() {
        let got = first_capture("<h1>  padded  </h1>", &[r"<h1>([^<]+)</h1>"]);
        assert_eq!(got.as_deref(), Some("padded"));
    }
}
