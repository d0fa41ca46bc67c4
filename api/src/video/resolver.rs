//! Video id resolution from pasted URL strings
//!
//! Structured URL parsing is the primary path; two literal patterns catch
//! the loosely-typed strings people paste out of share sheets. First
//! non-empty id wins.

use regex::Regex;
use std::sync::OnceLock;
use url::Url;

const SHORT_HOST: &str = "youtu.be";
const CANONICAL_HOST: &str = "youtube.com";

static SHORT_RE: OnceLock<Regex> = OnceLock::new();
static WATCH_RE: OnceLock<Regex> = OnceLock::new();

fn short_re() -> &'static Regex {
    SHORT_RE.get_or_init(|| Regex::new(r"youtu\.be/([A-Za-z0-9_-]+)").unwrap())
}

fn watch_re() -> &'static Regex {
    WATCH_RE.get_or_init(|| Regex::new(r"v=([A-Za-z0-9_-]+)").unwrap())
}

/// Extract the canonical video id, or None when nothing matches.
pub fn resolve(raw: &str) -> Option<String> {
    parse_structured(raw)
        .and_then(non_empty)
        .or_else(|| parse_patterns(raw).and_then(non_empty))
}

fn parse_structured(raw: &str) -> Option<String> {
    let parsed = Url::parse(raw).ok()?;
    let host = parsed.host_str()?;

    if host == SHORT_HOST {
        // Short links carry the id as the first path segment
        return parsed.path_segments()?.next().map(str::to_string);
    }

    if host.contains(CANONICAL_HOST) {
        return parsed
            .query_pairs()
            .find(|(key, _)| key == "v")
            .map(|(_, value)| value.into_owned());
    }

    None
}

fn parse_patterns(raw: &str) -> Option<String> {
    for re in [short_re(), watch_re()] {
        if let Some(caps) = re.captures(raw) {
            return Some(caps[1].to_string());
        }
    }
    None
}

fn non_empty(id: String) -> Option<String> {
    if id.is_empty() { None } else { Some(id) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_link_forms_resolve_to_the_same_id() {
        let forms = [
            "https://youtu.be/dQw4w9WgXcQ",
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "https://youtube.com/watch?v=dQw4w9WgXcQ&t=42s",
            "https://m.youtube.com/watch?feature=share&v=dQw4w9WgXcQ",
        ];
        for form in forms {
            assert_eq!(resolve(form).as_deref(), Some("dQw4w9WgXcQ"), "{}", form);
        }
    }

    #[test]
    fn test_pattern_fallback_catches_loose_share_text() {
        // Not parseable as a URL, but the short-link shape is in there
        assert_eq!(
            resolve("check this out youtu.be/dQw4w9WgXcQ !!").as_deref(),
            Some("dQw4w9WgXcQ")
        );
        assert_eq!(resolve("watch?v=abc_-123").as_deref(), Some("abc_-123"));
    }

    #[test]
    fn test_unresolvable_strings_fail() {
        for garbage in ["", "hello world", "https://example.com/video/5", "youtu.be/"] {
            assert_eq!(resolve(garbage), None, "{:?}", garbage);
        }
    }

    #[test]
    fn test_short_link_with_empty_path_falls_through() {
        // Parses fine but yields no id; pattern net also has nothing
        assert_eq!(resolve("https://youtu.be/"), None);
    }
}
