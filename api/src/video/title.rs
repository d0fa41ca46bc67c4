//! Best-effort title scraping
//!
//! Fetches the public watch page and pulls the first `<title>` tag out of
//! the raw markup. A missing title is cosmetic, so every failure mode lands
//! on the fallback string instead of an error.

use regex::Regex;
use std::sync::OnceLock;

pub const FALLBACK_TITLE: &str = "Título no disponible";
const TITLE_SUFFIX: &str = " - YouTube";

static TITLE_RE: OnceLock<Regex> = OnceLock::new();

fn title_re() -> &'static Regex {
    TITLE_RE.get_or_init(|| Regex::new(r"(?s)<title>(.*?)</title>").unwrap())
}

pub async fn scrape(http: &reqwest::Client, base: &str, video_id: &str) -> String {
    let url = format!("{}/watch?v={}", base, video_id);

    let html = match http.get(&url).send().await {
        Ok(resp) if resp.status().is_success() => match resp.text().await {
            Ok(html) => html,
            Err(_) => return FALLBACK_TITLE.to_string(),
        },
        _ => return FALLBACK_TITLE.to_string(),
    };

    extract_title(&html).unwrap_or_else(|| FALLBACK_TITLE.to_string())
}

/// Pull the display title out of raw markup. Entities are left encoded;
/// decoding is the renderer's job.
fn extract_title(html: &str) -> Option<String> {
    let captured = title_re().captures(html)?.get(1)?.as_str().trim();
    let cleaned = captured.strip_suffix(TITLE_SUFFIX).unwrap_or(captured).trim();

    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, http::StatusCode, routing::get};

    #[test]
    fn test_suffix_is_stripped_and_entities_kept() {
        let html = "<html><head><title>Foo &amp; Bar - YouTube</title></head></html>";
        assert_eq!(extract_title(html).as_deref(), Some("Foo &amp; Bar"));
    }

    #[test]
    fn test_suffix_only_stripped_from_the_tail() {
        let html = "<title>The - YouTube Story - YouTube</title>";
        assert_eq!(extract_title(html).as_deref(), Some("The - YouTube Story"));
    }

    #[test]
    fn test_missing_title_tag_yields_none() {
        assert_eq!(extract_title("<html><body>nope</body></html>"), None);
        assert_eq!(extract_title("<title> - YouTube</title>"), None);
    }

    #[tokio::test]
    async fn test_fetch_failure_falls_back() {
        let stub = Router::new().route("/watch", get(|| async { StatusCode::NOT_FOUND }));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        tokio::spawn(async move { axum::serve(listener, stub).await.unwrap() });

        let title = scrape(&reqwest::Client::new(), &base, "whatever").await;
        assert_eq!(title, FALLBACK_TITLE);
    }
}
