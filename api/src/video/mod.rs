//! Video metadata and palette pipeline
//!
//! Turns a pasted YouTube URL into the data a poster is built from: resolve
//! the video id, fetch the best-available thumbnail, sample its dominant
//! colors, and scrape the page title. Thumbnail and palette are a strict
//! chain; the title scrape is independent and runs alongside it.

pub mod palette;
pub mod resolver;
pub mod thumbnail;
pub mod title;

use std::time::Duration;

use crate::constants::FETCH_TIMEOUT_SECS;

const THUMB_BASE: &str = "https://img.youtube.com";
const WATCH_BASE: &str = "https://www.youtube.com";

/// Everything a poster needs. `source_url` is the caller's string verbatim,
/// never a normalized form - the QR code must encode exactly what was pasted.
#[derive(Debug, Clone)]
pub struct VideoInfo {
    pub title: String,
    pub thumbnail_url: String,
    pub colors: Vec<String>,
    pub source_url: String,
}

#[derive(Debug)]
pub enum VideoInfoError {
    InvalidUrl,
    ThumbnailUnavailable,
    Decode(String),
    /// Extraction produced fewer than the minimum number of colors.
    InsufficientPalette(usize),
}

impl std::fmt::Display for VideoInfoError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VideoInfoError::InvalidUrl => write!(f, "not a recognizable video URL"),
            VideoInfoError::ThumbnailUnavailable => write!(f, "no thumbnail tier succeeded"),
            VideoInfoError::Decode(e) => write!(f, "thumbnail decode failed: {}", e),
            VideoInfoError::InsufficientPalette(n) => {
                write!(f, "only {} palette colors sampled", n)
            }
        }
    }
}

impl std::error::Error for VideoInfoError {}

#[derive(Clone)]
pub struct VideoInfoService {
    http: reqwest::Client,
    thumb_base: String,
    watch_base: String,
}

impl VideoInfoService {
    pub fn new() -> Self {
        Self::with_bases(THUMB_BASE.to_string(), WATCH_BASE.to_string())
    }

    fn with_bases(thumb_base: String, watch_base: String) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
            .build()
            .expect("Failed to build pipeline HTTP client");

        Self {
            http,
            thumb_base,
            watch_base,
        }
    }

    /// Run the full pipeline for one pasted URL.
    ///
    /// The title branch can never abort the request: whatever goes wrong
    /// there degrades to the fallback string while the thumbnail/palette
    /// chain decides the outcome.
    pub async fn fetch(&self, raw_url: &str) -> Result<VideoInfo, VideoInfoError> {
        let video_id = resolver::resolve(raw_url).ok_or(VideoInfoError::InvalidUrl)?;

        let (chain, title) = tokio::join!(
            async {
                let fetched = thumbnail::fetch(&self.http, &self.thumb_base, &video_id).await?;
                println!("[video] {} served from {}", video_id, fetched.url);
                palette::extract(&fetched.bytes)
            },
            title::scrape(&self.http, &self.watch_base, &video_id),
        );
        let colors = chain?;

        Ok(VideoInfo {
            title,
            // The canonical max-res URL is reported even when the fallback
            // tier served the bytes; clients hotlink whichever resolves.
            thumbnail_url: thumbnail::max_res_url(&self.thumb_base, &video_id),
            colors,
            source_url: raw_url.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, http::StatusCode, routing::get};
    use std::io::Cursor;

    async fn spawn_stub(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });
        base
    }

    fn png_with_three_colors() -> Vec<u8> {
        let img = image::RgbImage::from_fn(60, 60, |x, _| {
            if x < 30 {
                image::Rgb([255, 0, 0])
            } else if x < 50 {
                image::Rgb([0, 255, 0])
            } else {
                image::Rgb([0, 0, 255])
            }
        });
        let mut out = Cursor::new(Vec::new());
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut out, image::ImageFormat::Png)
            .unwrap();
        out.into_inner()
    }

    #[tokio::test]
    async fn test_pipeline_with_fallback_thumbnail_tier() {
        let png = png_with_three_colors();
        let stub = Router::new()
            .route(
                "/vi/abc123/maxresdefault.jpg",
                get(|| async { StatusCode::NOT_FOUND }),
            )
            .route("/vi/abc123/hqdefault.jpg", get(move || async move { png }))
            .route(
                "/watch",
                get(|| async { "<html><title>Foo &amp; Bar - YouTube</title></html>" }),
            );
        let base = spawn_stub(stub).await;

        let service = VideoInfoService::with_bases(base.clone(), base);
        let info = service.fetch("https://youtu.be/abc123").await.unwrap();

        // Max-res URL is the reported one despite hq serving the bytes
        assert!(info.thumbnail_url.ends_with("/vi/abc123/maxresdefault.jpg"));
        assert!(info.colors.len() >= 3);
        // Raw scraped title: entities stay encoded until the client renders
        assert_eq!(info.title, "Foo &amp; Bar");
        assert_eq!(info.source_url, "https://youtu.be/abc123");
    }

    #[tokio::test]
    async fn test_pipeline_fails_when_both_tiers_fail() {
        let stub = Router::new().route(
            "/watch",
            get(|| async { "<html><title>Ignored</title></html>" }),
        );
        let base = spawn_stub(stub).await;

        let service = VideoInfoService::with_bases(base.clone(), base);
        let err = service.fetch("https://youtu.be/abc123").await.unwrap_err();
        assert!(matches!(err, VideoInfoError::ThumbnailUnavailable));
    }

    #[tokio::test]
    async fn test_title_failure_degrades_to_fallback() {
        let png = png_with_three_colors();
        let stub = Router::new()
            .route("/vi/xyz/maxresdefault.jpg", get(move || async move { png }));
        let base = spawn_stub(stub).await;

        let service = VideoInfoService::with_bases(base.clone(), base);
        let info = service
            .fetch("https://www.youtube.com/watch?v=xyz")
            .await
            .unwrap();
        assert_eq!(info.title, title::FALLBACK_TITLE);
    }

    #[tokio::test]
    async fn test_invalid_url_fails_fast() {
        let service = VideoInfoService::new();
        let err = service.fetch("not a url at all").await.unwrap_err();
        assert!(matches!(err, VideoInfoError::InvalidUrl));
    }
}
