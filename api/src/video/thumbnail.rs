//! Tiered thumbnail fetching
//!
//! Max-resolution first, high-quality second. Exactly two tiers, no retries
//! within a tier - most videos simply never got a max-res render, so the
//! first miss is the expected case, not an error.

use bytes::Bytes;

use super::VideoInfoError;

#[derive(Debug)]
pub struct FetchedThumbnail {
    pub bytes: Bytes,
    /// The URL that actually served the bytes.
    pub url: String,
}

pub fn max_res_url(base: &str, video_id: &str) -> String {
    format!("{}/vi/{}/maxresdefault.jpg", base, video_id)
}

pub fn fallback_url(base: &str, video_id: &str) -> String {
    format!("{}/vi/{}/hqdefault.jpg", base, video_id)
}

pub async fn fetch(
    http: &reqwest::Client,
    base: &str,
    video_id: &str,
) -> Result<FetchedThumbnail, VideoInfoError> {
    for url in [max_res_url(base, video_id), fallback_url(base, video_id)] {
        match http.get(&url).send().await {
            Ok(resp) if resp.status().is_success() => match resp.bytes().await {
                Ok(bytes) => return Ok(FetchedThumbnail { bytes, url }),
                Err(e) => eprintln!("[video] thumbnail body read failed for {}: {}", url, e),
            },
            Ok(_) => {} // tier miss, try the next one
            Err(e) => eprintln!("[video] thumbnail fetch error for {}: {}", url, e),
        }
    }

    Err(VideoInfoError::ThumbnailUnavailable)
}
