//! Poster composition
//!
//! A poster is a pure function of its `VideoInfo`: backdrop, title, play
//! badge, swatch strip, and a QR code of the pasted URL, laid out as an SVG
//! scene. Rasterization lives in `export`; nothing here touches the network.

use anyhow::{Context, Result, bail};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use qrcode::{Color, QrCode};
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::api::VideoInfoResponse;

pub const POSTER_WIDTH: u32 = 540;
pub const POSTER_HEIGHT: u32 = 760;

/// Everything a poster is derived from. `source_url` is the string the user
/// pasted, verbatim - it is what the QR code encodes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoInfo {
    pub title: String,
    pub thumbnail_url: String,
    pub colors: Vec<String>,
    pub source_url: String,
}

impl VideoInfo {
    pub fn from_response(response: VideoInfoResponse, source_url: &str) -> Self {
        Self {
            title: response.title,
            thumbnail_url: response.thumbnail_url,
            colors: response.colors,
            source_url: source_url.to_string(),
        }
    }
}

/// Reshuffle the palette of the currently displayed poster.
///
/// Same color multiset, new order, new role assignment. Starts from the
/// input's order, so remixing twice shuffles twice rather than undoing.
/// The input is left untouched.
pub fn remix(info: &VideoInfo) -> VideoInfo {
    let mut colors = info.colors.clone();
    colors.shuffle(&mut rand::rng());

    VideoInfo {
        colors,
        ..info.clone()
    }
}

/// The title as it should be displayed: scraped markup may carry encoded
/// entities ("Foo &amp; Bar"), which render as their plain form.
pub fn display_title(info: &VideoInfo) -> String {
    html_escape::decode_html_entities(&info.title).into_owned()
}

/// Compose the poster scene. Role assignment is fixed and positional:
/// color 0 = backdrop, color 1 = title text and QR dark modules,
/// color 2 = play-badge tint. The whole palette also appears as a swatch
/// strip in its original order.
pub fn render_svg(info: &VideoInfo, thumbnail: &[u8]) -> Result<String> {
    if info.colors.len() < 3 {
        bail!(
            "poster palette needs at least 3 colors, got {}",
            info.colors.len()
        );
    }
    let backdrop = &info.colors[0];
    let ink = &info.colors[1];
    let accent = &info.colors[2];

    let title = display_title(info);
    let title_text = html_escape::encode_text(&title);

    let mime = detect_image_mime(thumbnail);
    let thumb_b64 = STANDARD.encode(thumbnail);

    let mut svg = String::with_capacity(16 * 1024);
    svg.push_str(&format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}"><rect width="{w}" height="{h}" fill="{backdrop}"/>"##,
        w = POSTER_WIDTH,
        h = POSTER_HEIGHT,
    ));

    // Thumbnail, cropped to fill a 16:9 frame
    svg.push_str(&format!(
        r##"<image href="data:{mime};base64,{thumb_b64}" x="30" y="30" width="480" height="270" preserveAspectRatio="xMidYMid slice"/>"##,
    ));

    // Title, centered under the thumbnail
    svg.push_str(&format!(
        r##"<text x="{x}" y="350" text-anchor="middle" font-family="Helvetica, Arial, sans-serif" font-size="26" font-weight="700" fill="{ink}">{title_text}</text>"##,
        x = POSTER_WIDTH / 2,
    ));

    // Play badge in the accent tint
    svg.push_str(&format!(
        r##"<g transform="translate(30,390)"><rect width="84" height="58" rx="14" fill="{accent}"/><path d="M34 17 L58 29 L34 41 Z" fill="{backdrop}"/></g>"##,
    ));

    // Swatch strip: the full palette in its current order
    for (i, color) in info.colors.iter().enumerate() {
        svg.push_str(&format!(
            r##"<rect x="{x}" y="490" width="40" height="40" rx="6" fill="{color}"/>"##,
            x = 30 + i * 48,
        ));
    }

    svg.push_str(&qr_svg(&info.source_url, ink, backdrop, 370, 560, 140)?);
    svg.push_str("</svg>");

    Ok(svg)
}

/// QR code of the source URL as a module grid, dark/light mapped onto the
/// poster's ink and backdrop colors, with a one-module quiet zone.
fn qr_svg(url: &str, dark: &str, light: &str, x: u32, y: u32, size: u32) -> Result<String> {
    let code = QrCode::new(url.as_bytes()).context("QR encoding failed")?;
    let width = code.width();
    let modules = code.to_colors();

    // Uniform scale maps module coordinates onto the target square
    let scale = size as f64 / (width as f64 + 2.0);

    let mut path = String::new();
    for (index, module) in modules.iter().enumerate() {
        if *module == Color::Dark {
            let mx = index % width;
            let my = index / width;
            path.push_str(&format!("M{mx} {my}h1v1h-1z"));
        }
    }

    Ok(format!(
        r##"<g transform="translate({x},{y}) scale({scale})"><rect width="{quiet}" height="{quiet}" fill="{light}"/><path d="{path}" fill="{dark}" transform="translate(1,1)"/></g>"##,
        quiet = width + 2,
    ))
}

/// Detect MIME type from image bytes (basic magic byte detection).
fn detect_image_mime(bytes: &[u8]) -> &'static str {
    if bytes.starts_with(b"\x89PNG") {
        "image/png"
    } else if bytes.starts_with(b"\xFF\xD8\xFF") {
        "image/jpeg"
    } else if bytes.starts_with(b"RIFF") && bytes.get(8..12) == Some(b"WEBP") {
        "image/webp"
    } else {
        // Thumbnails come off the CDN as JPEG unless proven otherwise
        "image/jpeg"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_info() -> VideoInfo {
        VideoInfo {
            title: "Foo &amp; Bar".to_string(),
            thumbnail_url: "https://img.youtube.com/vi/abc/maxresdefault.jpg".to_string(),
            colors: vec![
                "#101010".to_string(),
                "#fafafa".to_string(),
                "#ff4444".to_string(),
                "#44ff44".to_string(),
                "#4444ff".to_string(),
            ],
            source_url: "https://youtu.be/abc".to_string(),
        }
    }

    #[test]
    fn test_remix_is_a_pure_permutation() {
        let info = sample_info();
        let before = info.colors.clone();

        let remixed = remix(&info);

        // Input untouched
        assert_eq!(info.colors, before);
        // Same multiset
        let mut a = remixed.colors.clone();
        let mut b = before.clone();
        a.sort();
        b.sort();
        assert_eq!(a, b);
        // Everything else carried over
        assert_eq!(remixed.title, info.title);
        assert_eq!(remixed.thumbnail_url, info.thumbnail_url);
        assert_eq!(remixed.source_url, info.source_url);
    }

    #[test]
    fn test_display_title_decodes_entities() {
        assert_eq!(display_title(&sample_info()), "Foo & Bar");
    }

    #[test]
    fn test_scene_uses_the_positional_roles() {
        let info = sample_info();
        let svg = render_svg(&info, b"\xFF\xD8\xFFfake-jpeg").unwrap();

        // Backdrop rect, ink title, accent badge
        assert!(svg.contains(r##"fill="#101010"/>"##));
        assert!(svg.contains(r##"fill="#fafafa">Foo &amp; Bar</text>"##));
        assert!(svg.contains(r##"rx="14" fill="#ff4444""##));
        // Full swatch strip in original order
        for color in &info.colors {
            assert!(svg.contains(&format!(r##"width="40" height="40" rx="6" fill="{color}""##)));
        }
        assert!(svg.contains("data:image/jpeg;base64,"));
    }

    #[test]
    fn test_qr_encodes_the_source_url() {
        let info = sample_info();
        let mut other = sample_info();
        other.source_url = "https://youtu.be/another".to_string();

        let a = render_svg(&info, b"x").unwrap();
        let b = render_svg(&other, b"x").unwrap();

        // Same palette, same title - only the QR payload differs
        assert_ne!(a, b);
        assert!(a.contains("<path d=\"M"));
    }

    #[test]
    fn test_short_palette_is_rejected() {
        let mut info = sample_info();
        info.colors.truncate(2);
        assert!(render_svg(&info, b"x").is_err());
    }
}
