//! Export pipeline: rasterize the poster, save it locally, relay it
//!
//! The two effects are deliberately independent: a dead relay must never
//! hide a poster that already landed on disk, and vice versa.

use anyhow::{Context, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use log::{info, warn};
use std::path::{Path, PathBuf};

use crate::api::ApiClient;
use crate::poster::{self, VideoInfo};

#[derive(Debug)]
pub enum LocalSave {
    Saved(PathBuf),
    Failed(String),
}

#[derive(Debug)]
pub enum RemoteUpload {
    Uploaded(String),
    Failed(String),
}

/// What came out of an export attempt. Both halves always carry a result;
/// callers report them separately.
#[derive(Debug)]
pub struct ExportOutcome {
    pub local: LocalSave,
    pub upload: RemoteUpload,
}

/// Filesystem-safe filename stem: every non-alphanumeric character becomes
/// an underscore.
pub fn sanitize_filename(title: &str) -> String {
    title
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// Render the SVG scene to PNG bytes.
pub fn rasterize(svg: &str) -> Result<Vec<u8>> {
    let mut options = resvg::usvg::Options::default();
    options.fontdb_mut().load_system_fonts();

    let tree = resvg::usvg::Tree::from_str(svg, &options).context("SVG parse error")?;

    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .context("failed to create pixmap")?;

    resvg::render(
        &tree,
        resvg::tiny_skia::Transform::default(),
        &mut pixmap.as_mut(),
    );

    pixmap.encode_png().context("PNG encode error")
}

/// Rasterize the current poster, then run both effects.
///
/// Errors before the rasterized bitmap exists (thumbnail download, scene
/// build, render) are total failures; after that point each effect only
/// reports its own result.
pub fn export(api: &ApiClient, info: &VideoInfo, out_dir: &Path) -> Result<ExportOutcome> {
    let thumbnail = api
        .fetch_thumbnail(&info.thumbnail_url)
        .context("thumbnail download failed")?;

    let svg = poster::render_svg(info, &thumbnail)?;
    let png = rasterize(&svg)?;
    info!("poster rasterized ({} bytes)", png.len());

    let filename = format!("{}.png", sanitize_filename(&info.title));
    let path = out_dir.join(&filename);

    let local = match std::fs::write(&path, &png) {
        Ok(()) => LocalSave::Saved(path),
        Err(e) => {
            warn!("local save failed: {e}");
            LocalSave::Failed(e.to_string())
        }
    };

    let data_url = format!("data:image/png;base64,{}", STANDARD.encode(&png));
    let upload = match api.upload_poster(&data_url, &filename) {
        Ok(url) => RemoteUpload::Uploaded(url),
        Err(e) => {
            warn!("relay upload failed: {e}");
            RemoteUpload::Failed(e.to_string())
        }
    };

    Ok(ExportOutcome { local, upload })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_filename_replaces_everything_odd() {
        assert_eq!(
            sanitize_filename("Foo & Bar: The Movie (2024)"),
            "Foo___Bar__The_Movie__2024_"
        );
        assert_eq!(sanitize_filename("already_fine"), "already_fine");
        assert_eq!(sanitize_filename("ñandú"), "_and_");
    }

    #[test]
    fn test_rasterize_produces_a_png() {
        let svg = r##"<svg xmlns="http://www.w3.org/2000/svg" width="20" height="10"><rect width="20" height="10" fill="#ff0000"/></svg>"##;
        let png = rasterize(svg).unwrap();
        assert!(png.starts_with(b"\x89PNG"));
    }

    #[test]
    fn test_rasterize_rejects_garbage() {
        assert!(rasterize("this is not svg").is_err());
    }

    /// Canonical 1x1 transparent PNG, enough for the thumbnail embed.
    const TINY_PNG: &[u8] = &[
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48,
        0x44, 0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00,
        0x00, 0x1F, 0x15, 0xC4, 0x89, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x44, 0x41, 0x54, 0x78,
        0x9C, 0x62, 0x00, 0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00,
        0x00, 0x00, 0x00, 0x49, 0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
    ];

    /// Tiny HTTP stub: serves the thumbnail, fails every upload with a 502.
    fn spawn_stub() -> String {
        use std::io::{BufRead, BufReader, Read, Write};
        use std::net::TcpListener;

        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());

        std::thread::spawn(move || {
            for stream in listener.incoming() {
                let stream = match stream {
                    Ok(s) => s,
                    Err(_) => break,
                };
                let mut reader = BufReader::new(stream);

                let mut request_line = String::new();
                if reader.read_line(&mut request_line).is_err() {
                    continue;
                }

                // Drain headers, then the body per Content-Length, so the
                // client never sees a reset mid-write
                let mut content_length = 0usize;
                loop {
                    let mut line = String::new();
                    if reader.read_line(&mut line).is_err() || line.trim().is_empty() {
                        break;
                    }
                    let lower = line.to_ascii_lowercase();
                    if let Some(value) = lower.strip_prefix("content-length:") {
                        content_length = value.trim().parse().unwrap_or(0);
                    }
                }
                let mut body = vec![0u8; content_length];
                let _ = reader.read_exact(&mut body);

                let (status, body): (&str, Vec<u8>) = if request_line.contains("/thumb") {
                    ("200 OK", TINY_PNG.to_vec())
                } else {
                    ("502 Bad Gateway", br#"{"error":"relay down"}"#.to_vec())
                };

                let mut stream = reader.into_inner();
                let _ = write!(
                    stream,
                    "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                    status,
                    body.len()
                );
                let _ = stream.write_all(&body);
            }
        });

        base
    }

    #[test]
    fn test_upload_failure_does_not_hide_local_save() {
        let base = spawn_stub();
        let api = crate::api::ApiClient::new(base.clone(), Some("token".to_string())).unwrap();

        let info = VideoInfo {
            title: "Partial Success".to_string(),
            thumbnail_url: format!("{base}/thumb"),
            colors: vec![
                "#112233".to_string(),
                "#eeeeee".to_string(),
                "#cc3344".to_string(),
            ],
            source_url: "https://youtu.be/abc123".to_string(),
        };

        let out_dir = std::env::temp_dir().join(format!("posterforge-test-{}", std::process::id()));
        std::fs::create_dir_all(&out_dir).unwrap();

        let outcome = export(&api, &info, &out_dir).unwrap();

        // Local save succeeded and stays reported that way
        match &outcome.local {
            LocalSave::Saved(path) => {
                assert!(path.ends_with("Partial_Success.png"));
                assert!(path.exists());
            }
            LocalSave::Failed(e) => panic!("local save should have succeeded: {e}"),
        }
        // ...while the relay failure is reported on its own
        match &outcome.upload {
            RemoteUpload::Failed(message) => assert!(message.contains("relay down")),
            RemoteUpload::Uploaded(url) => panic!("upload should have failed, got {url}"),
        }

        let _ = std::fs::remove_dir_all(&out_dir);
    }
}
