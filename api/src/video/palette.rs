//! Dominant-color extraction from raw thumbnail bytes
//!
//! Quantizes the image into coarse RGB buckets and ranks them by pixel
//! count. The mean color of each of the top buckets becomes a palette
//! entry, most dominant first.

use image::ImageReader;
use std::collections::HashMap;
use std::io::Cursor;

use super::VideoInfoError;

const PALETTE_SIZE: usize = 5;
/// Poster roles index colors 0-2 unconditionally; fewer is an error.
const MIN_COLORS: usize = 3;
/// Edge length the image is shrunk to before sampling.
const SAMPLE_EDGE: u32 = 64;

#[derive(Default)]
struct Bucket {
    count: u64,
    r: u64,
    g: u64,
    b: u64,
}

impl Bucket {
    fn mean_hex(&self) -> String {
        format!(
            "#{:02x}{:02x}{:02x}",
            self.r / self.count,
            self.g / self.count,
            self.b / self.count
        )
    }
}

/// Extract an ordered palette of lowercase `#rrggbb` strings.
pub fn extract(data: &[u8]) -> Result<Vec<String>, VideoInfoError> {
    let img = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| VideoInfoError::Decode(e.to_string()))?
        .decode()
        .map_err(|e| VideoInfoError::Decode(e.to_string()))?;

    let small = img.thumbnail(SAMPLE_EDGE, SAMPLE_EDGE).to_rgb8();

    // 3 bits per channel: at most 512 buckets
    let mut buckets: HashMap<u16, Bucket> = HashMap::new();
    for pixel in small.pixels() {
        let [r, g, b] = pixel.0;
        let key = ((r as u16 >> 5) << 6) | ((g as u16 >> 5) << 3) | (b as u16 >> 5);
        let bucket = buckets.entry(key).or_default();
        bucket.count += 1;
        bucket.r += r as u64;
        bucket.g += g as u64;
        bucket.b += b as u64;
    }

    let mut ranked: Vec<(u16, Bucket)> = buckets.into_iter().collect();
    // Count descending; bucket key as tie-break so the order is deterministic
    ranked.sort_by(|a, b| b.1.count.cmp(&a.1.count).then(a.0.cmp(&b.0)));
    ranked.truncate(PALETTE_SIZE);

    if ranked.len() < MIN_COLORS {
        return Err(VideoInfoError::InsufficientPalette(ranked.len()));
    }

    Ok(ranked.into_iter().map(|(_, b)| b.mean_hex()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, Rgb, RgbImage};

    fn encode_png(img: RgbImage) -> Vec<u8> {
        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img)
            .write_to(&mut out, image::ImageFormat::Png)
            .unwrap();
        out.into_inner()
    }

    #[test]
    fn test_known_dominant_colors_in_order() {
        // Red covers half the image, green a third, blue the rest
        let img = RgbImage::from_fn(60, 60, |x, _| {
            if x < 30 {
                Rgb([255, 0, 0])
            } else if x < 50 {
                Rgb([0, 255, 0])
            } else {
                Rgb([0, 0, 255])
            }
        });

        let colors = extract(&encode_png(img)).unwrap();
        assert!(colors.len() >= 3);
        assert_eq!(colors[0], "#ff0000");
        assert_eq!(colors[1], "#00ff00");
        assert_eq!(colors[2], "#0000ff");
    }

    #[test]
    fn test_every_entry_is_well_formed_hex() {
        let img = RgbImage::from_fn(64, 64, |x, y| {
            Rgb([(x * 4) as u8, (y * 4) as u8, ((x + y) * 2) as u8])
        });

        let colors = extract(&encode_png(img)).unwrap();
        assert!(colors.len() >= 3);
        for color in &colors {
            assert_eq!(color.len(), 7);
            assert!(color.starts_with('#'));
            assert!(color[1..].chars().all(|c| c.is_ascii_hexdigit()));
        }
    }

    #[test]
    fn test_flat_image_is_insufficient() {
        let img = RgbImage::from_pixel(32, 32, Rgb([10, 20, 30]));
        let err = extract(&encode_png(img)).unwrap_err();
        assert!(matches!(err, VideoInfoError::InsufficientPalette(1)));
    }

    #[test]
    fn test_undecodable_bytes_fail() {
        let err = extract(b"definitely not an image").unwrap_err();
        assert!(matches!(err, VideoInfoError::Decode(_)));
    }
}
