/// Upper bound for request bodies. Exported posters arrive as base64 data
/// URLs, which are roughly 4/3 the size of the rasterized PNG.
pub const MAX_UPLOAD_SIZE: usize = 32 * 1024 * 1024; // 32 MB

/// Timeout applied to every outbound fetch (thumbnails, watch pages, imgbb).
pub const FETCH_TIMEOUT_SECS: u64 = 10;
