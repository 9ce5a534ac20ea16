//! Image preparation for the edit endpoint
//!
//! The vendor only accepts square RGBA PNGs with a matching mask, so uploads
//! and intermediate results are normalized here before every edit call.

pub mod processor;

pub use processor::ImagePreparer;

/// A vendor-ready image and its edit mask.
#[derive(Debug, Clone)]
pub struct PreparedImage {
    pub png: Vec<u8>,
    pub mask: Vec<u8>,
    pub side: u32,
}

/// Sniff the MIME type of encoded image bytes from their magic number.
pub fn detect_image_mime(bytes: &[u8]) -> &'static str {
    match bytes {
        [0xFF, 0xD8, 0xFF, ..] => "image/jpeg",
        [0x89, 0x50, 0x4E, 0x47, ..] => "image/png",
        [0x47, 0x49, 0x46, 0x38, ..] => "image/gif",
        [0x52, 0x49, 0x46, 0x46, _, _, _, _, 0x57, 0x45, 0x42, 0x50, ..] => "image/webp",
        _ => {
            tracing::warn!(
                "Unrecognized image format (first 4 bytes: {:02X?}), falling back to image/png",
                &bytes[..bytes.len().min(4)]
            );
            "image/png"
        }
    }
}
