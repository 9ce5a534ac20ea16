use super::{detect_image_mime, PreparedImage};
use crate::{Error, Result};
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, RgbaImage};
use std::io::Cursor;

/// Scale `width` x `height` so the longest edge equals `max_side`. Neither
/// edge drops below one pixel.
fn fit_within(width: u32, height: u32, max_side: u32) -> (u32, u32) {
    let longest = u64::from(width.max(height));
    let scale = |edge: u32| {
        let scaled = (u64::from(edge) * u64::from(max_side) + longest / 2) / longest;
        u32::try_from(scaled).unwrap_or(max_side).clamp(1, max_side)
    };
    (scale(width), scale(height))
}

pub struct ImagePreparer {
    max_side: u32,
}

impl ImagePreparer {
    pub fn new(max_side: u32) -> Self {
        Self {
            max_side: max_side.max(1),
        }
    }

    fn encode_png(image: RgbaImage) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        DynamicImage::ImageRgba8(image).write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)?;
        Ok(buffer)
    }

    fn prepare_sync(data: Vec<u8>, max_side: u32) -> Result<PreparedImage> {
        let mime = detect_image_mime(&data);
        let decoded = image::load_from_memory(&data).map_err(|e| {
            Error::BadRequest(format!("Uploaded file is not a supported image ({}): {}", mime, e))
        })?;

        let (width, height) = (decoded.width(), decoded.height());
        if width == 0 || height == 0 {
            return Err(Error::BadRequest("Uploaded image is empty".to_string()));
        }

        // Shrink before padding so the canvas never exceeds `max_side` squared.
        let longest = width.max(height);
        let rgba = decoded.to_rgba8();
        let rgba = if longest > max_side {
            let (w, h) = fit_within(width, height, max_side);
            imageops::resize(&rgba, w, h, FilterType::Lanczos3)
        } else {
            rgba
        };
        let (width, height) = rgba.dimensions();

        // Center on a transparent square so the edit keeps the aspect ratio.
        let side = width.max(height);
        let mut canvas = RgbaImage::new(side, side);
        imageops::replace(
            &mut canvas,
            &rgba,
            i64::from((side - width) / 2),
            i64::from((side - height) / 2),
        );

        // Fully transparent mask: the whole canvas is editable.
        let mask = RgbaImage::new(side, side);

        Ok(PreparedImage {
            png: Self::encode_png(canvas)?,
            mask: Self::encode_png(mask)?,
            side,
        })
    }

    /// Decode `data` and turn it into a square PNG plus mask.
    pub async fn prepare(&self, data: &[u8]) -> Result<PreparedImage> {
        let max_side = self.max_side;
        let data = data.to_vec();
        tokio::task::spawn_blocking(move || Self::prepare_sync(data, max_side))
            .await
            .map_err(|e| Error::Invariant(format!("Image preparation task join error: {}", e)))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, Rgba};

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba([200, 10, 10, 255]));
        ImagePreparer::encode_png(img).unwrap()
    }

    fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
            width,
            height,
            image::Rgb([0, 120, 240]),
        ));
        let mut buffer = Vec::new();
        img.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Jpeg)
            .unwrap();
        buffer
    }

    #[tokio::test]
    async fn test_prepare_square_png_keeps_size() {
        let preparer = ImagePreparer::new(1024);
        let prepared = preparer.prepare(&png_bytes(64, 64)).await.unwrap();

        assert_eq!(prepared.side, 64);
        assert_eq!(detect_image_mime(&prepared.png), "image/png");
        assert_eq!(detect_image_mime(&prepared.mask), "image/png");

        let image = image::load_from_memory(&prepared.png).unwrap();
        assert_eq!(image.dimensions(), (64, 64));
    }

    #[tokio::test]
    async fn test_prepare_pads_to_square_with_transparency() {
        let preparer = ImagePreparer::new(1024);
        let prepared = preparer.prepare(&png_bytes(40, 20)).await.unwrap();
        assert_eq!(prepared.side, 40);

        let image = image::load_from_memory(&prepared.png).unwrap().to_rgba8();
        assert_eq!(image.dimensions(), (40, 40));
        // Padding rows above and below the original content are transparent.
        assert_eq!(image.get_pixel(0, 0)[3], 0);
        assert_eq!(image.get_pixel(20, 39)[3], 0);
        // Original pixels sit in the middle band.
        assert_eq!(image.get_pixel(20, 20), &Rgba([200, 10, 10, 255]));
    }

    #[tokio::test]
    async fn test_prepare_downscales_large_images() {
        let preparer = ImagePreparer::new(32);
        let prepared = preparer.prepare(&png_bytes(100, 50)).await.unwrap();
        assert_eq!(prepared.side, 32);

        let mask = image::load_from_memory(&prepared.mask).unwrap().to_rgba8();
        assert_eq!(mask.dimensions(), (32, 32));
        assert!(mask.pixels().all(|p| p[3] == 0));
    }

    #[tokio::test]
    async fn test_prepare_thin_image_stays_within_max_side() {
        let preparer = ImagePreparer::new(64);
        let prepared = tokio::time::timeout(
            std::time::Duration::from_secs(30),
            preparer.prepare(&png_bytes(200_000, 1)),
        )
        .await
        .expect("thin image preparation should not stall")
        .unwrap();

        assert_eq!(prepared.side, 64);
        let image = image::load_from_memory(&prepared.png).unwrap().to_rgba8();
        assert_eq!(image.dimensions(), (64, 64));
        // The single remaining row sits in the middle of the canvas.
        assert_eq!(image.get_pixel(0, 0)[3], 0);
        assert_eq!(image.get_pixel(10, 31)[3], 255);
    }

    #[test]
    fn test_fit_within_keeps_aspect_ratio() {
        assert_eq!(fit_within(100, 50, 32), (32, 16));
        assert_eq!(fit_within(50, 100, 32), (16, 32));
        assert_eq!(fit_within(200_000, 1, 1024), (1024, 1));
        assert_eq!(fit_within(u32::MAX, u32::MAX, 1024), (1024, 1024));
    }

    #[tokio::test]
    async fn test_prepare_converts_jpeg_to_png() {
        let preparer = ImagePreparer::new(1024);
        let prepared = preparer.prepare(&jpeg_bytes(16, 16)).await.unwrap();
        assert_eq!(detect_image_mime(&prepared.png), "image/png");
    }

    #[tokio::test]
    async fn test_prepare_rejects_garbage() {
        let preparer = ImagePreparer::new(1024);
        let err = preparer.prepare(b"definitely not an image").await.unwrap_err();
        assert!(matches!(err, Error::BadRequest(_)));
    }
}
