use anyhow::Result;
use fast_image_resize::{images::Image, PixelType, ResizeOptions, Resizer};
use image::RgbaImage;

/// Resize an RGBA image to exact dimensions, ignoring aspect ratio.
///
/// Icon frames are square and fixed-size, so the source is stretched
/// rather than cropped.
pub fn resize_exact(img: &RgbaImage, width: u32, height: u32) -> Result<RgbaImage> {
    let (src_width, src_height) = img.dimensions();

    if src_width == 0 || src_height == 0 {
        anyhow::bail!("Source image is empty ({}x{})", src_width, src_height);
    }
    if width == 0 || height == 0 {
        anyhow::bail!("Target size must be non-zero, got {}x{}", width, height);
    }

    if src_width == width && src_height == height {
        return Ok(img.clone());
    }

    let src_image = Image::from_vec_u8(src_width, src_height, img.as_raw().clone(), PixelType::U8x4)?;
    let mut dst_image = Image::new(width, height, PixelType::U8x4);

    // Default options premultiply alpha, so transparent edges don't bleed color
    let mut resizer = Resizer::new();
    resizer.resize(&src_image, &mut dst_image, Some(&ResizeOptions::default()))?;

    RgbaImage::from_raw(width, height, dst_image.into_vec())
        .ok_or_else(|| anyhow::anyhow!("Resized buffer does not match {}x{}", width, height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgba};

    fn create_test_image(width: u32, height: u32) -> RgbaImage {
        ImageBuffer::from_fn(width, height, |x, y| {
            Rgba([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8, 255])
        })
    }

    #[test]
    fn test_resize_down() {
        let img = create_test_image(512, 300);
        let resized = resize_exact(&img, 256, 256).unwrap();
        assert_eq!(resized.dimensions(), (256, 256));
    }

    #[test]
    fn test_resize_up() {
        let img = create_test_image(16, 16);
        let resized = resize_exact(&img, 256, 256).unwrap();
        assert_eq!(resized.dimensions(), (256, 256));
        assert_eq!(resized.get_pixel(128, 128)[3], 255);
    }

    #[test]
    fn test_same_size_is_a_copy() {
        let img = create_test_image(32, 32);
        let resized = resize_exact(&img, 32, 32).unwrap();
        assert_eq!(resized, img);
    }

    #[test]
    fn test_zero_target_fails() {
        let img = create_test_image(32, 32);
        let err = resize_exact(&img, 0, 32).unwrap_err();
        assert!(err.to_string().contains("0x32"));
    }

    #[test]
    fn test_empty_source_fails() {
        let img = RgbaImage::new(0, 4);
        assert!(resize_exact(&img, 16, 16).is_err());
    }
}
