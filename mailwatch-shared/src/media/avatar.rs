/// Avatar image processing
///
/// Uploaded avatars are decoded (any format the `image` crate understands),
/// resized to fit within [`MAX_DIMENSION`] × [`MAX_DIMENSION`] with aspect
/// ratio preserved, and re-encoded as PNG so storage and serving deal with a
/// single format. Images already within bounds are re-encoded but not
/// resized.
///
/// # Example
///
/// ```no_run
/// use mailwatch_shared::media::avatar::process_avatar;
///
/// # fn example(upload: &[u8]) -> Result<(), Box<dyn std::error::Error>> {
/// let png = process_avatar(upload)?;
/// # Ok(())
/// # }
/// ```

use image::{imageops::FilterType, ImageOutputFormat};
use std::io::Cursor;

/// Maximum avatar width/height in pixels
pub const MAX_DIMENSION: u32 = 800;

/// Error type for avatar processing
#[derive(Debug, thiserror::Error)]
pub enum AvatarError {
    /// The payload is not a decodable image
    #[error("Could not decode image: {0}")]
    Decode(String),

    /// PNG encoding failed
    #[error("Could not encode image: {0}")]
    Encode(String),
}

/// Normalizes an uploaded avatar image
///
/// Decodes the payload, downscales it to fit within 800×800 using Lanczos3
/// resampling when it exceeds either bound, and returns PNG bytes.
///
/// # Errors
///
/// Returns [`AvatarError::Decode`] for payloads that are not images and
/// [`AvatarError::Encode`] if PNG encoding fails.
pub fn process_avatar(bytes: &[u8]) -> Result<Vec<u8>, AvatarError> {
    let img = image::load_from_memory(bytes).map_err(|e| AvatarError::Decode(e.to_string()))?;

    let img = if img.width() > MAX_DIMENSION || img.height() > MAX_DIMENSION {
        img.resize(MAX_DIMENSION, MAX_DIMENSION, FilterType::Lanczos3)
    } else {
        img
    };

    let mut out = Vec::new();
    img.write_to(&mut Cursor::new(&mut out), ImageOutputFormat::Png)
        .map_err(|e| AvatarError::Encode(e.to_string()))?;

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, RgbaImage};

    fn encode_png(img: RgbaImage) -> Vec<u8> {
        let mut out = Vec::new();
        DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut out), ImageOutputFormat::Png)
            .unwrap();
        out
    }

    #[test]
    fn test_oversized_image_is_resized_preserving_aspect() {
        let input = encode_png(RgbaImage::new(1000, 500));

        let output = process_avatar(&input).unwrap();
        let decoded = image::load_from_memory(&output).unwrap();

        assert_eq!(decoded.width(), 800);
        assert_eq!(decoded.height(), 400);
    }

    #[test]
    fn test_small_image_is_not_resized() {
        let input = encode_png(RgbaImage::new(120, 80));

        let output = process_avatar(&input).unwrap();
        let decoded = image::load_from_memory(&output).unwrap();

        assert_eq!(decoded.width(), 120);
        assert_eq!(decoded.height(), 80);
    }

    #[test]
    fn test_exact_bound_is_not_resized() {
        let input = encode_png(RgbaImage::new(800, 800));

        let output = process_avatar(&input).unwrap();
        let decoded = image::load_from_memory(&output).unwrap();

        assert_eq!(decoded.width(), 800);
        assert_eq!(decoded.height(), 800);
    }

    #[test]
    fn test_output_is_png() {
        let input = encode_png(RgbaImage::new(10, 10));

        let output = process_avatar(&input).unwrap();
        assert_eq!(image::guess_format(&output).unwrap(), image::ImageFormat::Png);
    }

    #[test]
    fn test_undecodable_payload_rejected() {
        let result = process_avatar(b"definitely not an image");
        assert!(matches!(result, Err(AvatarError::Decode(_))));
    }
}
