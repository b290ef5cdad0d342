/// QR code rendering
///
/// Renders request data as a QR code PNG: error correction level L, 10-pixel
/// modules, and a 4-module quiet zone. The matrix comes from the `qrcode`
/// crate and is drawn into an `image` buffer here, which keeps the two
/// crates' versions independent.
///
/// # Example
///
/// ```
/// use mailwatch_shared::media::qr::generate_png;
///
/// let png = generate_png("https://mailwatch.example").unwrap();
/// assert!(!png.is_empty());
/// ```

use image::{GrayImage, ImageOutputFormat, Luma};
use qrcode::{Color, EcLevel, QrCode};
use std::io::Cursor;

/// Pixel size of one QR module
pub const MODULE_SIZE: u32 = 10;

/// Quiet-zone width around the code, in modules
pub const QUIET_ZONE: u32 = 4;

/// Error type for QR generation
#[derive(Debug, thiserror::Error)]
pub enum QrError {
    /// The data does not fit in a QR code
    #[error("Could not encode data as QR code: {0}")]
    Encode(String),

    /// PNG encoding failed
    #[error("Could not encode QR image: {0}")]
    Png(String),
}

/// Renders `data` as a black-on-white QR code PNG
///
/// # Errors
///
/// Returns [`QrError::Encode`] when the payload exceeds QR capacity and
/// [`QrError::Png`] if PNG encoding fails.
pub fn generate_png(data: &str) -> Result<Vec<u8>, QrError> {
    let code = QrCode::with_error_correction_level(data.as_bytes(), EcLevel::L)
        .map_err(|e| QrError::Encode(e.to_string()))?;

    let modules = code.width() as u32;
    let size = (modules + 2 * QUIET_ZONE) * MODULE_SIZE;

    let mut img = GrayImage::from_pixel(size, size, Luma([255u8]));

    for y in 0..modules {
        for x in 0..modules {
            if code[(x as usize, y as usize)] == Color::Dark {
                let x0 = (x + QUIET_ZONE) * MODULE_SIZE;
                let y0 = (y + QUIET_ZONE) * MODULE_SIZE;
                for dy in 0..MODULE_SIZE {
                    for dx in 0..MODULE_SIZE {
                        img.put_pixel(x0 + dx, y0 + dy, Luma([0u8]));
                    }
                }
            }
        }
    }

    let mut out = Vec::new();
    image::DynamicImage::ImageLuma8(img)
        .write_to(&mut Cursor::new(&mut out), ImageOutputFormat::Png)
        .map_err(|e| QrError::Png(e.to_string()))?;

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generates_valid_png() {
        let png = generate_png("hello world").unwrap();
        assert_eq!(image::guess_format(&png).unwrap(), image::ImageFormat::Png);
    }

    #[test]
    fn test_image_is_square_with_quiet_zone() {
        let png = generate_png("hello").unwrap();
        let img = image::load_from_memory(&png).unwrap();

        assert_eq!(img.width(), img.height());
        // At least version 1 (21 modules) plus the quiet zone on both sides
        assert!(img.width() >= (21 + 2 * QUIET_ZONE) * MODULE_SIZE);
        assert_eq!(img.width() % MODULE_SIZE, 0);
    }

    #[test]
    fn test_contains_dark_and_light_pixels() {
        let png = generate_png("contrast").unwrap();
        let img = image::load_from_memory(&png).unwrap().to_luma8();

        let mut has_dark = false;
        let mut has_light = false;
        for pixel in img.pixels() {
            match pixel.0[0] {
                0 => has_dark = true,
                255 => has_light = true,
                _ => {}
            }
        }

        assert!(has_dark && has_light);
    }

    #[test]
    fn test_oversized_payload_rejected() {
        // QR capacity at EC level L tops out under 3 KB
        let data = "x".repeat(8000);
        assert!(matches!(generate_png(&data), Err(QrError::Encode(_))));
    }
}
