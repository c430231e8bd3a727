//! Capture validation utilities.
//!
//! Checks that captured buffers are well-formed JPEG files and that the
//! decoded picture contains an expected test pattern. Useful for
//! integration testing with virtual cameras.

use image::{ImageFormat, RgbImage};

use crate::traits::{CameraError, Result};

/// Expected RGB values for SMPTE color bars (8 bars).
///
/// Colors in order: White, Yellow, Cyan, Green, Magenta, Red, Blue, Black
const SMPTE_COLOR_BARS: [(u8, u8, u8); 8] = [
    (235, 235, 235), // White
    (235, 235, 11),  // Yellow
    (12, 236, 237),  // Cyan
    (13, 237, 13),   // Green
    (237, 13, 237),  // Magenta
    (238, 14, 13),   // Red
    (15, 15, 239),   // Blue
    (16, 16, 16),    // Black
];

/// Tolerance for RGB color matching (YUV conversion plus JPEG loss).
const COLOR_TOLERANCE: i32 = 24;

const JPEG_SOI: [u8; 2] = [0xFF, 0xD8];
const JPEG_EOI: [u8; 2] = [0xFF, 0xD9];

/// Validates that `data` is a complete, decodable JPEG file.
///
/// # Returns
///
/// The decoded picture dimensions as `(width, height)`.
///
/// # Errors
///
/// Returns `StreamError` if the start/end of image markers are missing, or
/// `Image` if the data cannot be decoded.
pub fn validate_jpeg(data: &[u8]) -> Result<(u32, u32)> {
    if !data.starts_with(&JPEG_SOI) {
        return Err(CameraError::StreamError(
            "Capture does not start with a JPEG SOI marker".to_owned(),
        ));
    }
    if !data.ends_with(&JPEG_EOI) {
        return Err(CameraError::StreamError(
            "Capture does not end with a JPEG EOI marker".to_owned(),
        ));
    }

    let image = image::load_from_memory_with_format(data, ImageFormat::Jpeg)?;
    Ok((image.width(), image.height()))
}

/// Validates that an image contains the SMPTE color bar pattern.
///
/// Samples the center of each of the 8 vertical stripes on the middle row.
///
/// # Errors
///
/// Returns `StreamError` if any color bar doesn't match the expected color
/// within tolerance.
pub fn validate_color_bars(image: &RgbImage) -> Result<()> {
    let (width, height) = image.dimensions();
    let bar_width = width / 8;
    let center_y = height / 2;

    for (bar_idx, expected_rgb) in SMPTE_COLOR_BARS.iter().enumerate() {
        #[allow(clippy::cast_possible_truncation)]
        let sample_x = (bar_idx as u32 * bar_width) + (bar_width / 2);

        let pixel = image.get_pixel_checked(sample_x, center_y).ok_or_else(|| {
            CameraError::StreamError(format!(
                "Failed to get pixel at ({sample_x}, {center_y})"
            ))
        })?;
        let [r, g, b] = pixel.0;
        let actual_rgb = (r, g, b);

        if !colors_match(actual_rgb, *expected_rgb, COLOR_TOLERANCE) {
            return Err(CameraError::StreamError(format!(
                "Color bar {bar_idx} mismatch at ({sample_x}, {center_y}): \
                 expected RGB{expected_rgb:?}, got RGB{actual_rgb:?}"
            )));
        }
    }

    Ok(())
}

/// Check if two RGB colors match within a per-channel tolerance.
fn colors_match(actual: (u8, u8, u8), expected: (u8, u8, u8), tolerance: i32) -> bool {
    let (ar, ag, ab) = actual;
    let (er, eg, eb) = expected;

    let r_diff = i32::from(ar).abs_diff(i32::from(er));
    let g_diff = i32::from(ag).abs_diff(i32::from(eg));
    let b_diff = i32::from(ab).abs_diff(i32::from(eb));

    #[allow(clippy::cast_sign_loss)]
    let tol = tolerance as u32;

    r_diff <= tol && g_diff <= tol && b_diff <= tol
}
