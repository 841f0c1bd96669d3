//! Image processing operations.

use std::io::Cursor;

use image::{GenericImageView, ImageFormat};

use crate::error::{BannerError, Result};
use crate::model::AspectRatio;

/// Center-crops image bytes to the target aspect ratio and re-encodes as PNG.
///
/// The crop keeps the largest centered region matching the ratio; no scaling
/// is applied.
///
/// # Errors
///
/// Returns an error if the bytes cannot be decoded as an image or the PNG
/// encode fails.
pub fn fit_to_aspect(bytes: &[u8], aspect_ratio: AspectRatio) -> Result<Vec<u8>> {
    let img = image::load_from_memory(bytes)
        .map_err(|e| BannerError::ImageProcessing(format!("decode failed: {e}")))?;

    let (w, h) = img.dimensions();
    let target = aspect_ratio.ratio();
    let current = f64::from(w) / f64::from(h);

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let (crop_w, crop_h) = if current > target {
        // Wider than target: full height, trim the sides.
        (((f64::from(h) * target).round() as u32).clamp(1, w), h)
    } else {
        // Taller than target: full width, trim top and bottom.
        (w, ((f64::from(w) / target).round() as u32).clamp(1, h))
    };

    let x = (w - crop_w) / 2;
    let y = (h - crop_h) / 2;
    let cropped = img.crop_imm(x, y, crop_w, crop_h);

    let mut out = Cursor::new(Vec::new());
    cropped
        .write_to(&mut out, ImageFormat::Png)
        .map_err(|e| BannerError::ImageProcessing(format!("PNG encode failed: {e}")))?;
    Ok(out.into_inner())
}
