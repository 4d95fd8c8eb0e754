//! Display thumbnails for the preview sink.

use crate::decode::DecodedImage;
use image::{imageops::FilterType, DynamicImage, RgbaImage};

/// Scale a decoded image down to fit within `max_size`×`max_size` and coerce
/// it into 8-bit RGBA for display.
///
/// Aspect ratio is preserved and images already inside the box are not
/// enlarged.
pub fn thumbnail(image: &DecodedImage, max_size: u32) -> RgbaImage {
    let display = DynamicImage::ImageRgba16(image.buffer().clone()).to_rgba8();
    let (width, height) = display.dimensions();
    let max_size = max_size.max(1);

    if width <= max_size && height <= max_size {
        return display;
    }

    let (new_width, new_height) = fit_within(width, height, max_size);
    image::imageops::resize(&display, new_width, new_height, FilterType::Lanczos3)
}

/// Largest size with the same aspect ratio that fits in the box.
fn fit_within(width: u32, height: u32, max_size: u32) -> (u32, u32) {
    let scale = f64::min(
        max_size as f64 / width as f64,
        max_size as f64 / height as f64,
    );
    let w = ((width as f64 * scale).round() as u32).clamp(1, max_size);
    let h = ((height as f64 * scale).round() as u32).clamp(1, max_size);
    (w, h)
}
