use image::{ImageBuffer, Rgb, RgbImage, RgbaImage};

use crate::grid::CellRect;

/// Binarized cell image handed to the OCR engine. Every pixel is pure black
/// or pure white, with the same value on all three channels.
pub type MonoBuffer = RgbImage;

/// Default luminance threshold: at or above is white, below is black.
pub const DEFAULT_THRESHOLD: u8 = 128;

/// ITU-R BT.601 luma of an RGB pixel, 0.0 to 255.0.
pub fn luminance(r: u8, g: u8, b: u8) -> f32 {
    0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32
}

/// Copies a cell out of the board into its own buffer.
///
/// The region is clamped to the image bounds; the source is never modified.
pub fn crop_cell(img: &RgbaImage, region: &CellRect) -> RgbaImage {
    let (w, h) = img.dimensions();

    let x0 = region.x.min(w);
    let y0 = region.y.min(h);
    let rw = region.width.min(w - x0);
    let rh = region.height.min(h - y0);

    image::imageops::crop_imm(img, x0, y0, rw, rh).to_image()
}

/// Converts an image to black and white by luminance.
///
/// Pixels with luminance >= threshold become white, the rest black. The
/// board prints dark text on a colored swatch, so the text ends up black
/// on white regardless of the swatch color.
pub fn binarize(img: &RgbaImage, threshold: u8) -> MonoBuffer {
    let (width, height) = img.dimensions();
    let threshold = threshold as f32;

    ImageBuffer::from_fn(width, height, |x, y| {
        let pixel = img.get_pixel(x, y);
        let value = if luminance(pixel[0], pixel[1], pixel[2]) >= threshold {
            255u8
        } else {
            0u8
        };
        Rgb([value, value, value])
    })
}

/// Extracts and binarizes one cell for text recognition.
pub fn preprocess(img: &RgbaImage, region: &CellRect, threshold: u8) -> MonoBuffer {
    binarize(&crop_cell(img, region), threshold)
}
