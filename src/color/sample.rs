use image::RgbaImage;
use log::debug;

use super::RgbTriple;
use crate::grid::CellRect;

/// Fractional offsets along each axis of a cell. Their cross product gives
/// 16 points that stay clear of the cell borders.
pub const SAMPLE_OFFSETS: [f64; 4] = [0.2, 0.4, 0.6, 0.8];

/// Averaged color of a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SampleResult {
    /// Per-channel mean, rounded. Black when `points == 0`.
    pub rgb: RgbTriple,
    /// Number of sample points that could be read
    pub points: usize,
}

impl SampleResult {
    /// True when no sample point could be read.
    pub fn is_empty(&self) -> bool {
        self.points == 0
    }
}

/// Pixel coordinates of the sample points for a region, row by row.
pub fn sample_points(region: &CellRect) -> impl Iterator<Item = (u32, u32)> + '_ {
    SAMPLE_OFFSETS.iter().flat_map(move |fy| {
        SAMPLE_OFFSETS.iter().map(move |fx| {
            let x = region.x + (region.width as f64 * fx).floor() as u32;
            let y = region.y + (region.height as f64 * fy).floor() as u32;
            (x, y)
        })
    })
}

/// Averages the 4x4 sample grid of `region`.
///
/// Points that fall outside the image are skipped. If none can be read the
/// result has `points == 0`, which the classifier reports as `"error"`.
pub fn sample(img: &RgbaImage, region: &CellRect) -> SampleResult {
    let mut sum = [0u64; 3];
    let mut points = 0usize;

    for (x, y) in sample_points(region) {
        match img.get_pixel_checked(x, y) {
            Some(pixel) => {
                sum[0] += pixel[0] as u64;
                sum[1] += pixel[1] as u64;
                sum[2] += pixel[2] as u64;
                points += 1;
            }
            None => {
                debug!("Sample point ({}, {}) is outside the image, skipping", x, y);
            }
        }
    }

    if points == 0 {
        return SampleResult {
            rgb: RgbTriple::BLACK,
            points: 0,
        };
    }

    let mean = |total: u64| (total as f64 / points as f64).round() as u8;
    SampleResult {
        rgb: RgbTriple::new(mean(sum[0]), mean(sum[1]), mean(sum[2])),
        points,
    }
}
