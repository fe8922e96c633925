//! Cell background color reading.
//!
//! A cell's color is read by averaging a fixed grid of sample points
//! (`sample`) and matching the average against a static table of named
//! RGB ranges (`table`, `classify`).

pub mod classify;
pub mod sample;
pub mod table;

pub use classify::{classify, classify_sample, ColorClassification, ERROR_COLOR, UNKNOWN_COLOR};
pub use sample::{sample, SampleResult};
pub use table::{ColorDefinition, ColorTable};

use serde::{Deserialize, Serialize};

/// An 8-bit RGB triple, serialized as `{"r":..,"g":..,"b":..}`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RgbTriple {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl RgbTriple {
    pub const BLACK: RgbTriple = RgbTriple { r: 0, g: 0, b: 0 };

    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}
