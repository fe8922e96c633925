use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use super::sample::SampleResult;
use super::table::{ColorDefinition, ColorTable};
use super::RgbTriple;

/// Name reported when no definition's ranges contain the sample.
pub const UNKNOWN_COLOR: &str = "unknown";

/// Name reported when the cell could not be sampled or processed.
pub const ERROR_COLOR: &str = "error";

/// Named color reading of one cell.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColorClassification {
    pub name: String,
    /// 0-100, derived from the distance to the winning range's midpoint
    pub confidence: f64,
    pub rgb: RgbTriple,
}

impl ColorClassification {
    pub fn unknown(rgb: RgbTriple) -> Self {
        Self {
            name: UNKNOWN_COLOR.to_string(),
            confidence: 0.0,
            rgb,
        }
    }

    pub fn error(rgb: RgbTriple) -> Self {
        Self {
            name: ERROR_COLOR.to_string(),
            confidence: 0.0,
            rgb,
        }
    }

    pub fn is_error(&self) -> bool {
        self.name == ERROR_COLOR
    }
}

/// Maps a midpoint distance to a 0-100 confidence score.
pub fn confidence_from_distance(distance: f64) -> f64 {
    (100.0 - distance / 255.0 * 100.0).clamp(0.0, 100.0)
}

/// Classifies an RGB triple against the table.
///
/// Among the definitions whose ranges contain `rgb`, the one with the lowest
/// priority number wins; distance to the range midpoint only breaks ties
/// between equal priorities. A closer match with a higher priority number
/// therefore loses.
pub fn classify(table: &ColorTable, rgb: RgbTriple) -> ColorClassification {
    let best = table
        .iter()
        .filter(|def| def.contains(rgb))
        .map(|def| (def, def.distance_to(rgb)))
        .min_by(|a, b| rank(a, b));

    match best {
        Some((def, distance)) => ColorClassification {
            name: def.name.clone(),
            confidence: confidence_from_distance(distance),
            rgb,
        },
        None => ColorClassification::unknown(rgb),
    }
}

/// Classifies a sampled cell, mapping an empty sample to `"error"`.
pub fn classify_sample(table: &ColorTable, sample: &SampleResult) -> ColorClassification {
    if sample.is_empty() {
        return ColorClassification::error(sample.rgb);
    }
    classify(table, sample.rgb)
}

fn rank(a: &(&ColorDefinition, f64), b: &(&ColorDefinition, f64)) -> Ordering {
    a.0.priority
        .cmp(&b.0.priority)
        .then_with(|| a.1.total_cmp(&b.1))
}
