//! Configuration types for a board analysis run.
//!
//! Loaded from a JSON file. Every field has a default so a partial file
//! (or no file at all) still produces a usable configuration.

use anyhow::{Context, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::color::classify::{ERROR_COLOR, UNKNOWN_COLOR};
use crate::color::table::{default_definitions, ColorDefinition};
use crate::error::AnalysisError;

/// Largest room index a floor can hold under the `floor * 100 + index` numbering.
pub const MAX_ROOMS_PER_FLOOR: u32 = 99;

/// Floor/room layout of the status board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridGeometry {
    /// Number of floors (grid rows)
    pub floors: u32,
    /// Rooms on each floor (grid columns)
    pub rooms_per_floor: u32,
}

impl Default for GridGeometry {
    fn default() -> Self {
        Self {
            floors: 6,
            rooms_per_floor: 20,
        }
    }
}

impl GridGeometry {
    pub fn new(floors: u32, rooms_per_floor: u32) -> Self {
        Self {
            floors,
            rooms_per_floor,
        }
    }

    /// Total number of cells on the board.
    pub fn room_count(&self) -> usize {
        self.floors as usize * self.rooms_per_floor as usize
    }

    /// Room number for a zero-based cell index, in ascending board order.
    pub fn room_at(&self, index: usize) -> u32 {
        let per_floor = self.rooms_per_floor as usize;
        let floor = index / per_floor + 1;
        let room = index % per_floor + 1;
        (floor * 100 + room) as u32
    }

    /// All room numbers of the board in ascending order.
    pub fn room_numbers(&self) -> impl Iterator<Item = u32> + '_ {
        (0..self.room_count()).map(|i| self.room_at(i))
    }

    /// Checks the geometry itself and against the image it will be applied to.
    pub fn validate(&self, image_width: u32, image_height: u32) -> Result<(), AnalysisError> {
        if self.floors == 0 {
            return Err(AnalysisError::InvalidGeometry(
                "floors must be at least 1".to_string(),
            ));
        }
        if self.rooms_per_floor == 0 || self.rooms_per_floor > MAX_ROOMS_PER_FLOOR {
            return Err(AnalysisError::InvalidGeometry(format!(
                "rooms_per_floor must be between 1 and {}, got {}",
                MAX_ROOMS_PER_FLOOR, self.rooms_per_floor
            )));
        }
        if image_width < self.rooms_per_floor || image_height < self.floors {
            return Err(AnalysisError::InvalidGeometry(format!(
                "image {}x{} is smaller than the {}x{} grid",
                image_width, image_height, self.rooms_per_floor, self.floors
            )));
        }
        Ok(())
    }
}

/// Checks a color taxonomy before it is used for classification.
///
/// Names must be non-empty, unique and distinct from the `"unknown"` and
/// `"error"` sentinels. Every channel range must have `min <= max`.
pub fn validate_colors<'a>(
    colors: impl IntoIterator<Item = &'a ColorDefinition>,
) -> Result<(), AnalysisError> {
    let mut seen = HashSet::new();
    for def in colors {
        if def.name.is_empty() {
            return Err(AnalysisError::InvalidColors(
                "color name must not be empty".to_string(),
            ));
        }
        if def.name == UNKNOWN_COLOR || def.name == ERROR_COLOR {
            return Err(AnalysisError::InvalidColors(format!(
                "\"{}\" is a reserved color name",
                def.name
            )));
        }
        if !seen.insert(def.name.as_str()) {
            return Err(AnalysisError::InvalidColors(format!(
                "color \"{}\" is defined more than once",
                def.name
            )));
        }
        for (channel, [min, max]) in [("r", def.r), ("g", def.g), ("b", def.b)] {
            if min > max {
                return Err(AnalysisError::InvalidColors(format!(
                    "color \"{}\": {} range [{}, {}] is inverted",
                    def.name, channel, min, max
                )));
            }
        }
    }
    Ok(())
}

/// Settings handed to the Tesseract adapter.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OcrSettings {
    /// Explicit path to the tesseract executable; searched for when unset
    #[serde(default)]
    pub tesseract_path: Option<PathBuf>,
    /// Explicit tessdata directory; Tesseract's own default when unset
    #[serde(default)]
    pub tessdata_dir: Option<PathBuf>,
    #[serde(default = "default_language")]
    pub language: String,
    /// Page segmentation mode. 7 = treat the image as a single text line.
    #[serde(default = "default_page_seg_mode")]
    pub page_seg_mode: u8,
    /// Characters the recognizer is allowed to emit
    #[serde(default = "default_char_whitelist")]
    pub char_whitelist: String,
}

fn default_language() -> String {
    "eng".to_string()
}

fn default_page_seg_mode() -> u8 {
    7
}

fn default_char_whitelist() -> String {
    "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz: ".to_string()
}

impl Default for OcrSettings {
    fn default() -> Self {
        Self {
            tesseract_path: None,
            tessdata_dir: None,
            language: default_language(),
            page_seg_mode: default_page_seg_mode(),
            char_whitelist: default_char_whitelist(),
        }
    }
}

/// Cooperative pause inserted between rooms to keep OCR load steady.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThrottleSettings {
    /// Pause after every `every` rooms; 0 disables throttling
    pub every: usize,
    pub pause_ms: u64,
}

impl Default for ThrottleSettings {
    fn default() -> Self {
        Self {
            every: 10,
            pause_ms: 50,
        }
    }
}

/// Complete analysis configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoardConfig {
    #[serde(default)]
    pub grid: GridGeometry,
    /// Color taxonomy; replaces the built-in table when present
    #[serde(default = "default_definitions")]
    pub colors: Vec<ColorDefinition>,
    #[serde(default)]
    pub ocr: OcrSettings,
    /// Luminance at or above this becomes white in the OCR input
    #[serde(default = "default_binarize_threshold")]
    pub binarize_threshold: u8,
    #[serde(default)]
    pub throttle: ThrottleSettings,
    /// When set, every preprocessed cell is written here as `cell_<room>.png`
    #[serde(default)]
    pub dump_cells_dir: Option<PathBuf>,
}

fn default_binarize_threshold() -> u8 {
    128
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            grid: GridGeometry::default(),
            colors: default_definitions(),
            ocr: OcrSettings::default(),
            binarize_threshold: default_binarize_threshold(),
            throttle: ThrottleSettings::default(),
            dump_cells_dir: None,
        }
    }
}

impl BoardConfig {
    /// Reads, parses and validates a JSON config file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: BoardConfig = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("Invalid config {}", path.display()))?;
        Ok(config)
    }

    /// Checks the parts of the config that do not depend on the image.
    /// Grid geometry is checked against the image when a run starts.
    pub fn validate(&self) -> Result<(), AnalysisError> {
        validate_colors(&self.colors)
    }

    /// Loads the config file if it exists, otherwise returns defaults.
    /// Read or parse failures are logged and also fall back to defaults.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            info!("{} not found. Using default config.", path.display());
            return Self::default();
        }

        match Self::load(path) {
            Ok(config) => {
                info!("Config loaded from {}", path.display());
                config
            }
            Err(e) => {
                warn!("{:#}. Using defaults.", e);
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_room_numbers_ascending() {
        let grid = GridGeometry::new(2, 3);
        let rooms: Vec<u32> = grid.room_numbers().collect();
        assert_eq!(rooms, vec![101, 102, 103, 201, 202, 203]);
    }

    #[test]
    fn test_validate_rejects_bad_geometry() {
        assert!(GridGeometry::new(0, 20).validate(100, 100).is_err());
        assert!(GridGeometry::new(6, 0).validate(100, 100).is_err());
        assert!(GridGeometry::new(6, 100).validate(1000, 100).is_err());
        assert!(GridGeometry::new(6, 20).validate(10, 100).is_err());
        assert!(GridGeometry::new(6, 20).validate(200, 60).is_ok());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{ "grid": {{ "floors": 3, "rooms_per_floor": 8 }} }}"#).unwrap();

        let config = BoardConfig::load(file.path()).unwrap();
        assert_eq!(config.grid, GridGeometry::new(3, 8));
        assert_eq!(config.binarize_threshold, 128);
        assert_eq!(config.ocr.page_seg_mode, 7);
        assert_eq!(config.colors, default_definitions());
    }

    #[test]
    fn test_invalid_config_falls_back() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        assert!(BoardConfig::load(file.path()).is_err());
        assert_eq!(BoardConfig::load_or_default(file.path()), BoardConfig::default());
    }

    fn color_error(colors: Vec<ColorDefinition>) -> String {
        match validate_colors(&colors) {
            Err(AnalysisError::InvalidColors(message)) => message,
            other => panic!("expected InvalidColors, got {:?}", other),
        }
    }

    #[test]
    fn test_default_colors_are_valid() {
        assert!(validate_colors(&default_definitions()).is_ok());
        assert!(BoardConfig::default().validate().is_ok());
    }

    #[test]
    fn test_reserved_color_names_rejected() {
        let message = color_error(vec![ColorDefinition::new("unknown", [0, 255], [0, 255], [0, 255], 1)]);
        assert!(message.contains("reserved"), "{}", message);

        let message = color_error(vec![ColorDefinition::new("error", [0, 10], [0, 10], [0, 10], 1)]);
        assert!(message.contains("reserved"), "{}", message);
    }

    #[test]
    fn test_inverted_range_rejected() {
        let message = color_error(vec![ColorDefinition::new("inverted", [200, 10], [0, 255], [0, 255], 1)]);
        assert!(message.contains("r range [200, 10]"), "{}", message);

        let message = color_error(vec![ColorDefinition::new("teal", [0, 30], [120, 160], [160, 120], 1)]);
        assert!(message.contains("b range"), "{}", message);
    }

    #[test]
    fn test_duplicate_and_empty_names_rejected() {
        let message = color_error(vec![
            ColorDefinition::new("red", [220, 255], [0, 20], [0, 20], 1),
            ColorDefinition::new("red", [200, 255], [0, 40], [0, 40], 2),
        ]);
        assert!(message.contains("more than once"), "{}", message);

        let message = color_error(vec![ColorDefinition::new("", [0, 10], [0, 10], [0, 10], 1)]);
        assert!(message.contains("empty"), "{}", message);
    }

    #[test]
    fn test_load_rejects_reserved_color() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "colors": [{{ "name": "unknown", "r": [0, 255], "g": [0, 255], "b": [0, 255], "priority": 1 }}] }}"#
        )
        .unwrap();

        let err = BoardConfig::load(file.path()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AnalysisError>(),
            Some(AnalysisError::InvalidColors(_))
        ));
        assert_eq!(BoardConfig::load_or_default(file.path()), BoardConfig::default());
    }

    #[test]
    fn test_missing_config_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let config = BoardConfig::load_or_default(&dir.path().join("config.json"));
        assert_eq!(config, BoardConfig::default());
    }
}
