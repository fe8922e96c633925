use serde::{Deserialize, Serialize};

use super::RgbTriple;

/// A named RGB-range rule. A color matches when every channel falls inside
/// its inclusive `[min, max]` range. Lower `priority` wins among matches.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColorDefinition {
    pub name: String,
    pub r: [u8; 2],
    pub g: [u8; 2],
    pub b: [u8; 2],
    pub priority: u32,
}

impl ColorDefinition {
    pub fn new(name: &str, r: [u8; 2], g: [u8; 2], b: [u8; 2], priority: u32) -> Self {
        Self {
            name: name.to_string(),
            r,
            g,
            b,
            priority,
        }
    }

    /// True if every channel of `rgb` lies within this definition's ranges.
    pub fn contains(&self, rgb: RgbTriple) -> bool {
        in_range(rgb.r, self.r) && in_range(rgb.g, self.g) && in_range(rgb.b, self.b)
    }

    /// Center of the range box.
    pub fn midpoint(&self) -> [f64; 3] {
        [mid(self.r), mid(self.g), mid(self.b)]
    }

    /// Euclidean distance from `rgb` to the range midpoint.
    pub fn distance_to(&self, rgb: RgbTriple) -> f64 {
        let [mr, mg, mb] = self.midpoint();
        let dr = rgb.r as f64 - mr;
        let dg = rgb.g as f64 - mg;
        let db = rgb.b as f64 - mb;
        (dr * dr + dg * dg + db * db).sqrt()
    }
}

fn in_range(value: u8, [min, max]: [u8; 2]) -> bool {
    value >= min && value <= max
}

fn mid([min, max]: [u8; 2]) -> f64 {
    (min as f64 + max as f64) / 2.0
}

/// Built-in status board palette.
///
/// Ranges hug the saturated swatch colors the board is printed with, so a
/// clean swatch scores above 90 confidence.
pub fn default_definitions() -> Vec<ColorDefinition> {
    vec![
        ColorDefinition::new("red", [220, 255], [0, 20], [0, 20], 1),
        ColorDefinition::new("green", [0, 20], [220, 255], [0, 20], 2),
        ColorDefinition::new("blue", [0, 20], [0, 20], [220, 255], 3),
        ColorDefinition::new("yellow", [220, 255], [220, 255], [0, 40], 4),
        ColorDefinition::new("orange", [220, 255], [100, 180], [0, 40], 5),
        ColorDefinition::new("white", [230, 255], [230, 255], [230, 255], 6),
        ColorDefinition::new("gray", [100, 180], [100, 180], [100, 180], 7),
        ColorDefinition::new("black", [0, 40], [0, 40], [0, 40], 8),
    ]
}

/// Immutable catalog of color definitions, built once per run.
#[derive(Clone, Debug, PartialEq)]
pub struct ColorTable {
    definitions: Vec<ColorDefinition>,
}

impl Default for ColorTable {
    fn default() -> Self {
        Self::new(default_definitions())
    }
}

impl ColorTable {
    pub fn new(definitions: Vec<ColorDefinition>) -> Self {
        Self { definitions }
    }

    pub fn get(&self, name: &str) -> Option<&ColorDefinition> {
        self.definitions.iter().find(|d| d.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ColorDefinition> {
        self.definitions.iter()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_is_inclusive() {
        let def = ColorDefinition::new("x", [10, 20], [10, 20], [10, 20], 1);
        assert!(def.contains(RgbTriple::new(10, 20, 15)));
        assert!(!def.contains(RgbTriple::new(9, 15, 15)));
        assert!(!def.contains(RgbTriple::new(15, 15, 21)));
    }

    #[test]
    fn test_distance_to_midpoint() {
        let def = ColorDefinition::new("x", [0, 20], [0, 20], [0, 20], 1);
        assert_eq!(def.midpoint(), [10.0, 10.0, 10.0]);
        assert_eq!(def.distance_to(RgbTriple::new(10, 10, 10)), 0.0);
        assert_eq!(def.distance_to(RgbTriple::new(13, 14, 10)), 5.0);
    }

    #[test]
    fn test_lookup_by_name() {
        let table = ColorTable::default();
        assert_eq!(table.len(), 8);
        assert_eq!(table.get("red").map(|d| d.priority), Some(1));
        assert!(table.get("magenta").is_none());
    }

    #[test]
    fn test_definition_json_shape() {
        let json = r#"{"name":"teal","r":[0,30],"g":[120,160],"b":[120,160],"priority":9}"#;
        let def: ColorDefinition = serde_json::from_str(json).unwrap();
        assert_eq!(def, ColorDefinition::new("teal", [0, 30], [120, 160], [120, 160], 9));
    }
}
