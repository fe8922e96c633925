use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::color::{ColorClassification, RgbTriple};
use crate::ocr::TextExtractionResult;

/// Structured reading of one room's cell.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomCellRecord {
    pub room_number: String,
    pub color: ColorClassification,
    pub text: TextExtractionResult,
    pub timestamp: DateTime<Utc>,
}

impl RoomCellRecord {
    pub fn new(room: u32, color: ColorClassification, text: TextExtractionResult) -> Self {
        Self {
            room_number: room.to_string(),
            color,
            text,
            timestamp: Utc::now(),
        }
    }

    /// Record for a room whose pipeline failed outright.
    pub fn failed(room: u32, message: impl Into<String>) -> Self {
        Self::new(
            room,
            ColorClassification::error(RgbTriple::BLACK),
            TextExtractionResult::failure(message),
        )
    }

    pub fn has_error(&self) -> bool {
        self.color.is_error() || self.text.error.is_some()
    }
}

/// All room records of a run, in ascending room order.
/// Serializes as a plain JSON array.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GridAnalysisResult {
    pub records: Vec<RoomCellRecord>,
}

impl GridAnalysisResult {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RoomCellRecord> {
        self.records.iter()
    }

    /// Looks up a record by room number.
    pub fn room(&self, room: u32) -> Option<&RoomCellRecord> {
        let key = room.to_string();
        self.records.iter().find(|r| r.room_number == key)
    }

    /// Number of rooms per color name.
    pub fn color_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for record in &self.records {
            *counts.entry(record.color.name.clone()).or_insert(0) += 1;
        }
        counts
    }

    /// Number of records carrying a color or text error.
    pub fn errors(&self) -> usize {
        self.records.iter().filter(|r| r.has_error()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocr::patterns::{PatternKind, PatternMatch};

    fn sample_record() -> RoomCellRecord {
        let color = ColorClassification {
            name: "red".to_string(),
            confidence: 92.5,
            rgb: RgbTriple::new(250, 3, 4),
        };
        let text = TextExtractionResult {
            raw_text: "DND".to_string(),
            confidence: 88.0,
            patterns: vec![PatternMatch {
                kind: PatternKind::Dnd,
                value: "DND".to_string(),
                position: 0,
            }],
            formatted: "DND".to_string(),
            error: None,
        };
        RoomCellRecord::new(101, color, text)
    }

    #[test]
    fn test_record_json_shape() {
        let value = serde_json::to_value(sample_record()).unwrap();

        assert_eq!(value["roomNumber"], "101");
        assert_eq!(value["color"]["name"], "red");
        assert_eq!(value["color"]["rgb"]["r"], 250);
        assert_eq!(value["text"]["rawText"], "DND");
        assert_eq!(value["text"]["patterns"][0]["type"], "DND");
        assert_eq!(value["text"]["patterns"][0]["position"], 0);
        assert!(value["text"].get("error").is_none());
        assert!(value["timestamp"].as_str().unwrap().contains('T'));
    }

    #[test]
    fn test_confidences_share_precision() {
        let mut record = sample_record();
        record.color.confidence = 87.3;
        record.text.confidence = 87.3;

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["color"]["confidence"].as_f64(), Some(87.3));
        assert_eq!(value["text"]["confidence"], value["color"]["confidence"]);
    }

    #[test]
    fn test_failed_record() {
        let record = RoomCellRecord::failed(305, "boom");
        assert_eq!(record.room_number, "305");
        assert_eq!(record.color.name, "error");
        assert_eq!(record.color.confidence, 0.0);
        assert_eq!(record.color.rgb, RgbTriple::BLACK);
        assert_eq!(record.text.error.as_deref(), Some("boom"));
        assert_eq!(record.text.raw_text, "");
        assert!(record.has_error());

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["text"]["error"], "boom");
    }

    #[test]
    fn test_result_serializes_as_array() {
        let result = GridAnalysisResult {
            records: vec![sample_record(), RoomCellRecord::failed(102, "x")],
        };
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value.as_array().map(|a| a.len()), Some(2));
    }

    #[test]
    fn test_summary_counts() {
        let result = GridAnalysisResult {
            records: vec![
                sample_record(),
                sample_record(),
                RoomCellRecord::failed(103, "x"),
            ],
        };
        let counts = result.color_counts();
        assert_eq!(counts.get("red"), Some(&2));
        assert_eq!(counts.get("error"), Some(&1));
        assert_eq!(result.errors(), 1);
        assert!(result.room(103).is_some());
        assert!(result.room(104).is_none());
    }
}
