use log::debug;
use serde::{Deserialize, Serialize};

use super::engine::{EngineProvider, OcrEngine};
use super::patterns::{format_matches, PatternMatch, PatternMatcher};
use super::preprocess::MonoBuffer;
use crate::error::OcrError;

/// Text reading of one cell.
///
/// On failure `error` is set and every other field is empty or zero.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextExtractionResult {
    /// Recognized text, trimmed, whitespace runs collapsed to one space
    pub raw_text: String,
    pub confidence: f64,
    pub patterns: Vec<PatternMatch>,
    /// Matched values joined by spaces, or `raw_text` when nothing matched
    pub formatted: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TextExtractionResult {
    /// Builds a result from recognized text, running the pattern table over it.
    pub fn from_text(text: &str, confidence: f64, matcher: &PatternMatcher) -> Self {
        let raw_text = normalize_whitespace(text);
        let patterns = matcher.find(&raw_text);
        let formatted = format_matches(&patterns, &raw_text);
        Self {
            raw_text,
            confidence,
            patterns,
            formatted,
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::default()
        }
    }
}

/// Trims and collapses every whitespace run (including newlines) to one space.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Owns the OCR engine for one analysis run.
///
/// The engine is released when the extractor is dropped.
pub struct TextExtractor {
    engine: Box<dyn OcrEngine>,
    matcher: PatternMatcher,
}

impl TextExtractor {
    pub fn new(engine: Box<dyn OcrEngine>, matcher: PatternMatcher) -> Self {
        Self { engine, matcher }
    }

    /// Acquires an engine from `provider`.
    pub fn acquire(provider: &dyn EngineProvider, matcher: PatternMatcher) -> Result<Self, OcrError> {
        Ok(Self::new(provider.acquire()?, matcher))
    }

    /// Recognizes the text of a preprocessed cell. Engine failures are
    /// reported in the result's `error` field, never returned.
    pub fn extract(&mut self, image: &MonoBuffer) -> TextExtractionResult {
        match self.engine.recognize(image) {
            Ok(reading) => {
                TextExtractionResult::from_text(&reading.text, reading.confidence, &self.matcher)
            }
            Err(e) => {
                debug!("Text recognition failed: {}", e);
                TextExtractionResult::failure(e.to_string())
            }
        }
    }
}
