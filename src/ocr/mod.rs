//! Cell text recognition.
//!
//! A cell is cropped and binarized (`preprocess`), read by an OCR engine
//! owned for the whole run (`engine`, `extract`), and the text is scanned
//! for annotation codes (`patterns`).

pub mod engine;
pub mod extract;
pub mod patterns;
pub mod preprocess;
pub mod setup;

pub use engine::{EngineProvider, OcrEngine, OcrReading, TesseractEngine, TesseractProvider};
pub use extract::{TextExtractionResult, TextExtractor};
pub use patterns::{PatternKind, PatternMatch, PatternMatcher};
pub use preprocess::{preprocess, MonoBuffer};
