//! Room status board reader.
//!
//! Turns an image of a hotel room-status board, a fixed grid with one cell
//! per room, into one structured record per room: the cell's background
//! color classified against a configurable palette, and the text written
//! in the cell with any annotation codes (DND, times, VIP, ...) extracted.
//!
//! ```no_run
//! use room_board::{BoardConfig, GridAnalyzer, TesseractProvider};
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = BoardConfig::default();
//! let image = image::open("board.png")?.to_rgba8();
//! let provider = TesseractProvider::new(config.ocr.clone());
//! let result = GridAnalyzer::new(&config).analyze(&image, &provider)?;
//! println!("{}", serde_json::to_string_pretty(&result)?);
//! # Ok(())
//! # }
//! ```

pub mod color;
pub mod config;
pub mod error;
pub mod grid;
pub mod ocr;

pub use color::{ColorClassification, ColorDefinition, ColorTable, RgbTriple};
pub use config::{BoardConfig, GridGeometry, OcrSettings, ThrottleSettings};
pub use error::{AnalysisError, CellError, OcrError};
pub use grid::{panic_message, CancelToken, CellRect, GridAnalysisResult, GridAnalyzer, RoomCellRecord};
pub use ocr::{EngineProvider, OcrEngine, PatternKind, PatternMatch, TesseractProvider, TextExtractionResult};
