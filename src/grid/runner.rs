//! Board analysis runner.
//!
//! Walks every room of the grid in ascending order, reading each cell's
//! color and text. A failure in one room becomes an error record for that
//! room and the run moves on; only problems that make the whole run
//! impossible are returned as errors.

use image::RgbaImage;
use log::{debug, error, info, warn};
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::locate::locate;
use super::record::{GridAnalysisResult, RoomCellRecord};
use super::throttle::{PauseEvery, Throttle};
use crate::color::{classify_sample, sample, ColorTable};
use crate::config::{validate_colors, BoardConfig, GridGeometry, ThrottleSettings};
use crate::error::{AnalysisError, CellError, Result};
use crate::ocr::{preprocess, EngineProvider, MonoBuffer, PatternMatcher, TextExtractor};

/// Cooperative cancellation flag, checked between rooms.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests that the run stop after the room in progress.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Analyzes a whole status board image.
#[derive(Clone, Debug)]
pub struct GridAnalyzer {
    grid: GridGeometry,
    colors: ColorTable,
    binarize_threshold: u8,
    throttle: ThrottleSettings,
    dump_cells_dir: Option<PathBuf>,
}

impl GridAnalyzer {
    pub fn new(config: &BoardConfig) -> Self {
        Self {
            grid: config.grid,
            colors: ColorTable::new(config.colors.clone()),
            binarize_threshold: config.binarize_threshold,
            throttle: config.throttle,
            dump_cells_dir: config.dump_cells_dir.clone(),
        }
    }

    pub fn grid(&self) -> GridGeometry {
        self.grid
    }

    /// Runs the analysis with the configured pause policy and no cancellation.
    pub fn analyze(&self, image: &RgbaImage, provider: &dyn EngineProvider) -> Result<GridAnalysisResult> {
        let mut throttle = PauseEvery::from(self.throttle);
        self.run(image, provider, &mut throttle, &CancelToken::new())
    }

    /// Runs the analysis.
    ///
    /// One OCR engine is acquired for the whole run and released when this
    /// returns, whether the run completed or was cancelled. On cancellation
    /// the records of the rooms finished so far are returned, still in
    /// ascending order.
    ///
    /// # Errors
    /// - [`AnalysisError::InvalidGeometry`] if the grid does not fit the image
    /// - [`AnalysisError::InvalidColors`] if the color table is malformed
    /// - [`AnalysisError::EngineAcquisition`] if no OCR engine can be started
    pub fn run(
        &self,
        image: &RgbaImage,
        provider: &dyn EngineProvider,
        throttle: &mut dyn Throttle,
        cancel: &CancelToken,
    ) -> Result<GridAnalysisResult> {
        let (width, height) = image.dimensions();
        self.grid.validate(width, height)?;
        validate_colors(self.colors.iter())?;

        let matcher = PatternMatcher::new()?;
        let mut extractor = TextExtractor::acquire(provider, matcher).map_err(|e| {
            error!("Cannot start OCR engine: {}", e);
            AnalysisError::EngineAcquisition(e)
        })?;

        let total = self.grid.room_count();
        info!(
            "Analyzing {}x{} board: {} floors x {} rooms",
            width, height, self.grid.floors, self.grid.rooms_per_floor
        );

        let mut records = Vec::with_capacity(total);
        for (index, room) in self.grid.room_numbers().enumerate() {
            if cancel.is_cancelled() {
                info!("Analysis cancelled after {}/{} rooms", index, total);
                break;
            }

            let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                self.process_room(image, room, &mut extractor)
            }))
            .unwrap_or_else(|payload| {
                Err(CellError::Panicked {
                    room,
                    message: panic_message(payload.as_ref()),
                })
            });

            let record = match outcome {
                Ok(record) => record,
                Err(e) => {
                    error!("Room {}: {}", room, e);
                    RoomCellRecord::failed(room, e.to_string())
                }
            };
            records.push(record);

            if index + 1 < total {
                throttle.after_room(index + 1);
            }
        }

        let result = GridAnalysisResult { records };
        info!(
            "Analysis finished: {} records, {} with errors",
            result.len(),
            result.errors()
        );
        Ok(result)
    }

    /// Reads one room's color and text.
    fn process_room(
        &self,
        image: &RgbaImage,
        room: u32,
        extractor: &mut TextExtractor,
    ) -> std::result::Result<RoomCellRecord, CellError> {
        let (width, height) = image.dimensions();
        let region = locate(room, width, height, self.grid.floors, self.grid.rooms_per_floor);
        if region.is_empty() {
            return Err(CellError::EmptyRegion { room });
        }

        let sampled = sample(image, &region);
        if sampled.is_empty() {
            warn!("Room {}: no sample point could be read", room);
        }
        let color = classify_sample(&self.colors, &sampled);

        let mono = preprocess(image, &region, self.binarize_threshold);
        self.dump_cell(room, &mono);

        let text = extractor.extract(&mono);
        if let Some(e) = &text.error {
            warn!("Room {}: text recognition failed: {}", room, e);
        }

        debug!(
            "Room {}: {} ({:.0}%), text {:?}",
            room, color.name, color.confidence, text.formatted
        );

        Ok(RoomCellRecord::new(room, color, text))
    }

    /// Saves the preprocessed cell for calibration, if enabled.
    fn dump_cell(&self, room: u32, mono: &MonoBuffer) {
        let Some(dir) = &self.dump_cells_dir else {
            return;
        };
        if let Err(e) = std::fs::create_dir_all(dir) {
            warn!("Room {}: failed to create {}: {}", room, dir.display(), e);
            return;
        }
        let path = dir.join(format!("cell_{}.png", room));
        if let Err(e) = mono.save(&path) {
            warn!("Room {}: failed to save {}: {}", room, path.display(), e);
        }
    }
}

/// Extracts the message from a panic payload.
pub fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}
