//! Board-level processing.
//!
//! This module provides:
//! - Room number to cell region mapping (`locate`)
//! - Per-room output records (`record`)
//! - The run over every room with fault isolation (`runner`)
//! - Pluggable pacing between rooms (`throttle`)

pub mod locate;
pub mod record;
pub mod runner;
pub mod throttle;

pub use locate::{locate, CellRect};
pub use record::{GridAnalysisResult, RoomCellRecord};
pub use runner::{panic_message, CancelToken, GridAnalyzer};
pub use throttle::{NoThrottle, PauseEvery, Throttle};
