use thiserror::Error;

/// Failure of the OCR engine, either while acquiring it or during one
/// recognition call.
#[derive(Error, Debug)]
pub enum OcrError {
    #[error("Tesseract not found: {0}")]
    NotFound(String),

    #[error("Failed to launch Tesseract: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("Tesseract failed: {0}")]
    Failed(String),

    #[error("OCR scratch I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode cell image: {0}")]
    Image(#[from] image::ImageError),
}

/// Failure inside a single room's pipeline. Always contained by the runner.
#[derive(Error, Debug)]
pub enum CellError {
    #[error("room {room}: cell region is empty")]
    EmptyRegion { room: u32 },

    #[error("room {room}: processing panicked: {message}")]
    Panicked { room: u32, message: String },
}

/// Run-level failure. These are the only errors surfaced to the caller.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("invalid grid geometry: {0}")]
    InvalidGeometry(String),

    #[error("invalid color table: {0}")]
    InvalidColors(String),

    #[error("OCR engine could not be acquired: {0}")]
    EngineAcquisition(#[source] OcrError),

    #[error("invalid pattern rule: {0}")]
    Pattern(#[from] regex::Error),
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
