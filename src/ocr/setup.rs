//! Locating the Tesseract installation.

use log::{debug, info};
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::config::OcrSettings;
use crate::error::OcrError;

/// Environment variable that may point straight at the tesseract executable.
pub const TESSERACT_PATH_ENV: &str = "TESSERACT_PATH";

#[cfg(windows)]
const EXECUTABLE_NAME: &str = "tesseract.exe";
#[cfg(not(windows))]
const EXECUTABLE_NAME: &str = "tesseract";

#[cfg(windows)]
const COMMON_PATHS: &[&str] = &[
    r"C:\Program Files\Tesseract-OCR\tesseract.exe",
    r"C:\Program Files (x86)\Tesseract-OCR\tesseract.exe",
];
#[cfg(not(windows))]
const COMMON_PATHS: &[&str] = &[
    "/usr/bin/tesseract",
    "/usr/local/bin/tesseract",
    "/opt/homebrew/bin/tesseract",
];

/// Returns the per-user directory that may hold a private Tesseract copy.
pub fn get_tesseract_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("room-board")
        .join("tesseract")
}

/// Finds the Tesseract executable.
///
/// Checks, in order: the configured path, `TESSERACT_PATH`, the per-user
/// directory, the system `PATH`, then common install locations.
pub fn find_tesseract_executable(settings: &OcrSettings) -> Result<PathBuf, OcrError> {
    if let Some(path) = &settings.tesseract_path {
        if path.exists() {
            return Ok(path.clone());
        }
        return Err(OcrError::NotFound(format!(
            "configured path {} does not exist",
            path.display()
        )));
    }

    if let Ok(path) = std::env::var(TESSERACT_PATH_ENV) {
        let p = PathBuf::from(path);
        if p.exists() {
            return Ok(p);
        }
        debug!("{} points to missing {}", TESSERACT_PATH_ENV, p.display());
    }

    let local_exe = get_tesseract_dir().join(EXECUTABLE_NAME);
    if local_exe.exists() {
        return Ok(local_exe);
    }

    if tesseract_version(Path::new("tesseract")).is_ok() {
        return Ok(PathBuf::from("tesseract"));
    }

    for path in COMMON_PATHS {
        let p = PathBuf::from(path);
        if p.exists() {
            return Ok(p);
        }
    }

    Err(OcrError::NotFound(
        "install Tesseract-OCR or set TESSERACT_PATH".to_string(),
    ))
}

/// Runs `tesseract --version` and returns the first line of its output.
pub fn tesseract_version(executable: &Path) -> Result<String, OcrError> {
    let output = Command::new(executable)
        .arg("--version")
        .output()
        .map_err(OcrError::Spawn)?;

    if !output.status.success() {
        return Err(OcrError::Failed(
            String::from_utf8_lossy(&output.stderr).trim().to_string(),
        ));
    }

    // Older builds print the banner on stderr.
    let text = if output.stdout.is_empty() {
        String::from_utf8_lossy(&output.stderr).to_string()
    } else {
        String::from_utf8_lossy(&output.stdout).to_string()
    };
    Ok(text.lines().next().unwrap_or("tesseract").trim().to_string())
}

/// Finds a tessdata directory holding `<language>.traineddata`.
///
/// Returns `None` when nothing better than Tesseract's built-in default is
/// found.
pub fn find_tessdata_dir(settings: &OcrSettings) -> Option<PathBuf> {
    if let Some(dir) = &settings.tessdata_dir {
        return Some(dir.clone());
    }

    let traineddata = format!("{}.traineddata", settings.language);

    let local_tessdata = get_tesseract_dir().join("tessdata");
    if local_tessdata.join(&traineddata).exists() {
        info!("Using tessdata at {}", local_tessdata.display());
        return Some(local_tessdata);
    }

    if let Ok(prefix) = std::env::var("TESSDATA_PREFIX") {
        let p = PathBuf::from(&prefix);
        if p.join(&traineddata).exists() {
            return Some(p);
        }
        let p = p.join("tessdata");
        if p.join(&traineddata).exists() {
            return Some(p);
        }
    }

    None
}
