//! OCR engine abstraction and the Tesseract command-line adapter.
//!
//! An engine is acquired once per run through an [`EngineProvider`] and
//! released when the boxed engine is dropped.

use log::{debug, info};
use std::path::PathBuf;
use std::process::Command;
use tempfile::TempDir;

use super::preprocess::MonoBuffer;
use super::setup::{find_tessdata_dir, find_tesseract_executable, tesseract_version};
use crate::config::OcrSettings;
use crate::error::OcrError;

/// Raw output of one recognition call.
#[derive(Debug, Clone, PartialEq)]
pub struct OcrReading {
    pub text: String,
    /// Engine-reported confidence, 0-100
    pub confidence: f64,
}

impl OcrReading {
    pub fn new(text: impl Into<String>, confidence: f64) -> Self {
        Self {
            text: text.into(),
            confidence,
        }
    }
}

/// A text recognizer. Implementations are not required to be safe for
/// concurrent calls, so recognition takes `&mut self`.
pub trait OcrEngine {
    fn recognize(&mut self, image: &MonoBuffer) -> Result<OcrReading, OcrError>;
}

/// Creates engines. Dropping the returned box releases the engine.
pub trait EngineProvider {
    fn acquire(&self) -> Result<Box<dyn OcrEngine>, OcrError>;
}

/// Provides [`TesseractEngine`]s configured from [`OcrSettings`].
#[derive(Debug, Clone)]
pub struct TesseractProvider {
    settings: OcrSettings,
}

impl TesseractProvider {
    pub fn new(settings: OcrSettings) -> Self {
        Self { settings }
    }
}

impl EngineProvider for TesseractProvider {
    fn acquire(&self) -> Result<Box<dyn OcrEngine>, OcrError> {
        Ok(Box::new(TesseractEngine::start(&self.settings)?))
    }
}

/// Tesseract driven through its command-line interface.
///
/// Holds a private scratch directory for cell images; the directory is
/// removed when the engine is dropped.
pub struct TesseractEngine {
    executable: PathBuf,
    tessdata: Option<PathBuf>,
    settings: OcrSettings,
    scratch: TempDir,
    calls: usize,
}

impl TesseractEngine {
    /// Locates and verifies Tesseract and prepares the scratch directory.
    pub fn start(settings: &OcrSettings) -> Result<Self, OcrError> {
        let executable = find_tesseract_executable(settings)?;
        let version = tesseract_version(&executable)?;
        let tessdata = find_tessdata_dir(settings);
        let scratch = tempfile::Builder::new().prefix("room-board-ocr").tempdir()?;

        info!(
            "OCR engine acquired: {} ({}), scratch {}",
            executable.display(),
            version,
            scratch.path().display()
        );

        Ok(Self {
            executable,
            tessdata,
            settings: settings.clone(),
            scratch,
            calls: 0,
        })
    }

    /// Arguments following the input path.
    fn arguments(&self) -> Vec<String> {
        let mut args = vec![
            "stdout".to_string(),
            "-l".to_string(),
            self.settings.language.clone(),
            "--psm".to_string(),
            self.settings.page_seg_mode.to_string(),
        ];
        if let Some(dir) = &self.tessdata {
            args.push("--tessdata-dir".to_string());
            args.push(dir.to_string_lossy().to_string());
        }
        if !self.settings.char_whitelist.is_empty() {
            args.push("-c".to_string());
            args.push(format!(
                "tessedit_char_whitelist={}",
                self.settings.char_whitelist
            ));
        }
        // Structured output with per-word confidence
        args.push("tsv".to_string());
        args
    }
}

impl OcrEngine for TesseractEngine {
    fn recognize(&mut self, image: &MonoBuffer) -> Result<OcrReading, OcrError> {
        self.calls += 1;
        let input = self.scratch.path().join(format!("cell_{}.png", self.calls));
        image.save(&input)?;

        let output = Command::new(&self.executable)
            .arg(&input)
            .args(self.arguments())
            .output()
            .map_err(OcrError::Spawn)?;

        let _ = std::fs::remove_file(&input);

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OcrError::Failed(stderr.trim().to_string()));
        }

        Ok(parse_tsv_output(&String::from_utf8_lossy(&output.stdout)))
    }
}

impl Drop for TesseractEngine {
    fn drop(&mut self) {
        info!(
            "OCR engine released after {} recognitions: {}",
            self.calls,
            self.executable.display()
        );
    }
}

/// Parses Tesseract TSV output into text and mean word confidence.
///
/// Words on the same line are joined by spaces and lines by newlines.
/// Rows with negative confidence or empty text are ignored. No words
/// yields empty text with confidence 0.
pub fn parse_tsv_output(tsv: &str) -> OcrReading {
    let mut lines: Vec<Vec<&str>> = Vec::new();
    let mut current_line: Option<(i32, i32, i32)> = None;
    let mut conf_sum: f64 = 0.0;
    let mut word_count: usize = 0;

    // Skip header
    for row in tsv.lines().skip(1) {
        let fields: Vec<&str> = row.split('\t').collect();
        if fields.len() < 12 {
            continue;
        }

        // TSV fields: level, page_num, block_num, par_num, line_num, word_num,
        //             left, top, width, height, conf, text
        let level: i32 = fields[0].parse().unwrap_or(-1);
        let conf: f64 = fields[10].parse().unwrap_or(-1.0);
        let text = fields[11].trim();

        // Level 5 = word
        if level != 5 || text.is_empty() || conf < 0.0 {
            continue;
        }

        let key = (
            fields[2].parse().unwrap_or(-1),
            fields[3].parse().unwrap_or(-1),
            fields[4].parse().unwrap_or(-1),
        );
        if current_line != Some(key) {
            lines.push(Vec::new());
            current_line = Some(key);
        }
        if let Some(words) = lines.last_mut() {
            words.push(text);
        }

        conf_sum += conf;
        word_count += 1;
    }

    if word_count == 0 {
        debug!("Tesseract returned no words");
        return OcrReading::new("", 0.0);
    }

    let text = lines
        .iter()
        .map(|words| words.join(" "))
        .collect::<Vec<_>>()
        .join("\n");

    OcrReading::new(text, conf_sum / word_count as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str =
        "level\tpage_num\tblock_num\tpar_num\tline_num\tword_num\tleft\ttop\twidth\theight\tconf\ttext";

    fn word(line: i32, word: i32, conf: f64, text: &str) -> String {
        format!("5\t1\t1\t1\t{}\t{}\t0\t0\t10\t10\t{}\t{}", line, word, conf, text)
    }

    #[test]
    fn test_parse_single_line() {
        let tsv = [
            HEADER.to_string(),
            "1\t1\t0\t0\t0\t0\t0\t0\t100\t40\t-1\t".to_string(),
            word(1, 1, 90.0, "14:30"),
            word(1, 2, 80.0, "DND"),
        ]
        .join("\n");

        let reading = parse_tsv_output(&tsv);
        assert_eq!(reading.text, "14:30 DND");
        assert_eq!(reading.confidence, 85.0);
    }

    #[test]
    fn test_parse_multiple_lines() {
        let tsv = [
            HEADER.to_string(),
            word(1, 1, 70.0, "VIP"),
            word(2, 1, 90.0, "ARR"),
            word(2, 2, 50.0, "9:15"),
        ]
        .join("\n");

        let reading = parse_tsv_output(&tsv);
        assert_eq!(reading.text, "VIP\nARR 9:15");
        assert_eq!(reading.confidence, 70.0);
    }

    #[test]
    fn test_parse_skips_blank_and_negative_rows() {
        let tsv = [
            HEADER.to_string(),
            word(1, 1, -1.0, "noise"),
            word(1, 2, 60.0, "   "),
            "5\t1\t1\t1\t1\t3\t0\t0".to_string(),
        ]
        .join("\n");

        let reading = parse_tsv_output(&tsv);
        assert_eq!(reading, OcrReading::new("", 0.0));
    }

    #[test]
    fn test_parse_empty_output() {
        assert_eq!(parse_tsv_output(""), OcrReading::new("", 0.0));
        assert_eq!(parse_tsv_output(HEADER), OcrReading::new("", 0.0));
    }
}
