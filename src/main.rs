//! Room Board
//!
//! Reads a hotel room-status board image and prints one JSON record per
//! room with the cell's color and text.

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use log::{error, info};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use room_board::{panic_message, BoardConfig, GridAnalyzer, TesseractProvider};

#[derive(Parser, Debug)]
#[command(name = "room-board", version, about = "Read a hotel room-status board image")]
struct Args {
    /// Board image (PNG, JPEG, ...)
    image: PathBuf,

    /// Config file (JSON). Defaults to config.json next to the executable.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write the JSON result here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Override the number of floors
    #[arg(long)]
    floors: Option<u32>,

    /// Override the number of rooms per floor
    #[arg(long)]
    rooms_per_floor: Option<u32>,
}

/// Installs the logger. Lines look like `[12:34:56.789] INFO message`.
fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}] {} {}",
                Local::now().format("%H:%M:%S%.3f"),
                record.level(),
                record.args()
            )
        })
        .init();
}

/// Returns config.json next to the executable, or in the working directory.
fn default_config_path() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|p| p.join("config.json")))
        .unwrap_or_else(|| Path::new("config.json").to_path_buf())
}

fn load_config(args: &Args) -> Result<BoardConfig> {
    let mut config = match &args.config {
        Some(path) => BoardConfig::load(path)?,
        None => BoardConfig::load_or_default(&default_config_path()),
    };
    if let Some(floors) = args.floors {
        config.grid.floors = floors;
    }
    if let Some(rooms) = args.rooms_per_floor {
        config.grid.rooms_per_floor = rooms;
    }
    Ok(config)
}

fn main() -> Result<()> {
    init_logging();

    // Log panics through the logger. A panic inside one room is also
    // reported by the analyzer as that room's error record.
    std::panic::set_hook(Box::new(|panic_info| {
        let location = panic_info
            .location()
            .map(|loc| format!(" at {}:{}:{}", loc.file(), loc.line(), loc.column()))
            .unwrap_or_default();
        error!("[PANIC]{} {}", location, panic_message(panic_info.payload()));
    }));

    let args = Args::parse();
    let config = load_config(&args)?;

    let image = image::open(&args.image)
        .with_context(|| format!("Failed to open {}", args.image.display()))?
        .to_rgba8();
    info!(
        "Loaded {} ({}x{})",
        args.image.display(),
        image.width(),
        image.height()
    );

    let provider = TesseractProvider::new(config.ocr.clone());
    let result = GridAnalyzer::new(&config)
        .analyze(&image, &provider)
        .context("Analysis failed")?;

    for (name, count) in result.color_counts() {
        info!("  {}: {}", name, count);
    }
    if result.errors() > 0 {
        info!("{} rooms had errors", result.errors());
    }

    match &args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, &result)?;
            writer.flush()?;
            info!("Results written to {}", path.display());
        }
        None => {
            let stdout = io::stdout();
            let mut writer = stdout.lock();
            serde_json::to_writer_pretty(&mut writer, &result)?;
            writeln!(writer)?;
        }
    }

    Ok(())
}
