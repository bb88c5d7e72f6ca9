// cli.rs - Command-line interface configuration
use std::path::PathBuf;

use clap::Parser;

use crate::game;

#[derive(Parser, Debug, Clone)]
#[command(name = "blitline")]
#[command(about = "Windowed bitmap compositor demo", long_about = None)]
pub struct Cli {
    /// Background bitmap to composite each frame
    #[arg(long, default_value = game::BACKGROUND_BITMAP)]
    pub background: PathBuf,

    /// Digit glyph strip for the frame-rate counter
    #[arg(long, default_value = game::NUMBER_BITMAP)]
    pub glyphs: PathBuf,

    /// Create the device with the fullscreen presentation parameters
    #[arg(long, default_value = "false")]
    pub fullscreen: bool,
}
