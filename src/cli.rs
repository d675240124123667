use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "sprite_actors", about = "Runs a scripted sprite-actor level headlessly")]
pub struct Cli {
    /// Level description (JSON) to load.
    #[arg(default_value = "assets/levels/tutorial.json")]
    pub level: PathBuf,
    /// Number of frames to simulate.
    #[arg(long, default_value_t = 120)]
    pub frames: u64,
    /// Overrides the level's frame length in milliseconds.
    #[arg(long)]
    pub frame_ms: Option<u64>,
    /// Draws editing bounding boxes for every actor.
    #[arg(long)]
    pub editing: bool,
    #[arg(short, long)]
    pub verbose: bool,
}
