use anyhow::{Context, Result};
use clap::Parser;
use sprite_actors::cli::Cli;
use sprite_actors::config::LevelConfig;
use sprite_actors::level::build_level;
use sprite_actors::logging;
use sprite_actors::render::CommandRecorder;

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    if let Err(err) = run(&cli) {
        log::error!("Application error: {err:?}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let mut config = LevelConfig::load(&cli.level)?;
    if let Some(frame_ms) = cli.frame_ms {
        config.stage.frame_ms = frame_ms;
    }
    config.stage.editing |= cli.editing;

    let mut level = build_level(&config).with_context(|| format!("Building level {}", cli.level.display()))?;
    let mut ctx = CommandRecorder::new();
    for _ in 0..cli.frames {
        let report = level.stage.step(&mut ctx).with_context(|| format!("Frame {}", level.stage.frames()))?;
        for collision in &report.collisions {
            log::debug!(
                "t={} {} <-> {} responses {:?} / {:?}",
                report.world_time,
                collision.first,
                collision.second,
                collision.first_response,
                collision.second_response
            );
        }
        for event in level.stage.drain_events() {
            log::info!("{event}");
        }
        ctx.take_commands();
    }
    log::info!("simulated {} frames, world time {}ms", level.stage.frames(), level.stage.world_time());
    Ok(())
}
