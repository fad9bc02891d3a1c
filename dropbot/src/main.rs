use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use clap::Parser;
use cli::{Cli, Commands, PoseAction};
use config::{AppConfig, LoggingCfg};

mod cli;
mod commands;
mod config;
mod simulator;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load(&cli.config)?;
    setup_logging(&config.logging, cli.log_level.as_deref())?;

    if cli.config.exists() {
        log::debug!("Loaded config from {}", cli.config.display());
    } else {
        log::info!("No config at {}, using defaults", cli.config.display());
    }

    let stop = Arc::new(AtomicBool::new(false));
    {
        let stop = stop.clone();
        ctrlc::set_handler(move || {
            log::info!("Stop requested, finishing current step");
            stop.store(true, Ordering::Relaxed);
        })?;
    }

    let res = match cli.cmd {
        Commands::Sort => commands::sort::run(&config, stop),
        Commands::Inference { frames } => commands::inference::run(&config, frames, &stop),
        Commands::Capture(args) => commands::capture::run(&config, &args, &stop),
        Commands::Pose { action } => match action {
            PoseAction::List => commands::pose::list(&config),
            PoseAction::Set { key } => commands::pose::set(&config, key),
            PoseAction::Track => commands::pose::track(&config, stop),
        },
        Commands::Weight { count } => commands::weight::run(&config, count, &stop),
        Commands::Simulate { cycles, seed, no_delay } => commands::simulate::run(&config, cycles, seed, no_delay, &stop),
    };
    if let Err(e) = &res {
        log::error!("{e:#}");
    }

    res
}

fn setup_logging(logging: &LoggingCfg, level_override: Option<&str>) -> anyhow::Result<()> {
    let level = level_override.unwrap_or(&logging.level);
    let res = match &logging.file {
        Some(path) => simple_log::file(path.to_string_lossy(), level, 100, 10),
        None => simple_log::console(level),
    };

    res.map_err(|e| anyhow::anyhow!("Failed to set up logging: {e}"))
}
